//! Metadata source trait for enumerating entity definitions

use crate::metadata::{EntityMetadata, MetadataQuery};

/// Errors that can occur when talking to a metadata source
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    #[error("Source not ready: {0}")]
    NotReady(String),

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl SourceError {
    /// Whether the error means the source could not be reached at all
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::NotReady(_) | Self::AuthenticationError(_))
    }
}

/// Trait for clients that can enumerate entity metadata
#[async_trait::async_trait]
pub trait MetadataSource: Send + Sync {
    /// Get the source name (e.g., "ResponseFile", "Mock")
    fn name(&self) -> &'static str;

    /// Check the source is reachable and credentials are accepted
    async fn test_connection(&self) -> Result<(), SourceError>;

    /// Enumerate all entity definitions in one request
    ///
    /// Entities and attributes are returned in the order the platform
    /// reports them.
    async fn query_all_entities(&self, query: &MetadataQuery) -> Result<Vec<EntityMetadata>, SourceError>;
}
