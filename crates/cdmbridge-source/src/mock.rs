//! Mock metadata source for testing
//!
//! This source returns predefined entities without connecting to any service.
//! It's useful for:
//! - Unit testing the exporter
//! - Demos without real credentials
//! - Simulating connection and transport failures
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cdmbridge_source::{MockSource, MetadataSource, EntityMetadata, AttributeMetadata, AttributeType};
//!
//! let source = MockSource::new();
//! source.add_entity(EntityMetadata::new("account", vec![
//!     AttributeMetadata::new("name", AttributeType::String),
//! ])).await;
//!
//! let entities = source.query_all_entities(&MetadataQuery::default()).await?;
//! ```
//!
//! ## Simulating Failures
//!
//! ```rust,ignore
//! // Client reports not-ready
//! let source = MockSource::new().with_connection_failure();
//! assert!(source.test_connection().await.is_err());
//!
//! // Request fails mid-flight
//! let source = MockSource::new().with_query_error(SourceError::TransportError("reset".into()));
//! ```

use crate::metadata::{EntityMetadata, MetadataQuery};
use crate::source::{MetadataSource, SourceError};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Mock metadata source for testing
///
/// Entities are kept in insertion order and returned as-is. Clones share
/// state, so a test can keep a handle while the exporter owns another.
pub struct MockSource {
    /// Entities returned by queries
    entities: Arc<RwLock<Vec<EntityMetadata>>>,

    /// Error returned by queries instead of entities
    query_error: Arc<RwLock<Option<SourceError>>>,

    /// Queries received so far
    queries: Arc<RwLock<Vec<MetadataQuery>>>,

    /// Simulate a client that is not ready
    fail_connection: bool,

    /// Simulate query latency (milliseconds)
    latency_ms: u64,

    /// Name to return from name() method
    source_name: &'static str,
}

impl MockSource {
    /// Create a new mock source with no entities
    pub fn new() -> Self {
        Self::from_entities(Vec::new())
    }

    /// Create a mock source returning the given entities
    pub fn from_entities(entities: Vec<EntityMetadata>) -> Self {
        Self {
            entities: Arc::new(RwLock::new(entities)),
            query_error: Arc::new(RwLock::new(None)),
            queries: Arc::new(RwLock::new(Vec::new())),
            fail_connection: false,
            latency_ms: 0,
            source_name: "Mock",
        }
    }

    /// Append an entity
    pub async fn add_entity(&self, entity: EntityMetadata) {
        self.entities.write().await.push(entity);
    }

    /// Configure `test_connection()` to fail
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Configure queries to fail with the given error
    pub fn with_query_error(mut self, error: SourceError) -> Self {
        self.query_error = Arc::new(RwLock::new(Some(error)));
        self
    }

    /// Configure simulated latency for all operations
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Set a custom source name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.source_name = name;
        self
    }

    pub async fn entity_count(&self) -> usize {
        self.entities.read().await.len()
    }

    /// Queries received so far, oldest first
    pub async fn received_queries(&self) -> Vec<MetadataQuery> {
        self.queries.read().await.clone()
    }

    async fn simulate_latency(&self) {
        if self.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.latency_ms)).await;
        }
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockSource {
    fn clone(&self) -> Self {
        Self {
            entities: Arc::clone(&self.entities),
            query_error: Arc::clone(&self.query_error),
            queries: Arc::clone(&self.queries),
            fail_connection: self.fail_connection,
            latency_ms: self.latency_ms,
            source_name: self.source_name,
        }
    }
}

#[async_trait::async_trait]
impl MetadataSource for MockSource {
    fn name(&self) -> &'static str {
        self.source_name
    }

    async fn test_connection(&self) -> Result<(), SourceError> {
        self.simulate_latency().await;

        if self.fail_connection {
            Err(SourceError::NotReady("Simulated connection failure".to_string()))
        } else {
            Ok(())
        }
    }

    async fn query_all_entities(&self, query: &MetadataQuery) -> Result<Vec<EntityMetadata>, SourceError> {
        self.simulate_latency().await;
        self.queries.write().await.push(*query);

        if let Some(error) = self.query_error.read().await.as_ref() {
            return Err(error.clone());
        }

        let entities = self.entities.read().await.clone();
        if query.includes_attributes() {
            Ok(entities)
        } else {
            Ok(entities
                .into_iter()
                .map(|e| EntityMetadata::new(e.logical_name, Vec::new()))
                .collect())
        }
    }
}

/// Builder for creating MockSource with multiple entities
///
/// ```rust,ignore
/// let source = MockSourceBuilder::new()
///     .with_entity("account", &[("name", AttributeType::String), ("revenue", AttributeType::Money)])
///     .with_entity("contact", &[("fullname", AttributeType::String)])
///     .build();
/// ```
pub struct MockSourceBuilder {
    entities: Vec<EntityMetadata>,
    query_error: Option<SourceError>,
    fail_connection: bool,
    latency_ms: u64,
    source_name: &'static str,
}

impl MockSourceBuilder {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            query_error: None,
            fail_connection: false,
            latency_ms: 0,
            source_name: "Mock",
        }
    }

    /// Add an entity from (name, type) pairs
    pub fn with_entity(mut self, logical_name: &str, attributes: &[(&str, crate::AttributeType)]) -> Self {
        let attributes = attributes
            .iter()
            .map(|(name, ty)| crate::AttributeMetadata::new(*name, ty.clone()))
            .collect();
        self.entities.push(EntityMetadata::new(logical_name, attributes));
        self
    }

    pub fn with_entity_metadata(mut self, entity: EntityMetadata) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn with_query_error(mut self, error: SourceError) -> Self {
        self.query_error = Some(error);
        self
    }

    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.source_name = name;
        self
    }

    pub fn build(self) -> MockSource {
        MockSource {
            entities: Arc::new(RwLock::new(self.entities)),
            query_error: Arc::new(RwLock::new(self.query_error)),
            queries: Arc::new(RwLock::new(Vec::new())),
            fail_connection: self.fail_connection,
            latency_ms: self.latency_ms,
            source_name: self.source_name,
        }
    }
}

impl Default for MockSourceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
