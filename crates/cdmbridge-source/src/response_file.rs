//! Replays a saved metadata response from disk
//!
//! The file holds the body of an `EntityDefinitions` request with attributes
//! expanded, as returned by the platform's web API:
//!
//! ```json
//! { "value": [ { "LogicalName": "account",
//!                "Attributes": [ { "LogicalName": "name", "AttributeType": "String" } ] } ] }
//! ```
//!
//! A bare JSON array of entity definitions is accepted as well. This lets an
//! export run offline against a response captured earlier.

use crate::metadata::{EntityMetadata, MetadataQuery};
use crate::source::{MetadataSource, SourceError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
#[serde(untagged)]
enum ResponseBody {
    Envelope { value: Vec<EntityMetadata> },
    Bare(Vec<EntityMetadata>),
}

/// Metadata source backed by a saved response file
#[derive(Debug, Clone)]
pub struct ResponseFileSource {
    path: PathBuf,
}

impl ResponseFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse a response body
    pub fn parse(json: &str) -> Result<Vec<EntityMetadata>, SourceError> {
        let body: ResponseBody = serde_json::from_str(json)
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

        Ok(match body {
            ResponseBody::Envelope { value } => value,
            ResponseBody::Bare(entities) => entities,
        })
    }
}

#[async_trait::async_trait]
impl MetadataSource for ResponseFileSource {
    fn name(&self) -> &'static str {
        "ResponseFile"
    }

    async fn test_connection(&self) -> Result<(), SourceError> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) if meta.is_file() => Ok(()),
            Ok(_) => Err(SourceError::NotReady(format!(
                "{} is not a file",
                self.path.display()
            ))),
            Err(e) => Err(SourceError::NotReady(format!(
                "Cannot open {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn query_all_entities(&self, query: &MetadataQuery) -> Result<Vec<EntityMetadata>, SourceError> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SourceError::TransportError(format!("{}: {}", self.path.display(), e)))?;

        let mut entities = Self::parse(&contents)?;
        tracing::debug!(
            path = %self.path.display(),
            entities = entities.len(),
            "Loaded saved metadata response"
        );

        if !query.includes_attributes() {
            for entity in &mut entities {
                entity.attributes.clear();
            }
        }

        Ok(entities)
    }
}
