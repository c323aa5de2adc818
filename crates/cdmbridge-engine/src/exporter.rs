//! Metadata exporter
//!
//! Pulls every entity definition from a metadata source and writes a flat
//! snapshot (`solution-export.json`) for the manifest builder.

use cdmbridge_core::{
    AttributeRecord, Config, EntityRecord, ExportSummary, MetadataSnapshot, SnapshotError,
};
use cdmbridge_source::{EntityMetadata, MetadataQuery, MetadataSource, SourceError};
use std::path::PathBuf;

/// Export settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Solution name recorded in the snapshot
    pub solution_name: String,

    /// Where the snapshot is written
    pub snapshot_path: PathBuf,
}

impl ExportOptions {
    pub fn new(solution_name: impl Into<String>, snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            solution_name: solution_name.into(),
            snapshot_path: snapshot_path.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.solution_name.clone(), config.snapshot_file())
    }
}

/// Result of a successful export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    /// Name of the source the metadata came from
    pub source: String,
    pub entities: usize,
    pub attributes: usize,
    pub snapshot_path: PathBuf,
}

impl ExportOutcome {
    pub fn summary(&self) -> ExportSummary {
        ExportSummary {
            source: self.source.clone(),
            entities: self.entities,
            attributes: self.attributes,
            snapshot_path: self.snapshot_path.display().to_string(),
        }
    }
}

/// Export errors
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Could not connect to {source_name}: {error}")]
    Connection {
        source_name: String,
        #[source]
        error: SourceError,
    },

    #[error("Metadata query failed: {0}")]
    Transport(#[source] SourceError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Export all entity metadata from `source` into a snapshot file
///
/// The connection is checked first; a source that is not ready yields
/// [`ExportError::Connection`] and nothing is written. One query is issued
/// for entities with attributes, as if published. The snapshot file is
/// replaced on success.
pub async fn export(
    source: &dyn MetadataSource,
    options: &ExportOptions,
) -> Result<ExportOutcome, ExportError> {
    if let Err(error) = source.test_connection().await {
        tracing::error!(source = source.name(), %error, "Metadata source is not ready");
        return Err(ExportError::Connection {
            source_name: source.name().to_string(),
            error,
        });
    }
    tracing::info!(source = source.name(), "Connected to metadata source");

    let query = MetadataQuery::entities_with_attributes();
    let entities = source.query_all_entities(&query).await.map_err(|e| {
        if e.is_connection_failure() {
            ExportError::Connection {
                source_name: source.name().to_string(),
                error: e,
            }
        } else {
            ExportError::Transport(e)
        }
    })?;

    let snapshot = flatten(&options.solution_name, &entities);
    snapshot.save_to_file(&options.snapshot_path)?;

    tracing::info!(
        entities = snapshot.entities.len(),
        attributes = snapshot.attribute_count(),
        path = %options.snapshot_path.display(),
        "Wrote metadata snapshot"
    );

    Ok(ExportOutcome {
        source: source.name().to_string(),
        entities: snapshot.entities.len(),
        attributes: snapshot.attribute_count(),
        snapshot_path: options.snapshot_path.clone(),
    })
}

/// Flatten entity metadata into snapshot records, keeping source order
pub fn flatten(solution_name: &str, entities: &[EntityMetadata]) -> MetadataSnapshot {
    let mut snapshot = MetadataSnapshot::new(solution_name);

    for entity in entities {
        let attributes = entity
            .attributes
            .iter()
            .map(|attr| AttributeRecord::new(attr.logical_name.clone(), attr.type_name()))
            .collect();
        snapshot.push_entity(EntityRecord::new(entity.logical_name.clone(), attributes));
    }

    snapshot
}
