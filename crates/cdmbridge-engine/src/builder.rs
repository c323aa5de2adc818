//! Manifest builder
//!
//! Turns a metadata snapshot into a resolved manifest with one CSV data
//! partition per entity.
//!
//! ## Phases
//!
//! 1. **Staging**: read the snapshot, build the draft, resolve it and fetch
//!    every entity. Nothing is written; any failure here leaves the output
//!    roots untouched.
//! 2. **Writing**: write partition headers, then save the manifest. An I/O
//!    failure here can leave partition files written earlier in the phase.

use cdmbridge_core::{BuildSummary, ManifestConfig, MetadataSnapshot, SnapshotError};
use cdmbridge_corpus::{
    CorpusError, CorpusPath, DataPartition, ManifestDraft, ResolutionOptions, SchemaCorpus,
    TraitReference,
};
use std::path::{Path, PathBuf};

/// File name of every partition, inside a folder named after the entity
pub const PARTITION_FILE_NAME: &str = "partition-data.csv";

/// Builder settings are the `[manifest]` config section
pub type BuildOptions = ManifestConfig;

/// Result of a successful build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    pub manifest_name: String,
    pub entities_declared: usize,

    /// Partition files written, in declaration order
    pub partitions: Vec<PathBuf>,

    pub manifest_path: PathBuf,
}

impl BuildOutcome {
    pub fn summary(&self) -> BuildSummary {
        BuildSummary {
            manifest_name: self.manifest_name.clone(),
            entities_declared: self.entities_declared,
            partitions_written: self
                .partitions
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            manifest_path: self.manifest_path.display().to_string(),
        }
    }
}

/// Build errors
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read snapshot: {0}")]
    Io(#[source] SnapshotError),

    #[error("Malformed snapshot: {0}")]
    Parse(#[source] SnapshotError),

    #[error("Manifest resolution failed: {0}")]
    Resolution(#[source] CorpusError),

    #[error("Failed to fetch entity '{entity}': {error}")]
    Fetch {
        entity: String,
        #[source]
        error: CorpusError,
    },

    #[error("Failed to write output: {0}")]
    Storage(#[source] CorpusError),
}

impl BuildError {
    fn from_snapshot(error: SnapshotError) -> Self {
        match error {
            SnapshotError::IoError(..) => Self::Io(error),
            _ => Self::Parse(error),
        }
    }
}

/// A partition ready to be written
struct StagedPartition {
    location: String,
    header: String,
    file: PathBuf,
    partition: DataPartition,
}

/// Build the manifest for the snapshot at `snapshot_path`
///
/// The corpus must have the output namespace mounted as its default
/// namespace and the schema namespace referenced by the path template.
pub async fn build(
    snapshot_path: &Path,
    corpus: &dyn SchemaCorpus,
    options: &BuildOptions,
) -> Result<BuildOutcome, BuildError> {
    let snapshot = MetadataSnapshot::from_file(snapshot_path).map_err(BuildError::from_snapshot)?;
    tracing::info!(
        solution = %snapshot.solution_name,
        entities = snapshot.entities.len(),
        "Loaded metadata snapshot"
    );

    let root = corpus
        .root_folder(corpus.default_namespace())
        .map_err(BuildError::Resolution)?;
    let draft = draft_from_snapshot(&snapshot, root, options);

    let resolution = ResolutionOptions::new(options.name.clone());
    let mut manifest = corpus
        .resolve_manifest(&draft, &resolution)
        .await
        .map_err(BuildError::Resolution)?;
    manifest.add_import(options.foundations_import.clone());

    tracing::info!(
        manifest = %manifest.name,
        entities = manifest.entities.len(),
        "Resolved manifest"
    );

    let mut staged = Vec::with_capacity(manifest.entities.len());
    for declaration in &manifest.entities {
        let entity = corpus
            .fetch_entity(&declaration.entity_path, &manifest)
            .await
            .map_err(|error| BuildError::Fetch {
                entity: declaration.entity_name.clone(),
                error,
            })?;

        let name = &declaration.entity_name;
        let location = format!(
            "{}:/{}/{}",
            corpus.default_namespace(),
            name,
            PARTITION_FILE_NAME
        );
        let relative = corpus
            .create_relative_corpus_path(&location, &manifest)
            .map_err(BuildError::Storage)?;
        let file = corpus
            .corpus_path_to_adapter_path(&location)
            .map_err(BuildError::Storage)?;

        let partition = DataPartition::new(format!("{}-data-description", name))
            .with_explanation(options.partition_explanation.clone())
            .with_location(relative)
            .exhibit(TraitReference::csv_format(true, ","));

        tracing::debug!(entity = %name, attributes = entity.attributes.len(), "Staged partition");

        staged.push(StagedPartition {
            location,
            header: entity.attribute_names().join(","),
            file,
            partition,
        });
    }

    for (declaration, staged) in manifest.entities.iter_mut().zip(&staged) {
        declaration.data_partitions = vec![staged.partition.clone()];
    }

    let mut partitions = Vec::with_capacity(staged.len());
    for staged in staged {
        corpus
            .write_text(&staged.location, &staged.header)
            .await
            .map_err(BuildError::Storage)?;
        partitions.push(staged.file);
    }

    let saved = corpus
        .save_manifest(&manifest, &manifest.document_name(), true)
        .await
        .map_err(BuildError::Storage)?;
    let manifest_path = corpus
        .corpus_path_to_adapter_path(&saved.to_string())
        .map_err(BuildError::Storage)?;

    tracing::info!(
        manifest = %saved,
        partitions = partitions.len(),
        "Saved manifest"
    );

    Ok(BuildOutcome {
        manifest_name: manifest.name.clone(),
        entities_declared: manifest.entities.len(),
        partitions,
        manifest_path,
    })
}

/// Draft listing one schema reference per snapshot entity
///
/// Entities sharing a logical name collapse into one entry; the last
/// reference wins.
pub fn draft_from_snapshot(
    snapshot: &MetadataSnapshot,
    folder: CorpusPath,
    options: &BuildOptions,
) -> ManifestDraft {
    let mut draft = ManifestDraft::new(options.draft_name.clone());
    draft.register_in(folder);

    for entity in &snapshot.entities {
        draft.add_entity(
            entity.logical_name.clone(),
            options.schema_path_for(&entity.logical_name),
        );
    }

    draft
}
