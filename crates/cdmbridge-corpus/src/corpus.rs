//! Schema corpus trait

use crate::manifest::{ManifestDraft, ManifestResolved, ResolutionOptions, ResolvedEntity};
use crate::path::{CorpusPath, PathError};
use crate::storage::{StorageAdapter, StorageError};
use std::path::PathBuf;
use std::sync::Arc;

/// Errors raised by a schema corpus
#[derive(Debug, Clone, thiserror::Error)]
pub enum CorpusError {
    #[error("No storage mounted for namespace '{0}'")]
    UnknownNamespace(String),

    #[error("Invalid corpus path: {0}")]
    InvalidPath(#[from] PathError),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Definition '{name}' not found in {document}")]
    DefinitionNotFound { name: String, document: String },

    #[error("Resolution failed: {0}")]
    Resolution(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to parse {document}: {message}")]
    Parse { document: String, message: String },

    #[error("Failed to serialize {document}: {message}")]
    Serialize { document: String, message: String },

    #[error("Namespace '{0}' is mounted read-only")]
    ReadOnly(String),

    #[error("Document already exists: {0}")]
    AlreadyExists(String),
}

/// A corpus of schema documents spread over mounted storage namespaces
///
/// The corpus owns namespace resolution, entity resolution and serialization
/// of its own documents. Callers only hand it corpus paths.
#[async_trait::async_trait]
pub trait SchemaCorpus: Send + Sync {
    /// Mount a storage adapter under a namespace, replacing any previous mount
    fn mount(&mut self, namespace: &str, adapter: Arc<dyn StorageAdapter>);

    /// Namespace used for paths without one, and for saved manifests
    fn default_namespace(&self) -> &str;

    /// Root folder of a mounted namespace
    fn root_folder(&self, namespace: &str) -> Result<CorpusPath, CorpusError>;

    /// Resolve every schema reference in the draft
    async fn resolve_manifest(
        &self,
        draft: &ManifestDraft,
        options: &ResolutionOptions,
    ) -> Result<ManifestResolved, CorpusError>;

    /// Fetch an entity definition by path, relative to the manifest's folder
    async fn fetch_entity(
        &self,
        entity_path: &str,
        manifest: &ManifestResolved,
    ) -> Result<ResolvedEntity, CorpusError>;

    /// Express `path` relative to the manifest's folder where possible
    fn create_relative_corpus_path(
        &self,
        path: &str,
        manifest: &ManifestResolved,
    ) -> Result<String, CorpusError>;

    /// Physical location for a corpus path
    fn corpus_path_to_adapter_path(&self, path: &str) -> Result<PathBuf, CorpusError>;

    /// Write a text document, replacing existing content
    async fn write_text(&self, path: &str, content: &str) -> Result<(), CorpusError>;

    /// Save the manifest and its resolved entity documents
    ///
    /// Returns the manifest's corpus path.
    async fn save_manifest(
        &self,
        manifest: &ManifestResolved,
        document_name: &str,
        overwrite: bool,
    ) -> Result<CorpusPath, CorpusError>;
}
