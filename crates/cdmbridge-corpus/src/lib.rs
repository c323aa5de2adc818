//! Schema corpus for cdmbridge
//!
//! This crate handles:
//! - Corpus paths and namespace mounting
//! - Storage adapters (local file system, in-memory)
//! - The `*.cdm.json` document model
//! - Resolving manifest drafts against entity definitions
//! - Saving manifests and writing partition files

pub mod corpus;
pub mod document;
pub mod local;
pub mod manifest;
pub mod path;
pub mod storage;

pub use corpus::{CorpusError, SchemaCorpus};
pub use document::{
    DataPartition, Definition, EntityDeclaration, EntityDefinition, EntityDocument, Import,
    ManifestDocument, TraitArgument, TraitReference, TypeAttribute, CSV_FORMAT_TRAIT,
    SCHEMA_SEMANTIC_VERSION,
};
pub use local::{LocalCorpus, CDM_NAMESPACE, LOCAL_NAMESPACE};
pub use manifest::{ManifestDraft, ManifestResolved, ResolutionOptions, ResolvedEntity, MANIFEST_SUFFIX};
pub use path::{CorpusPath, PathError, DOCUMENT_SUFFIX};
pub use storage::{LocalAdapter, MemoryAdapter, StorageAdapter, StorageError};
