//! Storage adapters mounted into a corpus
//!
//! Paths handed to an adapter are absolute within its namespace
//! (`/account/partition-data.csv`). Adapters never see the namespace itself.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Error type for storage operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

/// Trait for storage backends behind a corpus namespace
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Read a UTF-8 document
    async fn read_text(&self, path: &str) -> Result<String, StorageError>;

    /// Write a UTF-8 document, creating parent folders and replacing existing content
    async fn write_text(&self, path: &str, content: &str) -> Result<(), StorageError>;

    /// Check if a document exists
    async fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Physical location for a path
    fn adapter_path(&self, path: &str) -> Result<PathBuf, StorageError>;

    /// Whether writes are refused
    fn is_read_only(&self) -> bool {
        false
    }
}

/// File system adapter rooted at a directory
#[derive(Debug, Clone)]
pub struct LocalAdapter {
    root: PathBuf,
    read_only: bool,
}

impl LocalAdapter {
    /// Create a read-write adapter
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            read_only: false,
        }
    }

    /// Refuse all writes through this adapter
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a namespace path below the root
    ///
    /// Paths containing ".." are rejected.
    fn resolve_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        let normalized = path.trim_start_matches('/');

        let relative = Path::new(normalized);
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(StorageError::PermissionDenied(format!(
                        "Path escapes storage root: {}",
                        path
                    )))
                }
            }
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl StorageAdapter for LocalAdapter {
    async fn read_text(&self, path: &str) -> Result<String, StorageError> {
        let full = self.resolve_path(path)?;
        match tokio::fs::read_to_string(&full).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::FileNotFound(full.display().to_string()))
            }
            Err(e) => Err(StorageError::IoError(format!("{}: {}", full.display(), e))),
        }
    }

    async fn write_text(&self, path: &str, content: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::PermissionDenied(format!(
                "{} is mounted read-only",
                self.root.display()
            )));
        }

        let full = self.resolve_path(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::IoError(format!("{}: {}", parent.display(), e)))?;
        }

        tokio::fs::write(&full, content)
            .await
            .map_err(|e| StorageError::IoError(format!("{}: {}", full.display(), e)))
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let full = self.resolve_path(path)?;
        tokio::fs::try_exists(&full)
            .await
            .map_err(|e| StorageError::IoError(format!("{}: {}", full.display(), e)))
    }

    fn adapter_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        self.resolve_path(path)
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }
}

/// In-memory adapter for tests
///
/// Clones share the same document map.
#[derive(Debug, Clone, Default)]
pub struct MemoryAdapter {
    documents: Arc<RwLock<BTreeMap<String, String>>>,
    read_only: bool,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Seed a document
    pub async fn insert(&self, path: &str, content: impl Into<String>) {
        self.documents.write().await.insert(key(path), content.into());
    }

    pub async fn get(&self, path: &str) -> Option<String> {
        self.documents.read().await.get(&key(path)).cloned()
    }

    /// All stored paths in sorted order
    pub async fn paths(&self) -> Vec<String> {
        self.documents.read().await.keys().cloned().collect()
    }
}

fn key(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

#[async_trait]
impl StorageAdapter for MemoryAdapter {
    async fn read_text(&self, path: &str) -> Result<String, StorageError> {
        self.get(path)
            .await
            .ok_or_else(|| StorageError::FileNotFound(key(path)))
    }

    async fn write_text(&self, path: &str, content: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::PermissionDenied("memory adapter is read-only".to_string()));
        }
        self.insert(path, content).await;
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        Ok(self.documents.read().await.contains_key(&key(path)))
    }

    fn adapter_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        Ok(PathBuf::from(key(path)))
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }
}
