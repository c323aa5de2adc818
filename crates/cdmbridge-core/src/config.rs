//! Configuration schema (cdmbridge.toml)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::connection::{ConnectionConfig, ConnectionStringError};
use crate::snapshot::DEFAULT_SNAPSHOT_FILE;

/// Environment variable that overrides `source.connection_string`
pub const CONNECTION_STRING_ENV: &str = "CDMBRIDGE_CONNECTION_STRING";

/// Default schema reference template; `{entity}` is replaced with the logical name
pub const DEFAULT_SCHEMA_PATH_TEMPLATE: &str = "cdm:/core/applicationCommon/foundationCommon/crmCommon/accelerators/healthCare/electronicMedicalRecords/{entity}.cdm.json/{entity}";

/// Metadata source settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Connection string for the metadata service
    #[serde(default)]
    pub connection_string: Option<String>,

    /// Saved metadata response to replay instead of querying the service
    #[serde(default)]
    pub response_file: Option<PathBuf>,
}

/// Storage roots mounted into the schema corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Read-write root for the manifest and partition files ("local")
    #[serde(default = "default_local_root")]
    pub local_root: PathBuf,

    /// Read-only root holding shared schema definitions ("cdm")
    #[serde(default = "default_cdm_root")]
    pub cdm_root: PathBuf,
}

fn default_local_root() -> PathBuf {
    PathBuf::from("sample-data")
}

fn default_cdm_root() -> PathBuf {
    PathBuf::from("example-public-standards")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            local_root: default_local_root(),
            cdm_root: default_cdm_root(),
        }
    }
}

/// Manifest construction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestConfig {
    /// Name of the resolved manifest
    #[serde(default = "default_manifest_name")]
    pub name: String,

    /// Name of the transient draft manifest
    #[serde(default = "default_draft_name")]
    pub draft_name: String,

    #[serde(default = "default_schema_path_template")]
    pub schema_path_template: String,

    /// Import appended to every resolved manifest
    #[serde(default = "default_foundations_import")]
    pub foundations_import: String,

    #[serde(default = "default_partition_explanation")]
    pub partition_explanation: String,
}

fn default_manifest_name() -> String {
    "default".to_string()
}

fn default_draft_name() -> String {
    "tempAbstract".to_string()
}

fn default_schema_path_template() -> String {
    DEFAULT_SCHEMA_PATH_TEMPLATE.to_string()
}

fn default_foundations_import() -> String {
    "cdm:/foundations.cdm.json".to_string()
}

fn default_partition_explanation() -> String {
    "not real data, just for demo".to_string()
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            name: default_manifest_name(),
            draft_name: default_draft_name(),
            schema_path_template: default_schema_path_template(),
            foundations_import: default_foundations_import(),
            partition_explanation: default_partition_explanation(),
        }
    }
}

impl ManifestConfig {
    /// Schema reference path for an entity
    pub fn schema_path_for(&self, entity: &str) -> String {
        self.schema_path_template.replace("{entity}", entity)
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Solution name recorded in the snapshot
    #[serde(default = "default_solution_name")]
    pub solution_name: String,

    /// Intermediate snapshot location
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub manifest: ManifestConfig,

    /// Project root path (for resolving relative paths)
    #[serde(skip)]
    pub project_root: PathBuf,
}

fn default_solution_name() -> String {
    "MySolution".to_string()
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from(DEFAULT_SNAPSHOT_FILE)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            solution_name: default_solution_name(),
            snapshot_path: default_snapshot_path(),
            source: SourceConfig::default(),
            storage: StorageConfig::default(),
            manifest: ManifestConfig::default(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config = Self::from_toml(&contents)?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.project_root = std::env::current_dir().unwrap_or_default();
        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Apply environment overrides using the given lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(conn) = lookup(CONNECTION_STRING_ENV).filter(|v| !v.trim().is_empty()) {
            self.source.connection_string = Some(conn);
        }
    }

    /// Resolve a possibly relative path against the project root
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    pub fn snapshot_file(&self) -> PathBuf {
        self.resolve_path(&self.snapshot_path)
    }

    pub fn local_root(&self) -> PathBuf {
        self.resolve_path(&self.storage.local_root)
    }

    pub fn cdm_root(&self) -> PathBuf {
        self.resolve_path(&self.storage.cdm_root)
    }

    /// Parsed connection settings, if a connection string is configured
    pub fn connection(&self) -> Result<Option<ConnectionConfig>, ConfigError> {
        self.source
            .connection_string
            .as_deref()
            .map(ConnectionConfig::parse)
            .transpose()
            .map_err(ConfigError::ConnectionString)
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid connection string: {0}")]
    ConnectionString(#[from] ConnectionStringError),
}
