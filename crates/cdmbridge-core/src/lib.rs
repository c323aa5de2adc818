//! cdmbridge core
//!
//! Data contract shared by the exporter and the manifest builder, plus
//! configuration and run reporting. The snapshot layout is part of the
//! public file format; do not rename its keys.

pub mod snapshot;
pub mod connection;
pub mod config;
pub mod report;

pub use snapshot::{MetadataSnapshot, EntityRecord, AttributeRecord, SnapshotError, DEFAULT_SNAPSHOT_FILE};
pub use connection::{ConnectionConfig, ConnectionStringError};
pub use config::{Config, ConfigError, SourceConfig, StorageConfig, ManifestConfig, CONNECTION_STRING_ENV};
pub use report::{RunReport, ReportVersion, ExportSummary, BuildSummary};
