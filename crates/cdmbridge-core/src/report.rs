//! Run report (report.json v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Export stage results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSummary {
    /// Source the metadata came from
    pub source: String,

    pub entities: usize,

    pub attributes: usize,

    /// Snapshot file written
    pub snapshot_path: String,
}

/// Build stage results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSummary {
    pub manifest_name: String,

    /// Entity declarations in the saved manifest
    pub entities_declared: usize,

    /// Placeholder partition files written
    pub partitions_written: Vec<String>,

    /// Manifest corpus path
    pub manifest_path: String,
}

/// Pipeline run report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportSummary>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildSummary>,
}

impl RunReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            export: None,
            build: None,
        }
    }

    pub fn with_export(mut self, export: ExportSummary) -> Self {
        self.export = Some(export);
        self
    }

    pub fn with_build(mut self, build: BuildSummary) -> Self {
        self.build = Some(build);
        self
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}
