//! Metadata snapshot (solution-export.json)
//!
//! The snapshot is the only coupling point between the exporter and the
//! manifest builder. Keys are written in PascalCase so files produced by
//! older tooling stay readable; camelCase keys are accepted on input.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default file name of the intermediate snapshot
pub const DEFAULT_SNAPSHOT_FILE: &str = "solution-export.json";

/// Flattened entity metadata for one solution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetadataSnapshot {
    /// Solution the entities were exported for
    #[serde(alias = "solutionName")]
    pub solution_name: String,

    /// Entities in the order the source returned them
    #[serde(alias = "entities")]
    pub entities: Vec<EntityRecord>,
}

/// A single entity (table) and its attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntityRecord {
    /// Logical name, e.g. `account`
    #[serde(alias = "logicalName")]
    pub logical_name: String,

    /// Attributes in source order
    #[serde(alias = "attributes")]
    pub attributes: Vec<AttributeRecord>,
}

/// A named, typed attribute (column)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeRecord {
    #[serde(alias = "name")]
    pub name: String,

    /// Stringified type tag from the source system
    #[serde(rename = "Type", alias = "type")]
    pub attribute_type: String,
}

impl MetadataSnapshot {
    /// Create an empty snapshot for a solution
    pub fn new(solution_name: impl Into<String>) -> Self {
        Self {
            solution_name: solution_name.into(),
            entities: Vec::new(),
        }
    }

    /// Append an entity, keeping insertion order
    pub fn push_entity(&mut self, entity: EntityRecord) {
        self.entities.push(entity);
    }

    /// Total number of attributes across all entities
    pub fn attribute_count(&self) -> usize {
        self.entities.iter().map(|e| e.attributes.len()).sum()
    }

    /// Find an entity by logical name (first match)
    pub fn find_entity(&self, logical_name: &str) -> Option<&EntityRecord> {
        self.entities.iter().find(|e| e.logical_name == logical_name)
    }

    /// Load a snapshot from file
    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SnapshotError::IoError(path.display().to_string(), e.to_string()))?;

        Self::from_json(&contents)
    }

    /// Parse a snapshot from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(json).map_err(|e| SnapshotError::ParseError(e.to_string()))
    }

    /// Serialize to indented JSON
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(|e| SnapshotError::SerializeError(e.to_string()))
    }

    /// Write to file, replacing any previous content
    pub fn save_to_file(&self, path: &Path) -> Result<(), SnapshotError> {
        let json = self.to_json()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| SnapshotError::IoError(parent.display().to_string(), e.to_string()))?;
        }

        std::fs::write(path, json)
            .map_err(|e| SnapshotError::IoError(path.display().to_string(), e.to_string()))
    }
}

impl EntityRecord {
    pub fn new(logical_name: impl Into<String>, attributes: Vec<AttributeRecord>) -> Self {
        Self {
            logical_name: logical_name.into(),
            attributes,
        }
    }

    /// Attribute names in order
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }

    /// Comma-joined attribute names, used as a CSV header line
    pub fn csv_header(&self) -> String {
        self.attribute_names().join(",")
    }
}

impl AttributeRecord {
    pub fn new(name: impl Into<String>, attribute_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribute_type: attribute_type.into(),
        }
    }
}

/// Snapshot read/write errors
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Failed to access snapshot file {0}: {1}")]
    IoError(String, String),

    #[error("Failed to parse snapshot JSON: {0}")]
    ParseError(String),

    #[error("Failed to serialize snapshot: {0}")]
    SerializeError(String),
}
