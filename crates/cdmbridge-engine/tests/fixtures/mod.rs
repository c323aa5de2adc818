//! Test fixtures for engine integration tests
//!
//! A small standards tree plus helpers for laying out the output and
//! schema roots in a scratch directory.

#![allow(dead_code)]

use cdmbridge_core::{AttributeRecord, EntityRecord, MetadataSnapshot};
use cdmbridge_corpus::LocalCorpus;
use cdmbridge_engine::BuildOptions;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const TEMPLATE: &str = "cdm:/healthCare/{entity}.cdm.json/{entity}";

/// Scratch layout: `<tmp>/sample-data`, `<tmp>/standards`, `<tmp>/solution-export.json`
pub struct Workspace {
    pub dir: TempDir,
    pub local_root: PathBuf,
    pub cdm_root: PathBuf,
    pub snapshot_path: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let local_root = dir.path().join("sample-data");
        let cdm_root = dir.path().join("standards");
        let snapshot_path = dir.path().join("solution-export.json");
        write_standards(&cdm_root);

        Self {
            dir,
            local_root,
            cdm_root,
            snapshot_path,
        }
    }

    pub fn corpus(&self) -> LocalCorpus {
        LocalCorpus::with_roots(&self.local_root, &self.cdm_root)
    }

    pub fn write_snapshot(&self, snapshot: &MetadataSnapshot) {
        snapshot.save_to_file(&self.snapshot_path).unwrap();
    }

    pub fn read_local(&self, relative: &str) -> String {
        std::fs::read_to_string(self.local_root.join(relative)).unwrap()
    }

    pub fn manifest_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.read_local("default.manifest.cdm.json")).unwrap()
    }
}

pub fn options() -> BuildOptions {
    BuildOptions {
        schema_path_template: TEMPLATE.to_string(),
        ..BuildOptions::default()
    }
}

/// Snapshot with account (name, revenue)
pub fn account_snapshot() -> MetadataSnapshot {
    let mut snapshot = MetadataSnapshot::new("MySolution");
    snapshot.push_entity(EntityRecord::new(
        "account",
        vec![
            AttributeRecord::new("name", "String"),
            AttributeRecord::new("revenue", "Double"),
        ],
    ));
    snapshot
}

/// Snapshot with account and contact
pub fn crm_snapshot() -> MetadataSnapshot {
    let mut snapshot = account_snapshot();
    snapshot.push_entity(EntityRecord::new(
        "contact",
        vec![
            AttributeRecord::new("contactid", "Uniqueidentifier"),
            AttributeRecord::new("lastname", "String"),
        ],
    ));
    snapshot
}

fn write_standards(root: &Path) {
    let write = |relative: &str, content: &str| {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    };

    write(
        "foundations.cdm.json",
        r#"{ "jsonSchemaSemanticVersion": "1.0.0", "definitions": [ { "traitName": "is.partition.format.CSV" } ] }"#,
    );
    write(
        "healthCare/account.cdm.json",
        r#"{
  "jsonSchemaSemanticVersion": "1.0.0",
  "definitions": [
    { "entityName": "account", "hasAttributes": [
      { "name": "name", "dataFormat": "String" },
      { "name": "revenue", "dataFormat": "Double" }
    ] }
  ]
}"#,
    );
    write(
        "healthCare/contact.cdm.json",
        r#"{
  "jsonSchemaSemanticVersion": "1.0.0",
  "definitions": [
    { "entityName": "contact", "hasAttributes": [
      { "name": "contactid", "dataFormat": "Guid" },
      { "name": "lastname", "dataFormat": "String" }
    ] }
  ]
}"#,
    );
}
