//! Integration tests for the export and build stages
//!
//! ```bash
//! cargo test -p cdmbridge-engine --test integration_tests
//! ```

mod fixtures;

use cdmbridge_core::{AttributeRecord, EntityRecord, MetadataSnapshot};
use cdmbridge_corpus::{
    CorpusError, CorpusPath, LocalCorpus, ManifestDraft, ManifestResolved, ResolutionOptions,
    ResolvedEntity, SchemaCorpus, StorageAdapter,
};
use cdmbridge_engine::{
    build, export, run, BuildError, ExportError, ExportOptions, PipelineError, PipelineOptions,
};
use cdmbridge_source::{AttributeType, MockSourceBuilder, SourceError};
use fixtures::Workspace;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::Arc;

// =============================================================================
// Builder Scenarios
// =============================================================================

#[tokio::test]
async fn test_partition_header_is_joined_attribute_names() {
    let ws = Workspace::new();
    ws.write_snapshot(&fixtures::account_snapshot());

    let outcome = build(&ws.snapshot_path, &ws.corpus(), &fixtures::options())
        .await
        .unwrap();

    assert_eq!(ws.read_local("account/partition-data.csv"), "name,revenue");
    assert_eq!(outcome.entities_declared, 1);
    assert_eq!(
        outcome.partitions,
        vec![ws.local_root.join("account/partition-data.csv")]
    );
    assert_eq!(outcome.manifest_path, ws.local_root.join("default.manifest.cdm.json"));
}

#[tokio::test]
async fn test_partition_header_follows_schema_not_snapshot() {
    let ws = Workspace::new();
    let mut snapshot = MetadataSnapshot::new("MySolution");
    snapshot.push_entity(EntityRecord::new(
        "account",
        vec![
            AttributeRecord::new("ownerid", "Owner"),
            AttributeRecord::new("name", "String"),
            AttributeRecord::new("new_custom", "Boolean"),
        ],
    ));
    ws.write_snapshot(&snapshot);

    build(&ws.snapshot_path, &ws.corpus(), &fixtures::options())
        .await
        .unwrap();

    assert_eq!(ws.read_local("account/partition-data.csv"), "name,revenue");
}

#[tokio::test]
async fn test_manifest_declares_each_entity_once() {
    let ws = Workspace::new();
    ws.write_snapshot(&fixtures::crm_snapshot());

    build(&ws.snapshot_path, &ws.corpus(), &fixtures::options())
        .await
        .unwrap();

    let manifest = ws.manifest_json();
    assert_eq!(manifest["manifestName"], "default");

    let entities = manifest["entities"].as_array().unwrap();
    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0]["entityName"], "account");
    assert_eq!(entities[1]["entityName"], "contact");
    assert_eq!(entities[1]["entityPath"], "contact.cdm.json/contact");

    let partitions = entities[1]["dataPartitions"].as_array().unwrap();
    assert_eq!(partitions.len(), 1);
    assert_eq!(partitions[0]["name"], "contact-data-description");
    assert_eq!(partitions[0]["location"], "contact/partition-data.csv");
    assert_eq!(partitions[0]["explanation"], "not real data, just for demo");
    assert_eq!(partitions[0]["exhibitsTraits"][0]["traitReference"], "is.partition.format.CSV");
    assert_eq!(partitions[0]["exhibitsTraits"][0]["arguments"][0]["value"], "true");
    assert_eq!(partitions[0]["exhibitsTraits"][0]["arguments"][1]["value"], ",");

    assert_eq!(ws.read_local("contact/partition-data.csv"), "contactid,lastname");
    assert!(ws.local_root.join("contact.cdm.json").is_file());
}

#[tokio::test]
async fn test_empty_snapshot_saves_manifest_with_foundations_only() {
    let ws = Workspace::new();
    ws.write_snapshot(&MetadataSnapshot::new("MySolution"));

    let outcome = build(&ws.snapshot_path, &ws.corpus(), &fixtures::options())
        .await
        .unwrap();

    assert_eq!(outcome.entities_declared, 0);
    assert!(outcome.partitions.is_empty());

    let manifest = ws.manifest_json();
    assert_eq!(manifest["entities"].as_array().unwrap().len(), 0);
    assert_eq!(
        manifest["imports"],
        serde_json::json!([{ "corpusPath": "cdm:/foundations.cdm.json" }])
    );

    let written: Vec<_> = std::fs::read_dir(&ws.local_root)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(written, vec!["default.manifest.cdm.json"]);
}

#[tokio::test]
async fn test_duplicate_logical_names_collapse() {
    let ws = Workspace::new();
    let mut snapshot = fixtures::account_snapshot();
    snapshot.push_entity(EntityRecord::new("account", Vec::new()));
    ws.write_snapshot(&snapshot);

    let outcome = build(&ws.snapshot_path, &ws.corpus(), &fixtures::options())
        .await
        .unwrap();

    assert_eq!(outcome.entities_declared, 1);
    assert_eq!(ws.manifest_json()["entities"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_truncated_snapshot_fails_without_output() {
    let ws = Workspace::new();
    std::fs::write(&ws.snapshot_path, r#"{ "SolutionName": "MySolution", "Entities": [ { "Logi"#).unwrap();

    let err = build(&ws.snapshot_path, &ws.corpus(), &fixtures::options())
        .await
        .unwrap_err();

    assert!(matches!(err, BuildError::Parse(_)));
    assert!(!ws.local_root.exists());
}

#[tokio::test]
async fn test_missing_snapshot_is_io_error() {
    let ws = Workspace::new();

    let err = build(&ws.snapshot_path, &ws.corpus(), &fixtures::options())
        .await
        .unwrap_err();
    assert!(matches!(err, BuildError::Io(_)));
}

#[tokio::test]
async fn test_unknown_entity_fails_resolution_without_output() {
    let ws = Workspace::new();
    let mut snapshot = fixtures::crm_snapshot();
    snapshot.push_entity(EntityRecord::new("lead", Vec::new()));
    ws.write_snapshot(&snapshot);

    let err = build(&ws.snapshot_path, &ws.corpus(), &fixtures::options())
        .await
        .unwrap_err();

    assert!(matches!(err, BuildError::Resolution(CorpusError::DocumentNotFound(_))));
    assert!(!ws.local_root.exists());
}

#[tokio::test]
async fn test_build_is_idempotent() {
    let ws = Workspace::new();
    ws.write_snapshot(&fixtures::crm_snapshot());
    let corpus = ws.corpus();

    build(&ws.snapshot_path, &corpus, &fixtures::options()).await.unwrap();
    let first_manifest = ws.read_local("default.manifest.cdm.json");
    let first_partition = ws.read_local("account/partition-data.csv");

    build(&ws.snapshot_path, &corpus, &fixtures::options()).await.unwrap();

    assert_eq!(ws.read_local("default.manifest.cdm.json"), first_manifest);
    assert_eq!(ws.read_local("account/partition-data.csv"), first_partition);
    assert_eq!(ws.manifest_json()["imports"].as_array().unwrap().len(), 1);
}

/// Corpus that resolves normally but cannot fetch entities
struct FetchFailingCorpus {
    inner: LocalCorpus,
}

#[async_trait::async_trait]
impl SchemaCorpus for FetchFailingCorpus {
    fn mount(&mut self, namespace: &str, adapter: Arc<dyn StorageAdapter>) {
        self.inner.mount(namespace, adapter);
    }

    fn default_namespace(&self) -> &str {
        self.inner.default_namespace()
    }

    fn root_folder(&self, namespace: &str) -> Result<CorpusPath, CorpusError> {
        self.inner.root_folder(namespace)
    }

    async fn resolve_manifest(
        &self,
        draft: &ManifestDraft,
        options: &ResolutionOptions,
    ) -> Result<ManifestResolved, CorpusError> {
        self.inner.resolve_manifest(draft, options).await
    }

    async fn fetch_entity(
        &self,
        entity_path: &str,
        _manifest: &ManifestResolved,
    ) -> Result<ResolvedEntity, CorpusError> {
        Err(CorpusError::DocumentNotFound(entity_path.to_string()))
    }

    fn create_relative_corpus_path(
        &self,
        path: &str,
        manifest: &ManifestResolved,
    ) -> Result<String, CorpusError> {
        self.inner.create_relative_corpus_path(path, manifest)
    }

    fn corpus_path_to_adapter_path(&self, path: &str) -> Result<PathBuf, CorpusError> {
        self.inner.corpus_path_to_adapter_path(path)
    }

    async fn write_text(&self, path: &str, content: &str) -> Result<(), CorpusError> {
        self.inner.write_text(path, content).await
    }

    async fn save_manifest(
        &self,
        manifest: &ManifestResolved,
        document_name: &str,
        overwrite: bool,
    ) -> Result<CorpusPath, CorpusError> {
        self.inner.save_manifest(manifest, document_name, overwrite).await
    }
}

#[tokio::test]
async fn test_fetch_failure_leaves_no_output() {
    let ws = Workspace::new();
    ws.write_snapshot(&fixtures::crm_snapshot());
    let corpus = FetchFailingCorpus { inner: ws.corpus() };

    let err = build(&ws.snapshot_path, &corpus, &fixtures::options())
        .await
        .unwrap_err();

    assert!(matches!(err, BuildError::Fetch { ref entity, .. } if entity == "account"));
    assert!(!ws.local_root.exists());
}

// =============================================================================
// Exporter
// =============================================================================

#[tokio::test]
async fn test_export_writes_snapshot_in_source_order() {
    let ws = Workspace::new();
    let source = MockSourceBuilder::new()
        .with_entity(
            "contact",
            &[("contactid", AttributeType::Uniqueidentifier), ("lastname", AttributeType::String)],
        )
        .with_entity("account", &[("name", AttributeType::String)])
        .build();

    let outcome = export(&source, &ExportOptions::new("MySolution", &ws.snapshot_path))
        .await
        .unwrap();

    assert_eq!(outcome.source, "Mock");
    assert_eq!(outcome.entities, 2);
    assert_eq!(outcome.attributes, 3);

    let snapshot = MetadataSnapshot::from_file(&ws.snapshot_path).unwrap();
    assert_eq!(snapshot.entities[0].logical_name, "contact");
    assert_eq!(snapshot.entities[0].csv_header(), "contactid,lastname");
    assert_eq!(snapshot.entities[0].attributes[0].attribute_type, "Uniqueidentifier");

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&ws.snapshot_path).unwrap()).unwrap();
    assert_eq!(raw["Entities"][1]["Attributes"][0]["Type"], "String");

    let queries = source.received_queries().await;
    assert_eq!(queries.len(), 1);
    assert!(queries[0].includes_attributes());
    assert!(queries[0].retrieve_as_if_published);
}

#[tokio::test]
async fn test_export_overwrites_previous_snapshot() {
    let ws = Workspace::new();
    std::fs::write(&ws.snapshot_path, "stale content that is much longer than the new snapshot").unwrap();

    let source = MockSourceBuilder::new().build();
    export(&source, &ExportOptions::new("Empty", &ws.snapshot_path))
        .await
        .unwrap();

    let snapshot = MetadataSnapshot::from_file(&ws.snapshot_path).unwrap();
    assert_eq!(snapshot, MetadataSnapshot::new("Empty"));
}

#[tokio::test]
async fn test_export_connection_failure_writes_nothing() {
    let ws = Workspace::new();
    let source = MockSourceBuilder::new()
        .with_entity("account", &[("name", AttributeType::String)])
        .with_connection_failure()
        .build();

    let err = export(&source, &ExportOptions::new("MySolution", &ws.snapshot_path))
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Connection { .. }));
    assert!(!ws.snapshot_path.exists());
    assert!(source.received_queries().await.is_empty());
}

#[tokio::test]
async fn test_export_transport_error() {
    let ws = Workspace::new();
    let source = MockSourceBuilder::new()
        .with_query_error(SourceError::TransportError("connection reset".to_string()))
        .build();

    let err = export(&source, &ExportOptions::new("MySolution", &ws.snapshot_path))
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Transport(SourceError::TransportError(_))));
    assert!(!ws.snapshot_path.exists());
}

// =============================================================================
// Pipeline
// =============================================================================

fn pipeline_options(ws: &Workspace) -> PipelineOptions {
    PipelineOptions {
        export: ExportOptions::new("MySolution", &ws.snapshot_path),
        build: fixtures::options(),
    }
}

#[tokio::test]
async fn test_pipeline_exports_then_builds() {
    let ws = Workspace::new();
    let source = MockSourceBuilder::new()
        .with_entity(
            "account",
            &[("name", AttributeType::String), ("revenue", AttributeType::Double)],
        )
        .build();

    let outcome = run(&source, &ws.corpus(), &pipeline_options(&ws)).await.unwrap();

    assert_eq!(outcome.export.entities, 1);
    assert_eq!(outcome.build.entities_declared, 1);
    assert_eq!(ws.read_local("account/partition-data.csv"), "name,revenue");

    let report = outcome.report();
    assert_eq!(report.export.as_ref().unwrap().attributes, 2);
    assert_eq!(report.build.as_ref().unwrap().partitions_written.len(), 1);
}

#[tokio::test]
async fn test_pipeline_stops_after_failed_export() {
    let ws = Workspace::new();
    let source = MockSourceBuilder::new().with_connection_failure().build();

    let err = run(&source, &ws.corpus(), &pipeline_options(&ws)).await.unwrap_err();

    assert!(matches!(err, PipelineError::Export(ExportError::Connection { .. })));
    assert!(!ws.snapshot_path.exists());
    assert!(!ws.local_root.exists());
}
