//! Export followed by build

use crate::builder::{build, BuildError, BuildOptions, BuildOutcome};
use crate::exporter::{export, ExportError, ExportOptions, ExportOutcome};
use cdmbridge_core::{Config, RunReport};
use cdmbridge_corpus::SchemaCorpus;
use cdmbridge_source::MetadataSource;

/// Settings for both stages
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub export: ExportOptions,
    pub build: BuildOptions,
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            export: ExportOptions::from_config(config),
            build: config.manifest.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub export: ExportOutcome,
    pub build: BuildOutcome,
}

impl PipelineOutcome {
    pub fn report(&self) -> RunReport {
        RunReport::new()
            .with_export(self.export.summary())
            .with_build(self.build.summary())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Build failed: {0}")]
    Build(#[from] BuildError),
}

/// Run the exporter, then the builder on the snapshot it wrote
///
/// The build stage only starts once the export succeeded.
pub async fn run(
    source: &dyn MetadataSource,
    corpus: &dyn SchemaCorpus,
    options: &PipelineOptions,
) -> Result<PipelineOutcome, PipelineError> {
    let export = export(source, &options.export).await?;
    let build = build(&export.snapshot_path, corpus, &options.build).await?;

    Ok(PipelineOutcome { export, build })
}
