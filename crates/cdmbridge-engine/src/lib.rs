//! cdmbridge engine
//!
//! The two pipeline stages:
//! - Metadata export (source -> snapshot file)
//! - Manifest build (snapshot file -> manifest and CSV partitions)

pub mod builder;
pub mod exporter;
pub mod pipeline;

pub use builder::{build, draft_from_snapshot, BuildError, BuildOptions, BuildOutcome, PARTITION_FILE_NAME};
pub use exporter::{export, flatten, ExportError, ExportOptions, ExportOutcome};
pub use pipeline::{run, PipelineError, PipelineOptions, PipelineOutcome};
