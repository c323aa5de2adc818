use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cdmbridge_core::{Config, RunReport};
use cdmbridge_corpus::LocalCorpus;
use cdmbridge_engine::{
    BuildError, BuildOutcome, ExportError, ExportOptions, ExportOutcome, PipelineError,
    PipelineOptions,
};
use cdmbridge_source::{MetadataSource, ResponseFileSource};

const DEFAULT_CONFIG_FILE: &str = "cdmbridge.toml";

/// cdmbridge - Export platform metadata and build a CDM manifest
#[derive(Parser)]
#[command(name = "cdmbridge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: cdmbridge.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export entity metadata into a snapshot file
    Export {
        /// Snapshot output file (default: snapshot_path from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Saved metadata response to replay (default: source.response_file)
        #[arg(short, long)]
        response_file: Option<PathBuf>,
    },

    /// Build the manifest and partitions from a snapshot file
    Build {
        /// Snapshot input file (default: snapshot_path from config)
        #[arg(short, long)]
        snapshot: Option<PathBuf>,
    },

    /// Export, then build
    Run {
        /// Saved metadata response to replay (default: source.response_file)
        #[arg(short, long)]
        response_file: Option<PathBuf>,

        /// Output file for report.json
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Write a default cdmbridge.toml
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Export { output, response_file } => {
            let config = load_config(cli.config.as_deref(), cli.verbose)?;
            export_command(&config, output, response_file, cli.verbose).await
        }
        Commands::Build { snapshot } => {
            let config = load_config(cli.config.as_deref(), cli.verbose)?;
            build_command(&config, snapshot, cli.verbose).await
        }
        Commands::Run { response_file, report } => {
            let config = load_config(cli.config.as_deref(), cli.verbose)?;
            run_command(&config, response_file, report, cli.verbose).await
        }
        Commands::Init { force } => {
            init_command(cli.config.as_deref().unwrap_or(Path::new(DEFAULT_CONFIG_FILE)), force)
        }
    }
}

/// Load the config file, then `.env` and environment overrides
fn load_config(config_path: Option<&Path>, verbose: bool) -> Result<Config> {
    dotenvy::dotenv().ok();

    let mut config = if let Some(config_path) = config_path {
        Config::from_file(config_path)?
    } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
        Config::from_file(Path::new(DEFAULT_CONFIG_FILE))?
    } else {
        if verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };
    config.apply_env_overrides(|key| std::env::var(key).ok());

    Ok(config)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Export command - write the metadata snapshot
async fn export_command(
    config: &Config,
    output: Option<PathBuf>,
    response_file: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let source = open_source(config, response_file, verbose)?;

    let mut options = ExportOptions::from_config(config);
    if let Some(output) = output {
        options.snapshot_path = output;
    }

    match cdmbridge_engine::export(source.as_ref(), &options).await {
        Ok(outcome) => {
            print_export_summary(&outcome);
            Ok(())
        }
        Err(e) => Err(report_export_error(e)),
    }
}

/// Build command - resolve the manifest and write partitions
async fn build_command(config: &Config, snapshot: Option<PathBuf>, verbose: bool) -> Result<()> {
    let snapshot = snapshot.unwrap_or_else(|| config.snapshot_file());
    let corpus = open_corpus(config, verbose);

    if verbose {
        eprintln!("{} {}", "Loading snapshot from:".cyan(), snapshot.display());
    }

    match cdmbridge_engine::build(&snapshot, &corpus, &config.manifest).await {
        Ok(outcome) => {
            print_build_summary(&outcome);
            Ok(())
        }
        Err(e) => Err(report_build_error(e)),
    }
}

/// Run command - export then build, optionally writing a report
async fn run_command(
    config: &Config,
    response_file: Option<PathBuf>,
    report: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let source = open_source(config, response_file, verbose)?;
    let corpus = open_corpus(config, verbose);
    let options = PipelineOptions::from_config(config);

    let outcome = match cdmbridge_engine::run(source.as_ref(), &corpus, &options).await {
        Ok(outcome) => outcome,
        Err(PipelineError::Export(e)) => return Err(report_export_error(e)),
        Err(PipelineError::Build(e)) => return Err(report_build_error(e)),
    };

    print_export_summary(&outcome.export);
    print_build_summary(&outcome.build);

    if let Some(path) = report {
        save_report(&outcome.report(), &path)?;
        if verbose {
            eprintln!("{} {}", "Report saved to:".green(), path.display());
        }
    }

    Ok(())
}

/// Init command - write a config file with every default spelled out
fn init_command(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(anyhow::anyhow!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        ));
    }

    Config::default().save_to_file(path)?;
    println!("{} {}", "✓ Wrote".green(), path.display());
    Ok(())
}

/// Pick the metadata source from the command line and config
///
/// Only saved responses can be replayed; the connection string is
/// validated and shown but no live session is opened.
fn open_source(
    config: &Config,
    response_file: Option<PathBuf>,
    verbose: bool,
) -> Result<Box<dyn MetadataSource>> {
    let connection = config.connection()?;
    if let Some(connection) = &connection {
        if verbose {
            eprintln!("{} {}", "Environment:".cyan(), connection);
        }
        if !connection.ignored_keys.is_empty() {
            tracing::debug!(keys = ?connection.ignored_keys, "Ignoring connection string keys");
        }
        if !connection.has_client_credentials() {
            tracing::warn!(url = %connection.url, "Connection string has incomplete client credentials");
        }
    }

    let path = response_file
        .or_else(|| config.source.response_file.as_ref().map(|p| config.resolve_path(p)))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No metadata source configured. Set source.response_file in {} \
                 or pass --response-file.",
                DEFAULT_CONFIG_FILE
            )
        })?;

    if verbose {
        eprintln!("{} {}", "Replaying metadata response from:".cyan(), path.display());
    }

    Ok(Box::new(ResponseFileSource::new(path)))
}

fn open_corpus(config: &Config, verbose: bool) -> LocalCorpus {
    if verbose {
        eprintln!("{} {}", "Output root:".cyan(), config.local_root().display());
        eprintln!("{} {}", "Schema root:".cyan(), config.cdm_root().display());
    }
    LocalCorpus::with_roots(config.local_root(), config.cdm_root())
}

fn report_export_error(error: ExportError) -> anyhow::Error {
    match &error {
        ExportError::Connection { .. } => {
            eprintln!("{}", "✗ Metadata source is not ready".red().bold());
        }
        _ => eprintln!("{}", "✗ Export failed".red().bold()),
    }
    error.into()
}

fn report_build_error(error: BuildError) -> anyhow::Error {
    match &error {
        BuildError::Parse(_) => eprintln!("{}", "✗ Snapshot is malformed, nothing written".red().bold()),
        BuildError::Resolution(_) | BuildError::Fetch { .. } => {
            eprintln!("{}", "✗ Schema resolution failed, nothing written".red().bold())
        }
        _ => eprintln!("{}", "✗ Build failed".red().bold()),
    }
    error.into()
}

fn save_report(report: &RunReport, path: &Path) -> Result<()> {
    report
        .save_to_file(path)
        .map_err(|e| anyhow::anyhow!("Failed to write report {}: {}", path.display(), e))
}

fn print_export_summary(outcome: &ExportOutcome) {
    println!("{} {}", "✓ Connected to".green(), outcome.source);
    println!(
        "  Exported {} entities, {} attributes",
        format!("{}", outcome.entities).bold(),
        outcome.attributes
    );
    println!("  Snapshot: {}", outcome.snapshot_path.display());
}

fn print_build_summary(outcome: &BuildOutcome) {
    println!("{} {}", "✓ Built manifest".green(), outcome.manifest_name.bold());
    println!("  Entities declared: {}", outcome.entities_declared);
    println!("  Partitions written: {}", outcome.partitions.len());
    println!("  Manifest: {}", outcome.manifest_path.display());
}
