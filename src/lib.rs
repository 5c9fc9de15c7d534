//! yolo-ingest: fetch object-detection datasets and flatten them for training.
//!
//! A dataset is downloaded from a hub (Kaggle, Hugging Face, or a local
//! path), unzipped if needed, and every image and label file found anywhere
//! in it is copied into `<target>/raw/Images` and `<target>/raw/Labels`.
//!
//! # Modules
//!
//! - [`ingest`]: The ingestion pipeline (`DataIngestion`)
//! - [`hub`]: Dataset hub clients and identifier parsing
//! - [`verify`]: Checks for an already ingested raw directory
//! - [`config`]: CLI/file/default configuration layering
//! - [`error`]: Error types for yolo-ingest operations

pub mod config;
pub mod error;
pub mod hub;
pub mod ingest;
pub mod logging;
pub mod verify;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub use error::{IngestError, IngestStage};
pub use ingest::{DataIngestion, IngestReport};

use config::{ConfigOverrides, FileConfig, IngestConfig};
use hub::RemoteHub;
use ingest::CollisionPolicy;

/// The yolo-ingest CLI application.
#[derive(Parser)]
#[command(name = "yolo-ingest")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// More log output (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Download a dataset and normalize it into raw/Images and raw/Labels.
    Ingest(IngestArgs),
    /// Check an existing raw directory for missing, stray or unpaired files.
    Verify(VerifyArgs),
}

/// Arguments for the ingest subcommand.
#[derive(clap::Args)]
struct IngestArgs {
    /// YAML config file with default values for the flags below.
    #[arg(long, env = "YOLO_INGEST_CONFIG")]
    config: Option<PathBuf>,

    /// Dataset identifier ('owner/slug', 'kaggle:…', 'hf:…', a dataset URL, or 'file:<path>').
    #[arg(long, env = "YOLO_INGEST_DATASET")]
    dataset: Option<String>,

    /// Root directory that receives raw/Images and raw/Labels.
    #[arg(long, env = "YOLO_INGEST_TARGET_DIR")]
    target_dir: Option<PathBuf>,

    /// Download cache for remote hubs.
    #[arg(long, env = "YOLO_INGEST_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Dataset version (Kaggle) or git revision (Hugging Face).
    #[arg(long)]
    revision: Option<String>,

    /// What to do when two source files share a file name.
    #[arg(long, value_enum)]
    collisions: Option<CollisionPolicy>,

    /// Hugging Face access token for private or gated datasets.
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    hf_token: Option<String>,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

/// Arguments for the verify subcommand.
#[derive(clap::Args)]
struct VerifyArgs {
    /// Raw directory containing Images/ and Labels/.
    raw_dir: PathBuf,

    /// Treat warnings as errors (exit non-zero if any warnings).
    #[arg(long)]
    strict: bool,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Run the yolo-ingest CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), IngestError> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    match cli.command {
        Some(Commands::Ingest(args)) => run_ingest(args),
        Some(Commands::Verify(args)) => run_verify(args),
        None => {
            println!("yolo-ingest {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Download object-detection datasets into flat Images/ and Labels/ folders.");
            println!();
            println!("Run 'yolo-ingest --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the ingest subcommand.
fn run_ingest(args: IngestArgs) -> Result<(), IngestError> {
    let file = match args.config.as_deref() {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let overrides = ConfigOverrides {
        dataset: args.dataset,
        target_dir: args.target_dir,
        cache_dir: args.cache_dir,
        revision: args.revision,
        collisions: args.collisions,
    };
    let config = IngestConfig::resolve(overrides, file)?;

    let hub = RemoteHub::new(&config.cache_dir)
        .with_revision(config.revision.clone())
        .with_hf_token(args.hf_token);
    let ingestion = DataIngestion::new(config.dataset, config.target_dir, hub)
        .with_collision_policy(config.collisions);

    let report = ingestion.run()?;

    match args.output {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&report).map_err(IngestError::ReportSerialize)?;
            println!("{json}");
        }
        OutputFormat::Text => print!("{report}"),
    }

    Ok(())
}

/// Execute the verify subcommand.
fn run_verify(args: VerifyArgs) -> Result<(), IngestError> {
    let opts = verify::VerifyOptions {
        strict: args.strict,
    };
    let report = verify::verify_raw_dir(&args.raw_dir, &opts)?;

    match args.output {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&report).map_err(IngestError::ReportSerialize)?;
            println!("{json}");
        }
        OutputFormat::Text => print!("{report}"),
    }

    if !report.passed() {
        Err(IngestError::VerifyFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report,
        })
    } else {
        Ok(())
    }
}
