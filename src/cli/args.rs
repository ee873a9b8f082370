//! Command line argument parsing for the candor CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// candor - fake product review detection
#[derive(Parser, Debug, Clone)]
#[command(name = "candor")]
#[command(about = "Train and run a genuine/fake product review classifier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct CandorArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl CandorArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train a classifier and write its artifacts
    Train(TrainArgs),

    /// Classify a single review
    Check(CheckArgs),

    /// Classify one review per line from a file or stdin
    Batch(BatchArgs),

    /// Show what an artifact pair contains
    Inspect(InspectArgs),
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// JSON training configuration; flags below override its fields
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Labeled CSV dataset
    #[arg(short, long, value_name = "CSV_FILE", env = "CANDOR_DATASET")]
    pub dataset: Option<PathBuf>,

    /// Directory to write vectorizer.bin and model.bin into
    #[arg(short, long, value_name = "DIR", env = "CANDOR_ARTIFACTS")]
    pub output_dir: Option<PathBuf>,

    /// Column holding the review text
    #[arg(long)]
    pub text_column: Option<String>,

    /// Column holding the label
    #[arg(long)]
    pub label_column: Option<String>,

    /// CSV field delimiter
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Vocabulary size limit
    #[arg(long)]
    pub max_features: Option<usize>,

    /// Fraction of rows held out for evaluation
    #[arg(long)]
    pub test_size: Option<f64>,

    /// Seed for the train/test shuffle
    #[arg(long)]
    pub seed: Option<u64>,

    /// Split without preserving class proportions
    #[arg(long)]
    pub no_stratify: bool,

    /// Inverse regularization strength (C)
    #[arg(long = "inverse-regularization", value_name = "C")]
    pub c: Option<f64>,

    /// Optimizer iteration limit
    #[arg(long)]
    pub max_iter: Option<usize>,

    /// Skip the post-training sample prediction
    #[arg(long)]
    pub no_sample: bool,
}

/// Arguments for checking one review
#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    /// Review text
    #[arg(value_name = "REVIEW")]
    pub review: String,

    /// Directory holding the trained artifacts
    #[arg(short, long, value_name = "DIR", env = "CANDOR_ARTIFACTS", default_value = "artifacts")]
    pub artifacts: PathBuf,
}

/// Arguments for batch scoring
#[derive(Parser, Debug, Clone)]
pub struct BatchArgs {
    /// File with one review per line, or '-' for stdin
    #[arg(value_name = "INPUT", default_value = "-")]
    pub input: PathBuf,

    /// Directory holding the trained artifacts
    #[arg(short, long, value_name = "DIR", env = "CANDOR_ARTIFACTS", default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// Number of worker threads (default: all cores)
    #[arg(short, long)]
    pub threads: Option<usize>,
}

/// Arguments for inspecting artifacts
#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    /// Directory holding the trained artifacts
    #[arg(value_name = "DIR", env = "CANDOR_ARTIFACTS", default_value = "artifacts")]
    pub artifacts: PathBuf,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output (one object per line for batch)
    Json,
}
