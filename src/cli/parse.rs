//! CLI parse: clap types for timevouch. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// timevouch - register files and directory trees with the TimeVouch timestamping service
#[derive(Parser)]
#[command(name = "timevouch")]
#[command(about = "Register files and directory trees with the TimeVouch timestamping service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory searched for timevouch.toml
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Secret word sent with every registration
    #[arg(long)]
    pub secret: Option<String>,

    /// Service endpoint (overrides configuration)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Register against an empty in-memory registry instead of the service
    #[arg(long)]
    pub offline: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = FormatArg::Text)]
    pub format: FormatArg,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the content digest of a file without registering it
    Digest {
        path: PathBuf,
    },
    /// Register the digest of a literal string
    RegisterString {
        data: String,
    },
    /// Register the content digest of a file
    RegisterFile {
        path: PathBuf,
    },
    /// Register a precomputed hex digest
    RegisterDigest {
        digest: String,
    },
    /// Register every file and directory of a tree, deepest first
    RegisterTree {
        path: PathBuf,
        /// Stop at the first new or changed file or directory
        #[arg(long)]
        stop_on_first_change: bool,
    },
    /// Print the effective configuration
    Config,
}
