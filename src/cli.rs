//! Command-line interface implementation for attrforge.
//! Provides argument parsing using clap.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments structure for attrforge.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "attrforge: incremental attribute set code generator",
    long_about = None
)]
pub struct Args {
    /// Input directory containing attribute set assets (repeatable)
    #[arg(short, long = "input", value_name = "DIR")]
    pub input: Vec<PathBuf>,

    /// Output directory for generated attribute set files
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Optional configuration file overriding inputs and outputs
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Manifest file path recording generation details
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Log file path recording generator activity
    #[arg(long, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Force regeneration even when hashes are unchanged
    #[arg(short, long)]
    pub force: bool,

    /// Compute and report every decision without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Discard existing preserve-region content on rewritten files
    #[arg(long)]
    pub no_preserve: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses command line arguments and returns the Args structure.
pub fn get_args() -> Args {
    Args::parse()
}
