//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - run: full pipeline steered from stdin or a script
//! - baseline: pipeline without the signal bus

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// pcbus - a bounded producer/consumer pipeline steered over one signal bus
#[derive(Parser, Debug)]
#[command(name = "pcbus")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log to stderr instead of the log file
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the pipeline, reading commands from stdin or a script
    Run(RunArgs),

    /// Run the pipeline without pause control
    Baseline {
        /// Queue capacity
        #[arg(long)]
        capacity: Option<usize>,

        /// Number of items to produce
        #[arg(short, long)]
        total: Option<u64>,
    },
}

/// Arguments for the run subcommand
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Queue capacity
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Number of items to produce
    #[arg(short, long)]
    pub total: Option<u64>,

    /// Consumer idle observation interval in microseconds (0 disables)
    #[arg(long)]
    pub idle_us: Option<u64>,

    /// Read commands from this file instead of stdin
    #[arg(short, long)]
    pub script: Option<PathBuf>,
}
