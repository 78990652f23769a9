//! Command-line interface definitions for fdup.
//!
//! # Example
//!
//! ```bash
//! # List duplicates of the current directory, NUL-separated
//! fdup | xargs -0 ls -l
//!
//! # Human-readable listing
//! fdup -v ~/Downloads
//!
//! # Full groups as JSON, four hashing threads
//! fdup --json --threads 4 ~/Downloads
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Find files with byte-identical content.
///
/// Without --verbose, prints every duplicate except the first of its group,
/// each path terminated by a NUL byte.
#[derive(Debug, Parser)]
#[command(name = "fdup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan (defaults to the current directory)
    #[arg(value_name = "ROOT")]
    pub root: Option<PathBuf>,

    /// Print "<first>: <other>" lines under a header instead of NUL-terminated paths
    #[arg(short, long)]
    pub verbose: bool,

    /// Print full duplicate groups and a summary as JSON
    #[arg(long, conflicts_with_all = ["verbose", "strategy"])]
    pub json: bool,

    /// Grouping strategy
    #[arg(long, value_enum, default_value_t = Strategy::FullMap)]
    pub strategy: Strategy,

    /// Threads used to read directories and, with the full-map strategy, to fingerprint files
    #[arg(short = 't', long, value_name = "N", default_value_t = 1)]
    pub threads: usize,

    /// Skip unreadable files with a warning instead of aborting
    #[arg(short = 'k', long)]
    pub keep_going: bool,

    /// Descend into symlinked directories
    ///
    /// Warning: May loop if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Increase log verbosity on stderr (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "debug")]
    pub quiet: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

impl Cli {
    /// Output format selected by the flags.
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.verbose {
            OutputFormat::Verbose
        } else {
            OutputFormat::Nul
        }
    }
}

/// How fingerprints are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Strategy {
    /// Collect all fingerprints, then report complete groups
    #[default]
    FullMap,
    /// Report each duplicate as soon as its content repeats
    Streaming,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::FullMap => write!(f, "full-map"),
            Strategy::Streaming => write!(f, "streaming"),
        }
    }
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// NUL-terminated non-first paths
    Nul,
    /// Header plus `first: other` lines
    Verbose,
    /// JSON document
    Json,
}
