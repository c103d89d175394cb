//! Argument parsing. A thin harness over the core pipeline, not a
//! product surface: four subcommands exercise scan, clean, trace, and
//! audit end to end.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "swiftsweep")]
#[command(about = "Recommendation and safe-execution pipeline for macOS disk hygiene", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Override the home directory the pipeline scans under (defaults to
    /// the current user's home). Mainly useful for exercising the CLI
    /// against a scratch directory.
    #[arg(long, global = true, value_name = "PATH")]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a context snapshot and print ranked recommendations.
    Scan {
        /// Exit with status 2 if any recommendation has critical severity.
        #[arg(long)]
        fail_on_critical: bool,

        /// Print recommendations as JSON instead of a human-readable list.
        #[arg(long)]
        json: bool,
    },

    /// Evaluate recommendations, then execute their cleanup actions.
    Clean {
        /// Preview what would happen without mutating the filesystem.
        /// Implied when `--yes` is not passed.
        #[arg(long)]
        dry_run: bool,

        /// Actually perform the cleanup. Without this flag, `clean` always
        /// runs as a dry run regardless of `--dry-run`.
        #[arg(long)]
        yes: bool,

        /// Only execute recommendations at or above this severity
        /// (critical, warning, info). Defaults to warning.
        #[arg(long, default_value = "warning")]
        min_severity: String,

        /// Exit with status 2 if any evaluated recommendation has critical
        /// severity.
        #[arg(long)]
        fail_on_critical: bool,
    },

    /// Run the self-tracing I/O subsystem around a context scan and print
    /// detected hotspots.
    Trace {
        /// Print hotspots as JSON instead of a human-readable list.
        #[arg(long)]
        json: bool,
    },

    /// Print the most recent audit log entries.
    Audit {
        /// Number of most recent entries to show.
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
