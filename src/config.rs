//! Configuration types for gzdir
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation

use crate::error::ConfigError;
use clap::Parser;
use std::path::PathBuf;

/// Maximum reasonable worker count
pub(crate) const MAX_WORKERS: usize = 512;

/// Compress every file in a directory into per-file gzip outputs
#[derive(Parser, Debug, Clone)]
#[command(
    name = "gzdir",
    version,
    about = "Compress every file in a directory into per-file gzip outputs",
    long_about = "Compresses each regular file directly under the source directory into an \
                  individually gzipped file in the destination directory, using a bounded \
                  pool of worker threads.\n\n\
                  Immediate subdirectory names are recorded in a 'directoris.txt' manifest \
                  in the destination; subdirectory contents are not descended into.",
    after_help = "EXAMPLES:\n    \
        gzdir --src /var/log/archive --dst /backup/logs\n    \
        gzdir --src ./reports --dst ./reports-gz -w 8\n    \
        gzdir --src ./data --dst ./out -w 4 -q"
)]
pub struct CliArgs {
    /// Source directory to compress
    #[arg(long = "src", value_name = "DIR")]
    pub src: PathBuf,

    /// Destination directory for .gz outputs (created if absent)
    #[arg(long = "dst", value_name = "DIR")]
    pub dst: PathBuf,

    /// Number of concurrent compression workers
    #[arg(
        short = 'w',
        long,
        default_value_t = default_workers(),
        value_name = "NUM"
    )]
    pub workers: usize,

    /// Quiet mode - suppress header, progress bar and summary
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (debug-level logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

fn default_workers() -> usize {
    // Compression is CPU bound, so default to one worker per logical core
    num_cpus::get().max(1)
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct CompressConfig {
    /// Source directory to scan
    pub source: PathBuf,

    /// Destination directory for outputs and the manifest
    pub dest: PathBuf,

    /// Worker pool size (1..=MAX_WORKERS)
    pub workers: usize,

    /// Whether to show the header, progress bar and summary
    pub show_progress: bool,
}

impl CompressConfig {
    /// Build a validated configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        validate_workers(args.workers)?;

        Ok(Self {
            source: args.src,
            dest: args.dst,
            workers: args.workers,
            show_progress: !args.quiet,
        })
    }
}

/// Check a worker count against the allowed range
pub(crate) fn validate_workers(count: usize) -> Result<(), ConfigError> {
    if count == 0 || count > MAX_WORKERS {
        return Err(ConfigError::InvalidWorkerCount {
            count,
            max: MAX_WORKERS,
        });
    }
    Ok(())
}
