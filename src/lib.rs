//! gzdir - Bounded Parallel Directory Compression
//!
//! A tool that compresses every regular file directly under a source
//! directory into an individually gzipped file in a destination
//! directory, and records the source's immediate subdirectory names in
//! a manifest.
//!
//! # Features
//!
//! - **Bounded Parallelism**: A fixed pool of worker threads drains a
//!   shared work queue; at most N compressions run at any instant.
//!
//! - **Failure Isolation**: A failed file is captured in the aggregate
//!   report and never aborts the rest of the batch.
//!
//! - **Structured Results**: The batch returns an [`AggregateReport`]
//!   with counts and named failures; console output is a thin layer on
//!   top of it.
//!
//! - **Cooperative Cancellation**: Ctrl-C sets a shared flag that
//!   workers check between items.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Source Directory                            │
//! │          (regular files + immediate subdirectories)              │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//!                               │ one non-recursive scan
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Work Queue                                  │
//! │        (crossbeam bounded, seeded once, then closed)             │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//!       ┌───────────────────────┼───────────────────────┐
//!       ▼                       ▼                       ▼
//! ┌─────────┐             ┌─────────┐             ┌─────────┐
//! │Worker 1 │             │Worker 2 │    ...      │Worker N │
//! │  gzip   │             │  gzip   │             │  gzip   │
//! └────┬────┘             └────┬────┘             └────┬────┘
//!      │                       │                       │
//!      └───────────────────────┼───────────────────────┘
//!                              │ per-item outcomes
//!                              ▼
//!                   ┌──────────────────────┐
//!                   │   AggregateReport    │
//!                   │ (counts + failures)  │
//!                   └──────────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Compress a directory with 8 workers
//! gzdir --src /var/log/archive --dst /backup/logs -w 8
//!
//! # Verify an output
//! gunzip -t /backup/logs/syslog.1.gz
//! ```

pub mod compress;
pub mod config;
pub mod error;
pub mod prepare;
pub mod progress;

pub use compress::{compress_all, AggregateReport, CompressCoordinator, ItemFailure};
pub use config::{CliArgs, CompressConfig};
pub use error::{GzdirError, ItemOutcome, Result};
pub use prepare::{DirScan, MANIFEST_NAME};
