//! Compression coordinator - orchestrates the bounded parallel batch
//!
//! The coordinator is responsible for:
//! - Checking structural preconditions before any work is dispatched
//! - Deriving destinations and seeding the work queue
//! - Spawning and joining the worker pool
//! - Fan-in of per-item outcomes into the aggregate report
//!
//! Completion is detected by draining the results channel until every
//! worker has dropped its sender, so the call never returns while work
//! is outstanding and never polls.

use crate::compress::queue::{QueueStats, WorkItem, WorkQueue};
use crate::compress::worker::{BatchStats, Worker};
use crate::config;
use crate::error::{GzdirError, ItemOutcome, PrepareError, Result};
use crate::prepare;
use crossbeam_channel::bounded;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// One failed item, named with its cause
#[derive(Debug, Clone)]
pub struct ItemFailure {
    /// Source file that failed
    pub source: PathBuf,

    /// Why it failed
    pub reason: String,
}

/// Result of a completed compression batch
#[derive(Debug)]
pub struct AggregateReport {
    /// Items submitted
    pub total: u64,

    /// Items compressed successfully
    pub succeeded: u64,

    /// Items that failed
    pub failed: u64,

    /// Uncompressed bytes streamed through encoders
    pub bytes: u64,

    /// Every failure, named with its cause
    pub failures: Vec<ItemFailure>,

    /// Time taken for the batch
    pub duration: Duration,

    /// Whether every item reached a terminal outcome
    /// (false only when an interrupt stopped the batch early)
    pub completed: bool,
}

impl AggregateReport {
    /// Returns true if every item succeeded
    pub fn is_clean(&self) -> bool {
        self.completed && self.failed == 0
    }
}

/// Coordinates the bounded parallel compression of a file batch
pub struct CompressCoordinator {
    /// Destination directory
    dest_dir: PathBuf,

    /// Worker pool size (never exceeds the requested worker count)
    pool_size: usize,

    /// Pre-seeded work queue
    queue: WorkQueue,

    /// Outcomes resolved before dispatch (paths with no basename)
    early_failures: Vec<ItemOutcome>,

    /// Items submitted, including early failures
    total: u64,

    /// Shutdown signal
    shutdown: Arc<AtomicBool>,

    /// Pool-wide statistics
    stats: Arc<BatchStats>,
}

impl CompressCoordinator {
    /// Create a coordinator for a batch
    ///
    /// Structural preconditions are checked here, before any dispatch:
    /// the worker count must be within range and the destination must
    /// exist, be a directory and be writable at call time.
    pub fn new(files: Vec<PathBuf>, dest_dir: PathBuf, workers: usize) -> Result<Self> {
        config::validate_workers(workers)?;
        check_dest(&dest_dir)?;

        let mut items = Vec::with_capacity(files.len());
        let mut early_failures = Vec::new();

        for source in files {
            if source.file_name().is_none() {
                early_failures.push(ItemOutcome::Failed {
                    source,
                    reason: "path has no file name".into(),
                });
                continue;
            }
            // Basename checked above, so derivation cannot fail
            if let Some(item) = WorkItem::new(source, &dest_dir) {
                items.push(item);
            }
        }

        let total = (items.len() + early_failures.len()) as u64;
        let pool_size = workers.min(items.len());
        let queue = WorkQueue::seeded(items);

        Ok(Self {
            dest_dir,
            pool_size,
            queue,
            early_failures,
            total,
            shutdown: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(BatchStats::default()),
        })
    }

    /// Get a clone of the shutdown flag (for signal handlers)
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Get the pool-wide statistics (for live progress sampling)
    pub fn stats(&self) -> Arc<BatchStats> {
        Arc::clone(&self.stats)
    }

    /// Get the queue statistics (exposes the concurrency high-water mark)
    pub fn queue_stats(&self) -> Arc<QueueStats> {
        self.queue.stats()
    }

    /// Items in this batch, including early failures
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Run the batch to completion
    ///
    /// Returns once every item has a terminal outcome, or earlier only
    /// if the shutdown flag interrupted the batch (reflected in
    /// `completed`).
    pub fn run(mut self) -> Result<AggregateReport> {
        let start = Instant::now();

        info!(
            files = self.total,
            workers = self.pool_size,
            dest = %self.dest_dir.display(),
            "Starting compression batch"
        );

        let mut succeeded = 0u64;
        let mut failed = 0u64;
        let mut bytes = 0u64;
        let mut failures = Vec::new();

        let mut tally = |outcome: ItemOutcome| match outcome {
            ItemOutcome::Compressed { bytes: n, .. } => {
                succeeded += 1;
                bytes += n;
            }
            ItemOutcome::Failed { source, reason } => {
                failed += 1;
                failures.push(ItemFailure { source, reason });
            }
        };

        for outcome in self.early_failures.drain(..) {
            tally(outcome);
        }

        if !self.queue.is_empty() {
            let (results_tx, results_rx) = bounded(self.queue.capacity());

            // Spawn the pool
            let mut workers = Vec::with_capacity(self.pool_size);
            for id in 0..self.pool_size {
                let worker = Worker::spawn(
                    id,
                    self.queue.receiver(),
                    results_tx.clone(),
                    Arc::clone(&self.shutdown),
                    Arc::clone(&self.stats),
                )?;
                workers.push(worker);
            }
            info!(count = workers.len(), "Workers spawned");

            // Workers hold the only remaining senders; the drain below
            // ends exactly when the last worker exits
            drop(results_tx);

            while let Ok(outcome) = results_rx.recv() {
                tally(outcome);
            }

            for worker in workers {
                if let Err(e) = worker.join() {
                    warn!(error = %e, "Worker failed to join cleanly");
                }
            }
        }

        let duration = start.elapsed();
        let completed = succeeded + failed == self.total;

        info!(
            succeeded = succeeded,
            failed = failed,
            bytes = bytes,
            duration_ms = duration.as_millis() as u64,
            "Batch finished"
        );

        Ok(AggregateReport {
            total: self.total,
            succeeded,
            failed,
            bytes,
            failures,
            duration,
            completed,
        })
    }
}

/// Compress a batch of files into a destination directory
///
/// Convenience wrapper over [`CompressCoordinator`] for callers that do
/// not need cancellation or live statistics.
pub fn compress_all(
    files: Vec<PathBuf>,
    dest_dir: PathBuf,
    workers: usize,
) -> Result<AggregateReport> {
    CompressCoordinator::new(files, dest_dir, workers)?.run()
}

/// Verify the destination exists, is a directory and is writable
fn check_dest(dest_dir: &Path) -> Result<()> {
    let meta = fs::metadata(dest_dir).map_err(|e| {
        GzdirError::Prepare(if e.kind() == std::io::ErrorKind::NotFound {
            PrepareError::NotFound {
                path: dest_dir.to_path_buf(),
            }
        } else {
            PrepareError::ScanFailed {
                path: dest_dir.to_path_buf(),
                reason: e.to_string(),
            }
        })
    })?;

    if !meta.is_dir() {
        return Err(PrepareError::NotADirectory {
            path: dest_dir.to_path_buf(),
        }
        .into());
    }

    prepare::ensure_writable(dest_dir)?;
    Ok(())
}
