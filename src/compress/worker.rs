//! Worker thread logic for the compression pool
//!
//! Each worker:
//! - Pulls work items from the shared queue until it disconnects
//! - Streams one source file through a gzip encoder into its destination
//! - Sends a terminal outcome for every item to the results channel
//! - Checks the shutdown flag between items for cooperative cancellation
//!
//! A failed item never aborts the batch: the error is captured in the
//! outcome and the worker moves on. A partial destination file from a
//! failed item is left in place.

use crate::compress::queue::{WorkGuard, WorkItem, WorkQueueReceiver};
use crate::error::{ItemOutcome, WorkerError};
use crossbeam_channel::Sender;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Statistics shared across the whole pool
///
/// Updated by every worker and sampled live for progress display.
#[derive(Debug, Default)]
pub struct BatchStats {
    /// Items that reached a terminal outcome
    pub items_done: AtomicU64,

    /// Items that failed
    pub failed: AtomicU64,

    /// Uncompressed bytes streamed through encoders
    pub bytes_in: AtomicU64,
}

impl BatchStats {
    /// Items that reached a terminal outcome so far
    pub fn done(&self) -> u64 {
        self.items_done.load(Ordering::Relaxed)
    }

    /// Items that failed so far
    pub fn failures(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Uncompressed bytes processed so far
    pub fn bytes(&self) -> u64 {
        self.bytes_in.load(Ordering::Relaxed)
    }

    fn record_success(&self, bytes: u64) {
        self.bytes_in.fetch_add(bytes, Ordering::Relaxed);
        self.items_done.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.items_done.fetch_add(1, Ordering::Relaxed);
    }
}

/// A worker thread that compresses items from the shared queue
pub struct Worker {
    /// Worker ID
    id: usize,

    /// Thread handle
    handle: Option<JoinHandle<Result<(), WorkerError>>>,
}

impl Worker {
    /// Spawn a new worker thread
    pub fn spawn(
        id: usize,
        queue_rx: WorkQueueReceiver,
        results: Sender<ItemOutcome>,
        shutdown: Arc<AtomicBool>,
        stats: Arc<BatchStats>,
    ) -> Result<Self, WorkerError> {
        let handle = thread::Builder::new()
            .name(format!("gzip-{}", id))
            .spawn(move || worker_loop(id, queue_rx, results, shutdown, stats))
            .map_err(|e| WorkerError::InitFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Wait for the worker to finish
    pub fn join(mut self) -> Result<(), WorkerError> {
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(result) => result,
                Err(_) => Err(WorkerError::Panicked {
                    id: self.id,
                    message: "Worker thread panicked".into(),
                }),
            }
        } else {
            Ok(())
        }
    }
}

/// Main worker loop
fn worker_loop(
    id: usize,
    queue_rx: WorkQueueReceiver,
    results: Sender<ItemOutcome>,
    shutdown: Arc<AtomicBool>,
    stats: Arc<BatchStats>,
) -> Result<(), WorkerError> {
    debug!(worker = id, "Worker starting");

    // Process items until the batch drains or shutdown is requested
    while !shutdown.load(Ordering::Relaxed) {
        let Some(item) = queue_rx.recv() else {
            break;
        };

        // Mark as actively working
        let _guard = WorkGuard::new(&queue_rx);

        let outcome = compress_item(&item, &stats);

        match &outcome {
            ItemOutcome::Compressed { source, bytes } => {
                info!(worker = id, path = %source.display(), bytes = bytes, "Compressed");
            }
            ItemOutcome::Failed { source, reason } => {
                warn!(worker = id, path = %source.display(), reason = %reason, "Compression failed");
            }
        }

        if results.send(outcome).is_err() {
            return Err(WorkerError::ResultChannelClosed);
        }
    }

    debug!(worker = id, "Worker shutting down");
    Ok(())
}

/// Compress one work item, capturing any error as a failed outcome
fn compress_item(item: &WorkItem, stats: &BatchStats) -> ItemOutcome {
    match compress_file(&item.source, &item.dest) {
        Ok(bytes) => {
            stats.record_success(bytes);
            ItemOutcome::Compressed {
                source: item.source.clone(),
                bytes,
            }
        }
        Err(e) => {
            stats.record_failure();
            ItemOutcome::Failed {
                source: item.source.clone(),
                reason: e.to_string(),
            }
        }
    }
}

/// Stream a source file through a gzip encoder into the destination
///
/// The destination is created in truncate mode. Both handles are
/// scope-bound and released on every exit path. Returns the number of
/// uncompressed bytes read from the source.
fn compress_file(source: &Path, dest: &Path) -> io::Result<u64> {
    let mut reader = BufReader::new(File::open(source)?);
    let writer = BufWriter::new(File::create(dest)?);
    let mut encoder = GzEncoder::new(writer, Compression::default());

    let bytes = io::copy(&mut reader, &mut encoder)?;

    let mut writer = encoder.finish()?;
    writer.flush()?;

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::tempdir;

    #[test]
    fn test_compress_file_round_trip() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("input.txt");
        let dest = dir.path().join("input.txt.gz");

        let payload = b"hello gzip world\n".repeat(100);
        std::fs::write(&source, &payload).unwrap();

        let bytes = compress_file(&source, &dest).unwrap();
        assert_eq!(bytes, payload.len() as u64);

        let mut decoder = GzDecoder::new(File::open(&dest).unwrap());
        let mut decoded = Vec::new();
        decoder.read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_compress_file_missing_source() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("missing.txt");
        let dest = dir.path().join("missing.txt.gz");

        assert!(compress_file(&source, &dest).is_err());
    }

    #[test]
    fn test_compress_item_captures_failure() {
        let dir = tempdir().unwrap();
        let stats = BatchStats::default();

        let item = WorkItem::new(dir.path().join("absent.dat"), dir.path()).unwrap();
        let outcome = compress_item(&item, &stats);

        assert!(!outcome.is_success());
        assert_eq!(stats.done(), 1);
        assert_eq!(stats.failures(), 1);
    }

    #[test]
    fn test_batch_stats_counters() {
        let stats = BatchStats::default();
        stats.record_success(10);
        stats.record_success(5);
        stats.record_failure();

        assert_eq!(stats.done(), 3);
        assert_eq!(stats.failures(), 1);
        assert_eq!(stats.bytes(), 15);
    }
}
