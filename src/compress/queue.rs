//! Work queue for the compression batch
//!
//! The batch is finite and known up front, so the queue is seeded with
//! every work item before the workers start and the send side is dropped
//! immediately. Workers drain with a blocking receive until the channel
//! disconnects - there is no polling and no busy-wait.
//!
//! An active-work counter with an RAII guard makes the instantaneous
//! concurrency observable; its high-water mark verifies the bounded
//! concurrency guarantee in tests.

use crossbeam_channel::{bounded, Receiver};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// One source file and its derived destination
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// Path of the regular file to compress
    pub source: PathBuf,

    /// Path of the gzip output (`<dest_dir>/<basename>.gz`)
    pub dest: PathBuf,
}

impl WorkItem {
    /// Derive the destination path from the source basename
    ///
    /// Returns `None` when the source path has no final component
    /// (e.g. `/`), which a directory scan never produces.
    pub fn new(source: PathBuf, dest_dir: &Path) -> Option<Self> {
        let mut name = source.file_name()?.to_os_string();
        name.push(".gz");

        Some(Self {
            dest: dest_dir.join(name),
            source,
        })
    }
}

/// Statistics for the work queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Total items enqueued
    pub enqueued: AtomicU64,

    /// Total items dequeued
    pub dequeued: AtomicU64,

    /// Items currently being processed
    active: AtomicUsize,

    /// Highest observed concurrent processing count
    peak_active: AtomicUsize,
}

impl QueueStats {
    /// Current number of in-flight items
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Highest concurrent processing count observed so far
    pub fn peak_active(&self) -> usize {
        self.peak_active.load(Ordering::SeqCst)
    }

    /// Total items handed out to workers
    pub fn dequeued(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }

    fn begin_work(&self) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active.fetch_max(now, Ordering::SeqCst);
    }

    fn end_work(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Pre-seeded work queue shared by the worker pool
pub struct WorkQueue {
    /// Receiver for getting items
    receiver: Receiver<WorkItem>,

    /// Queue capacity (equals the batch size)
    capacity: usize,

    /// Queue statistics
    stats: Arc<QueueStats>,
}

impl WorkQueue {
    /// Build a queue holding the whole batch
    ///
    /// The send side is dropped before this returns, so receivers see a
    /// disconnected channel once the batch is drained.
    pub fn seeded(items: Vec<WorkItem>) -> Self {
        let capacity = items.len().max(1);
        let (sender, receiver) = bounded(capacity);
        let stats = Arc::new(QueueStats::default());

        let mut enqueued = 0u64;
        for item in items {
            // The receiver is held by self and capacity fits the batch,
            // so this cannot block or fail
            if sender.send(item).is_ok() {
                enqueued += 1;
            }
        }
        stats.enqueued.store(enqueued, Ordering::Relaxed);

        Self {
            receiver,
            capacity,
            stats,
        }
    }

    /// Get a receiver for this queue (clone for each worker)
    pub fn receiver(&self) -> WorkQueueReceiver {
        WorkQueueReceiver {
            receiver: self.receiver.clone(),
            stats: Arc::clone(&self.stats),
        }
    }

    /// Get queue statistics
    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Get current queue length
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Get queue capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Handle for receiving items from the queue
#[derive(Clone)]
pub struct WorkQueueReceiver {
    receiver: Receiver<WorkItem>,
    stats: Arc<QueueStats>,
}

impl WorkQueueReceiver {
    /// Receive the next item
    ///
    /// Blocks until an item is available; returns `None` once the batch
    /// is drained (the seed sender is gone, so an empty queue means a
    /// disconnected channel).
    pub fn recv(&self) -> Option<WorkItem> {
        match self.receiver.recv() {
            Ok(item) => {
                self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
                Some(item)
            }
            Err(_) => None,
        }
    }

    /// Try to receive an item without blocking
    pub fn try_recv(&self) -> Option<WorkItem> {
        match self.receiver.try_recv() {
            Ok(item) => {
                self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
                Some(item)
            }
            Err(_) => None,
        }
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

/// RAII guard marking one item as actively being processed
pub struct WorkGuard<'a> {
    stats: &'a QueueStats,
}

impl<'a> WorkGuard<'a> {
    /// Mark work as active on the queue the receiver belongs to
    pub fn new(receiver: &'a WorkQueueReceiver) -> Self {
        receiver.stats.begin_work();
        Self {
            stats: &receiver.stats,
        }
    }
}

impl Drop for WorkGuard<'_> {
    fn drop(&mut self) {
        self.stats.end_work();
    }
}
