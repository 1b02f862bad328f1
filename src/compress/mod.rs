//! Bounded concurrent gzip compression
//!
//! This module implements the fan-out/fan-in compression batch: a
//! pre-seeded work queue drained by a fixed pool of worker threads,
//! with per-item failure isolation and a structured aggregate report.
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────────────┐
//!                     │   CompressCoordinator   │
//!                     │  - seeds the queue      │
//!                     │  - drains the results   │
//!                     └───────────┬─────────────┘
//!                                 │
//!       ┌─────────────────────────┼─────────────────────────┐
//!       │                         │                         │
//! ┌─────▼─────┐             ┌─────▼─────┐             ┌─────▼─────┐
//! │  Worker 1 │             │  Worker 2 │             │  Worker N │
//! │  gzip     │             │  gzip     │             │  gzip     │
//! └─────┬─────┘             └─────┬─────┘             └─────┬─────┘
//!       │                         │                         │
//!       └─────────────────────────┼─────────────────────────┘
//!                                 ▼
//!                     ┌─────────────────────────┐
//!                     │     AggregateReport     │
//!                     └─────────────────────────┘
//! ```

pub mod coordinator;
pub mod queue;
pub mod worker;

pub use coordinator::{compress_all, AggregateReport, CompressCoordinator, ItemFailure};
pub use queue::{QueueStats, WorkGuard, WorkItem, WorkQueue, WorkQueueReceiver};
pub use worker::{BatchStats, Worker};
