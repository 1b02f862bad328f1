//! Error types for gzdir
//!
//! This module defines the error hierarchy that covers:
//! - Configuration and CLI errors
//! - Directory preparation errors (validation, creation, manifest)
//! - Worker thread errors
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Errors should be actionable - include context about what to do
//! - Per-file compression failures are results, not errors: they are
//!   captured as an `ItemOutcome` and aggregated, never propagated

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level error type for the gzdir application
#[derive(Error, Debug)]
pub enum GzdirError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Directory preparation errors
    #[error("Preparation error: {0}")]
    Prepare(#[from] PrepareError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },
}

/// Directory preparation errors
#[derive(Error, Debug)]
pub enum PrepareError {
    /// Directory does not exist
    #[error("Directory not found: '{path}'")]
    NotFound { path: PathBuf },

    /// Path exists but is not a directory
    #[error("Not a directory: '{path}'")]
    NotADirectory { path: PathBuf },

    /// Insufficient permission to read the source directory
    #[error("Permission denied reading directory: '{path}'")]
    PermissionDenied { path: PathBuf },

    /// Destination exists but cannot be written to
    #[error("Destination directory not writable: '{path}'")]
    NotWritable { path: PathBuf },

    /// Failed to create the destination directory
    #[error("Failed to create destination directory '{path}': {reason}")]
    CreateFailed { path: PathBuf, reason: String },

    /// Failed to enumerate the source directory
    #[error("Failed to read directory '{path}': {reason}")]
    ScanFailed { path: PathBuf, reason: String },

    /// Failed to write the subdirectory manifest
    #[error("Failed to write manifest '{path}': {reason}")]
    ManifestWrite { path: PathBuf, reason: String },
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker initialization failed
    #[error("Failed to initialize worker {id}: {reason}")]
    InitFailed { id: usize, reason: String },

    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Result channel closed
    #[error("Result channel closed unexpectedly")]
    ResultChannelClosed,
}

/// Result type alias for GzdirError
pub type Result<T> = std::result::Result<T, GzdirError>;

/// Result type alias for PrepareError
pub type PrepareResult<T> = std::result::Result<T, PrepareError>;

/// Terminal outcome of compressing a single file
#[derive(Debug)]
pub enum ItemOutcome {
    /// File was compressed successfully
    Compressed {
        source: PathBuf,
        /// Uncompressed bytes streamed through the encoder
        bytes: u64,
    },

    /// Compression failed; the batch continues
    Failed { source: PathBuf, reason: String },
}

impl ItemOutcome {
    /// Returns true if this outcome represents success
    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Compressed { .. })
    }

    /// Returns the source path associated with this outcome
    pub fn source(&self) -> &Path {
        match self {
            ItemOutcome::Compressed { source, .. } => source,
            ItemOutcome::Failed { source, .. } => source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_outcome_accessors() {
        let ok = ItemOutcome::Compressed {
            source: "/data/a.txt".into(),
            bytes: 42,
        };
        assert!(ok.is_success());
        assert_eq!(ok.source(), Path::new("/data/a.txt"));

        let failed = ItemOutcome::Failed {
            source: "/data/b.txt".into(),
            reason: "permission denied".into(),
        };
        assert!(!failed.is_success());
        assert_eq!(failed.source(), Path::new("/data/b.txt"));
    }

    #[test]
    fn test_error_conversion() {
        let prep = PrepareError::NotFound {
            path: "/missing".into(),
        };
        let err: GzdirError = prep.into();
        assert!(matches!(err, GzdirError::Prepare(_)));

        let cfg = ConfigError::InvalidWorkerCount { count: 0, max: 512 };
        let err: GzdirError = cfg.into();
        assert!(matches!(err, GzdirError::Config(_)));
    }
}
