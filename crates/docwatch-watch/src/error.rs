//! Error types for the watch pipeline.

use thiserror::Error;

/// Errors that can occur in the watch pipeline.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Watcher error: {0}")]
    Notify(#[from] notify::Error),

    #[error("Invalid ignore pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Combined per-path failures from attach/detach. The paths that did
    /// succeed stay attached/detached.
    #[error("watch registry errors: {}", .failures.join("; "))]
    Registry { failures: Vec<String> },
}

/// Result type for watch operations.
pub type WatchResult<T> = Result<T, WatchError>;
