//! # Job Error Types
//!
//! Everything a job handle or pool setup can report.

use thiserror::Error;

/// Errors that can occur in the worker pool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// The job was dropped by `stop()` before any worker ran it.
    #[error("job discarded before it ran")]
    Discarded,

    /// The job panicked; the worker caught it and kept running.
    #[error("job panicked: {0}")]
    Panicked(String),

    /// The pool configuration was rejected.
    #[error("invalid worker pool config: {0}")]
    InvalidConfig(String),

    /// The OS refused to start a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    SpawnFailed(String),
}

/// Result type for worker pool operations.
pub type JobResult<T> = Result<T, JobError>;
