//! # Worker Pool Configuration
//!
//! ```toml
//! thread_name_prefix = "asset-loader"
//! stack_size = 4194304
//! ```

use serde::Deserialize;

use crate::error::{JobError, JobResult};

/// Smallest stack a worker may be given.
const MIN_STACK_SIZE: usize = 64 * 1024;

/// Configuration for a [`WorkerPool`](crate::WorkerPool).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkerPoolConfig {
    /// Worker threads are named `{prefix}-{index}`.
    pub thread_name_prefix: String,
    /// Stack size per worker in bytes; `None` uses the platform default.
    pub stack_size: Option<usize>,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            thread_name_prefix: "tessera-worker".to_owned(),
            stack_size: None,
        }
    }
}

impl WorkerPoolConfig {
    /// Parses and validates a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// [`JobError::InvalidConfig`] on malformed TOML, unknown keys, or values
    /// rejected by [`validate`](Self::validate).
    pub fn from_toml_str(text: &str) -> JobResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| JobError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values.
    ///
    /// # Errors
    ///
    /// [`JobError::InvalidConfig`] if the name prefix is empty or the stack
    /// size is under 64 KiB.
    pub fn validate(&self) -> JobResult<()> {
        if self.thread_name_prefix.trim().is_empty() {
            return Err(JobError::InvalidConfig(
                "thread_name_prefix must not be empty".to_owned(),
            ));
        }
        if let Some(size) = self.stack_size {
            if size < MIN_STACK_SIZE {
                return Err(JobError::InvalidConfig(format!(
                    "stack_size {size} is below the minimum of {MIN_STACK_SIZE}"
                )));
            }
        }
        Ok(())
    }
}
