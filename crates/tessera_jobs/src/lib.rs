//! # Tessera Jobs
//!
//! A fixed set of worker threads pulling from one shared FIFO queue.
//!
//! ```text
//!   queue_job ──> [ Mutex<VecDeque<Job>> ] ──> worker 0 ──> JobHandle
//!                        │ Condvar         ──> worker 1 ──> JobHandle
//!                                          ──> worker N ──> JobHandle
//! ```
//!
//! Jobs are dequeued in submission order; completion order across workers
//! is unspecified. Each job gets the index of the worker running it.
//!
//! ## Example
//!
//! ```rust
//! use tessera_jobs::{WorkerPool, WorkerPoolConfig};
//!
//! let mut pool = WorkerPool::new(WorkerPoolConfig::default());
//! pool.start(2).unwrap();
//!
//! let handle = pool.queue_job(|_worker| 6 * 7);
//! assert_eq!(handle.wait(), Ok(42));
//!
//! pool.stop();
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod pool;

pub use config::WorkerPoolConfig;
pub use error::{JobError, JobResult};
pub use pool::{JobHandle, WorkerPool};
