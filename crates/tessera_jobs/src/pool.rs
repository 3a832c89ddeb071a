//! # Worker Pool
//!
//! The job queue and the termination flag share one mutex. Workers sleep on
//! a condition variable only while the queue is empty and the pool is not
//! terminating; a second condition variable wakes callers of
//! [`WorkerPool::wait_until_idle`].

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use crate::config::WorkerPoolConfig;
use crate::error::{JobError, JobResult};

/// A queued unit of work, called with the index of the worker running it.
type Job = Box<dyn FnOnce(usize) + Send + 'static>;

/// State guarded by the queue mutex.
#[derive(Default)]
struct QueueState {
    /// Pending jobs in submission order.
    jobs: VecDeque<Job>,
    /// Set by `stop()`; workers exit instead of dequeuing.
    terminate: bool,
    /// Jobs currently executing.
    running: usize,
}

impl QueueState {
    fn is_busy(&self) -> bool {
        self.running > 0 || !self.jobs.is_empty()
    }
}

struct Shared {
    queue: Mutex<QueueState>,
    /// Signalled when a job is queued or the pool terminates.
    job_available: Condvar,
    /// Signalled when the queue drains and no job is running.
    idle: Condvar,
    /// Hands out worker indices on thread start-up.
    next_worker: AtomicUsize,
}

/// Fixed-size pool of worker threads.
///
/// Dropping the pool stops it.
pub struct WorkerPool {
    config: WorkerPoolConfig,
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Creates a pool with no running workers.
    #[must_use]
    pub fn new(config: WorkerPoolConfig) -> Self {
        Self {
            config,
            shared: Arc::new(Shared {
                queue: Mutex::new(QueueState::default()),
                job_available: Condvar::new(),
                idle: Condvar::new(),
                next_worker: AtomicUsize::new(0),
            }),
            workers: Vec::new(),
        }
    }

    /// Starts `threads` workers, indexed `0..threads`.
    ///
    /// # Errors
    ///
    /// [`JobError::InvalidConfig`] if the configuration does not validate,
    /// [`JobError::SpawnFailed`] if a thread cannot be created. Workers that
    /// did start are stopped again before returning.
    ///
    /// # Panics
    ///
    /// If `threads` is zero or the pool is already running.
    pub fn start(&mut self, threads: usize) -> JobResult<()> {
        assert!(threads > 0, "worker pool needs at least one thread");
        assert!(self.workers.is_empty(), "worker pool already started");
        self.config.validate()?;

        self.shared.queue.lock().terminate = false;
        self.shared.next_worker.store(0, Ordering::Relaxed);

        for n in 0..threads {
            let mut builder =
                thread::Builder::new().name(format!("{}-{n}", self.config.thread_name_prefix));
            if let Some(size) = self.config.stack_size {
                builder = builder.stack_size(size);
            }

            let shared = Arc::clone(&self.shared);
            match builder.spawn(move || worker_loop(&shared)) {
                Ok(handle) => self.workers.push(handle),
                Err(e) => {
                    self.stop();
                    return Err(JobError::SpawnFailed(e.to_string()));
                }
            }
        }

        debug!(
            threads,
            prefix = %self.config.thread_name_prefix,
            "Worker pool started"
        );
        Ok(())
    }

    /// Queues `job` and returns a handle to its result.
    ///
    /// Never blocks. The job receives the index of the worker that runs it.
    ///
    /// # Panics
    ///
    /// If the pool is not running.
    pub fn queue_job<F, R>(&self, job: F) -> JobHandle<R>
    where
        F: FnOnce(usize) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        let job: Job = Box::new(move |worker| {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| job(worker))).map_err(|payload| {
                let message = panic_message(payload.as_ref());
                warn!(worker, %message, "Job panicked");
                JobError::Panicked(message)
            });
            // The caller may have dropped the handle.
            let _ = sender.send(outcome);
        });

        {
            let mut queue = self.shared.queue.lock();
            assert!(
                !queue.terminate && !self.workers.is_empty(),
                "queue_job on a worker pool that is not running"
            );
            queue.jobs.push_back(job);
        }
        self.shared.job_available.notify_one();

        JobHandle {
            receiver,
            ready: None,
        }
    }

    /// Checks if any job is queued or running.
    #[must_use]
    pub fn busy(&self) -> bool {
        self.shared.queue.lock().is_busy()
    }

    /// Blocks until the queue is empty and every worker is idle.
    pub fn wait_until_idle(&self) {
        let mut queue = self.shared.queue.lock();
        while queue.is_busy() && !queue.terminate {
            self.shared.idle.wait(&mut queue);
        }
    }

    /// Returns the number of running workers.
    #[must_use]
    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &WorkerPoolConfig {
        &self.config
    }

    /// Stops the pool.
    ///
    /// Wakes every worker, lets running jobs finish, joins the threads and
    /// discards jobs no worker picked up; their handles resolve to
    /// [`JobError::Discarded`]. Calling `stop` on a stopped pool does nothing.
    pub fn stop(&mut self) {
        if self.workers.is_empty() {
            return;
        }

        let discarded = {
            let mut queue = self.shared.queue.lock();
            queue.terminate = true;
            std::mem::take(&mut queue.jobs)
        };
        self.shared.job_available.notify_all();
        self.shared.idle.notify_all();

        let threads = self.workers.len();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                warn!("Worker thread exited by panic");
            }
        }

        debug!(threads, discarded = discarded.len(), "Worker pool stopped");
        // Dropping the jobs drops their senders.
        drop(discarded);
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let queue = self.shared.queue.lock();
        f.debug_struct("WorkerPool")
            .field("threads", &self.workers.len())
            .field("queued", &queue.jobs.len())
            .field("running", &queue.running)
            .finish()
    }
}

/// Worker thread main loop.
fn worker_loop(shared: &Shared) {
    let index = shared.next_worker.fetch_add(1, Ordering::Relaxed);
    debug!(worker = index, "Worker started");

    loop {
        let job = {
            let mut queue = shared.queue.lock();
            loop {
                if queue.terminate {
                    debug!(worker = index, "Worker exiting");
                    return;
                }
                if let Some(job) = queue.jobs.pop_front() {
                    queue.running += 1;
                    break job;
                }
                shared.job_available.wait(&mut queue);
            }
        };

        job(index);

        let mut queue = shared.queue.lock();
        queue.running -= 1;
        if !queue.is_busy() {
            shared.idle.notify_all();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// Completion handle for a queued job.
///
/// Dropping the handle does not cancel the job.
pub struct JobHandle<R> {
    receiver: Receiver<JobResult<R>>,
    /// Result received by a non-consuming poll.
    ready: Option<JobResult<R>>,
}

impl<R> JobHandle<R> {
    /// Blocks until the job finishes and returns its result.
    ///
    /// # Errors
    ///
    /// [`JobError::Panicked`] if the job panicked, [`JobError::Discarded`]
    /// if the pool stopped before the job ran.
    pub fn wait(mut self) -> JobResult<R> {
        if let Some(result) = self.ready.take() {
            return result;
        }
        self.receiver.recv().unwrap_or(Err(JobError::Discarded))
    }

    /// Waits up to `timeout`; returns `true` once the result is available.
    pub fn wait_timeout(&mut self, timeout: Duration) -> bool {
        if self.ready.is_none() {
            match self.receiver.recv_timeout(timeout) {
                Ok(result) => self.ready = Some(result),
                Err(RecvTimeoutError::Disconnected) => self.ready = Some(Err(JobError::Discarded)),
                Err(RecvTimeoutError::Timeout) => {}
            }
        }
        self.ready.is_some()
    }

    /// Checks, without blocking, whether the result is available.
    pub fn is_finished(&mut self) -> bool {
        if self.ready.is_none() {
            match self.receiver.try_recv() {
                Ok(result) => self.ready = Some(result),
                Err(TryRecvError::Disconnected) => self.ready = Some(Err(JobError::Discarded)),
                Err(TryRecvError::Empty) => {}
            }
        }
        self.ready.is_some()
    }
}

impl<R> std::fmt::Debug for JobHandle<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobHandle")
            .field("ready", &self.ready.is_some())
            .finish()
    }
}
