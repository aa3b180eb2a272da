//! Fixed-size worker pool draining a shared FIFO queue.
//!
//! Workers block until a task is queued or the pool shuts down. Shutdown
//! does not run queued work: callers that need every task to finish call
//! [`WorkerPool::drain`] first. Tasks may enqueue further tasks through a
//! [`Spawner`], and `drain` waits for those too.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use depglob::pool::WorkerPool;
//!
//! let pool = WorkerPool::new(4)?;
//! let counter = Arc::new(AtomicUsize::new(0));
//! for _ in 0..16 {
//!     let counter = Arc::clone(&counter);
//!     pool.enqueue(move || {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     });
//! }
//! pool.drain();
//! assert_eq!(counter.load(Ordering::SeqCst), 16);
//! # Ok::<(), depglob::pool::PoolError>(())
//! ```

use std::any::Any;
use std::fmt;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use thiserror::Error;
use tracing::{debug, error, trace};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Failures surfaced by the pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The operating system refused to start a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
    /// A submitted task panicked; the payload message is preserved.
    #[error("task panicked: {0}")]
    TaskPanicked(String),
    /// The pool shut down before the task was run.
    #[error("task was discarded before it ran")]
    Abandoned,
}

enum Job {
    Run(Task),
    /// Wakes an idle worker so it notices shutdown.
    Wake,
}

struct Shared {
    sender: Sender<Job>,
    receiver: Receiver<Job>,
    stopped: AtomicBool,
    outstanding: Mutex<usize>,
    drained: Condvar,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl Shared {
    fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            stopped: AtomicBool::new(false),
            outstanding: Mutex::new(0),
            drained: Condvar::new(),
        }
    }

    fn push(&self, task: Task) {
        if self.is_stopped() {
            trace!("pool stopped; dropping task");
            return;
        }
        // Count before the task becomes visible so a fast worker cannot
        // decrement first.
        *lock(&self.outstanding) += 1;
        if self.sender.send(Job::Run(task)).is_err() {
            self.finish_one();
        }
    }

    fn finish_one(&self) {
        let mut outstanding = lock(&self.outstanding);
        *outstanding = outstanding.saturating_sub(1);
        if *outstanding == 0 {
            self.drained.notify_all();
        }
    }

    fn wait_drained(&self) {
        let mut outstanding = lock(&self.outstanding);
        while *outstanding > 0 {
            outstanding = match self.drained.wait(outstanding) {
                Ok(woken) => woken,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Drop every queued job, returning how many were real tasks.
    fn discard_queued(&self) -> usize {
        self.receiver
            .try_iter()
            .filter(|job| matches!(job, Job::Run(_)))
            .count()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_owned()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        String::from("non-string panic payload")
    }
}

fn run_worker(shared: &Shared, index: usize) {
    trace!(worker = index, "worker started");
    while let Ok(job) = shared.receiver.recv() {
        if shared.is_stopped() {
            break;
        }
        let Job::Run(task) = job else {
            continue;
        };
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
            let message = panic_message(payload.as_ref());
            error!(worker = index, %message, "task panicked");
        }
        shared.finish_one();
    }
    trace!(worker = index, "worker stopping");
}

/// Cloneable handle for queueing work without owning the worker threads.
///
/// Tasks queued after the owning [`WorkerPool`] has shut down are dropped
/// without running.
#[derive(Clone)]
pub struct Spawner {
    shared: Arc<Shared>,
}

impl Spawner {
    /// Queue a fire-and-forget task.
    pub fn enqueue<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.push(Box::new(task));
    }

    /// Queue a task whose result or panic is observable through the
    /// returned handle.
    pub fn submit<T, F>(&self, task: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (sender, receiver) = bounded(1);
        self.enqueue(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(task)).map_err(|payload| {
                let message = panic_message(payload.as_ref());
                error!(%message, "submitted task panicked");
                PoolError::TaskPanicked(message)
            });
            if sender.send(outcome).is_err() {
                trace!("task handle dropped before completion");
            }
        });
        TaskHandle { receiver }
    }

    /// Return `true` once the owning pool has begun shutting down.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shared.is_stopped()
    }
}

impl fmt::Debug for Spawner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spawner")
            .field("shut_down", &self.is_shut_down())
            .finish_non_exhaustive()
    }
}

/// Receiving end of a [`Spawner::submit`] call.
#[derive(Debug)]
pub struct TaskHandle<T> {
    receiver: Receiver<Result<T, PoolError>>,
}

impl<T> TaskHandle<T> {
    /// Block until the task finishes.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::TaskPanicked`] when the task panicked and
    /// [`PoolError::Abandoned`] when the pool shut down before running it.
    pub fn join(self) -> Result<T, PoolError> {
        self.receiver
            .recv()
            .unwrap_or(Err(PoolError::Abandoned))
    }
}

/// A fixed set of worker threads.
pub struct WorkerPool {
    spawner: Spawner,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `threads` workers (at least one).
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Spawn`] when a worker thread cannot be started;
    /// workers already running are shut down first.
    pub fn new(threads: usize) -> Result<Self, PoolError> {
        let count = threads.max(1);
        let mut pool = Self {
            spawner: Spawner {
                shared: Arc::new(Shared::new()),
            },
            workers: Vec::with_capacity(count),
        };
        for index in 0..count {
            let shared = Arc::clone(&pool.spawner.shared);
            let handle = thread::Builder::new()
                .name(format!("depglob-worker-{index}"))
                .spawn(move || run_worker(&shared, index))
                .map_err(PoolError::Spawn)?;
            pool.workers.push(handle);
        }
        debug!(threads = count, "worker pool started");
        Ok(pool)
    }

    /// Start one worker per available hardware thread.
    ///
    /// # Errors
    ///
    /// See [`WorkerPool::new`].
    pub fn with_available_parallelism() -> Result<Self, PoolError> {
        Self::new(thread::available_parallelism().map_or(1, NonZeroUsize::get))
    }

    /// Number of worker threads.
    #[must_use]
    pub const fn threads(&self) -> usize {
        self.workers.len()
    }

    /// Handle for queueing work from other threads or from inside tasks.
    #[must_use]
    pub fn spawner(&self) -> Spawner {
        self.spawner.clone()
    }

    /// Queue a fire-and-forget task. A panic inside the task is logged and
    /// does not affect other tasks.
    pub fn enqueue<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.spawner.enqueue(task);
    }

    /// Queue a task and return a handle to its result.
    pub fn submit<T, F>(&self, task: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.spawner.submit(task)
    }

    /// Block until every queued or running task has finished.
    ///
    /// Calling this from inside a pool task deadlocks.
    pub fn drain(&self) {
        self.spawner.shared.wait_drained();
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads())
            .finish_non_exhaustive()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        let shared = Arc::clone(&self.spawner.shared);
        shared.stopped.store(true, Ordering::Release);
        for _ in &self.workers {
            if shared.sender.send(Job::Wake).is_err() {
                trace!("worker queue already closed");
            }
        }
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                debug!("worker thread exited abnormally");
            }
        }
        let discarded = shared.discard_queued();
        if discarded > 0 {
            debug!(count = discarded, "discarded queued tasks");
        }
        *lock(&shared.outstanding) = 0;
        shared.drained.notify_all();
    }
}
