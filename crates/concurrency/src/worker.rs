//! Single-threaded task executor
//!
//! A [`Worker`] owns one dedicated thread and one context value (the
//! backend). Every [`Task`] receives `&mut` access to the context, and tasks
//! run one at a time in the order they were queued.
//!
//! ## Lifecycle
//!
//! ```text
//! Created --start()--> Running --stop()--> Stopping --(queue drained)--> Stopped
//! ```
//!
//! - `submit` is accepted only while `Running`.
//! - `stop` closes the queue, lets the thread finish everything already
//!   queued, then joins it.
//! - `stop_with` does the same and runs one last task after the drain.
//!
//! ## Failure containment
//!
//! A task that returns `Err` or panics is logged and counted. The thread
//! keeps consuming the queue.

use crate::queue::TaskQueue;
use crate::signal::CompletionSignal;
use localstore_core::{Error, Result};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use tracing::{debug, error, warn};

/// A unit of work executed against the worker's context.
pub type Task<C> = Box<dyn FnOnce(&mut C) -> Result<()> + Send + 'static>;

/// Worker lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Constructed, thread not yet spawned
    Created,
    /// Thread running and accepting tasks
    Running,
    /// Shutdown requested; draining queued tasks
    Stopping,
    /// Thread has exited (terminal)
    Stopped,
}

/// Point-in-time task counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkerMetrics {
    /// Tasks accepted by `submit`
    pub submitted: u64,
    /// Tasks that returned `Ok`
    pub completed: u64,
    /// Tasks that returned `Err` or panicked
    pub failed: u64,
    /// Tasks queued but not yet started
    pub pending: usize,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

struct Shared<C> {
    queue: TaskQueue<Task<C>>,
    state: Mutex<WorkerState>,
    counters: Counters,
}

/// Dedicated thread consuming a FIFO of tasks.
///
/// # Thread Safety
///
/// `submit`, `state` and `metrics` may be called from any thread.
/// The context is only ever touched by the worker thread.
pub struct Worker<C: Send + 'static> {
    name: String,
    shared: Arc<Shared<C>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    thread_id: OnceCell<ThreadId>,
}

impl<C: Send + 'static> Worker<C> {
    /// Create a worker whose thread will carry `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shared: Arc::new(Shared {
                queue: TaskQueue::new(),
                state: Mutex::new(WorkerState::Created),
                counters: Counters::default(),
            }),
            handle: Mutex::new(None),
            thread_id: OnceCell::new(),
        }
    }

    /// Thread name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle state
    pub fn state(&self) -> WorkerState {
        *self.shared.state.lock()
    }

    /// Spawn the thread, moving `context` onto it.
    ///
    /// Only valid in `Created`.
    pub fn start(&self, context: C) -> Result<()> {
        let mut state = self.shared.state.lock();
        if *state != WorkerState::Created {
            return Err(Error::InvalidState(format!(
                "worker {} cannot start from {:?}",
                self.name, *state
            )));
        }

        let shared = Arc::clone(&self.shared);
        let name = self.name.clone();
        let handle = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || run_loop(&name, &shared, context))?;

        let _ = self.thread_id.set(handle.thread().id());
        *self.handle.lock() = Some(handle);
        *state = WorkerState::Running;
        debug!(worker = %self.name, "worker started");
        Ok(())
    }

    /// Queue a task.
    ///
    /// Fails with `InvalidState` unless the worker is `Running`.
    pub fn submit<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce(&mut C) -> Result<()> + Send + 'static,
    {
        let state = self.shared.state.lock();
        if *state != WorkerState::Running {
            return Err(Error::InvalidState(format!(
                "worker {} is {:?}",
                self.name, *state
            )));
        }
        self.shared
            .queue
            .push(Box::new(task))
            .map_err(|_| Error::InvalidState(format!("worker {} is shutting down", self.name)))?;
        self.shared.counters.submitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Whether the calling thread is this worker's thread
    pub fn is_worker_thread(&self) -> bool {
        self.thread_id
            .get()
            .map(|id| *id == thread::current().id())
            .unwrap_or(false)
    }

    /// Drain queued tasks, then join the thread.
    ///
    /// Idempotent. Tasks submitted after `stop` begins are rejected. Calling
    /// this from the worker thread fails with `InvalidState`, since the
    /// thread cannot join itself.
    pub fn stop(&self) -> Result<()> {
        self.shutdown(None)
    }

    /// Like [`stop`](Self::stop), running `final_task` after every task
    /// already accepted and before the thread exits.
    ///
    /// Queueing `final_task` and refusing further submissions happen under
    /// one state lock, so no accepted task can run after it. Returns the
    /// stop result, then `final_task`'s own result. If the worker is not
    /// `Running`, `final_task` is discarded and `TaskFailed` is returned.
    pub fn stop_with<F>(&self, final_task: F) -> Result<()>
    where
        F: FnOnce(&mut C) -> Result<()> + Send + 'static,
    {
        let (signal, completer) = CompletionSignal::pair();
        let task: Task<C> = Box::new(move |context| {
            completer.complete(final_task(context));
            Ok(())
        });
        let stopped = self.shutdown(Some(task));
        // The task has run or been dropped by now, so this never blocks.
        let finished = signal.wait();
        stopped.and(finished)
    }

    fn shutdown(&self, final_task: Option<Task<C>>) -> Result<()> {
        if self.is_worker_thread() {
            return Err(Error::InvalidState(format!(
                "worker {} cannot be stopped from its own thread",
                self.name
            )));
        }

        {
            let mut state = self.shared.state.lock();
            match *state {
                WorkerState::Running => {
                    if let Some(task) = final_task {
                        if self.shared.queue.push(task).is_ok() {
                            self.shared.counters.submitted.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                    *state = WorkerState::Stopping;
                }
                WorkerState::Created => {
                    *state = WorkerState::Stopped;
                    self.shared.queue.close();
                    return Ok(());
                }
                WorkerState::Stopping | WorkerState::Stopped => return Ok(()),
            }
            self.shared.queue.close();
        }
        debug!(worker = %self.name, pending = self.shared.queue.len(), "worker stopping");

        let handle = self.handle.lock().take();
        let joined = match handle {
            Some(handle) => handle.join().map_err(|payload| {
                Error::InvalidState(format!(
                    "worker {} thread panicked: {}",
                    self.name,
                    panic_message(payload.as_ref())
                ))
            }),
            None => Ok(()),
        };

        // Only reachable if the thread died outside a task; dropping the
        // leftovers wakes any sync caller still waiting on them.
        if !self.shared.queue.is_empty() {
            warn!(worker = %self.name, pending = self.shared.queue.len(), "discarding unrun tasks");
            while let Some(task) = self.shared.queue.try_pop() {
                drop(task);
            }
        }

        *self.shared.state.lock() = WorkerState::Stopped;
        debug!(worker = %self.name, "worker stopped");
        joined
    }

    /// Snapshot of task counters
    pub fn metrics(&self) -> WorkerMetrics {
        let counters = &self.shared.counters;
        WorkerMetrics {
            submitted: counters.submitted.load(Ordering::Relaxed),
            completed: counters.completed.load(Ordering::Relaxed),
            failed: counters.failed.load(Ordering::Relaxed),
            pending: self.shared.queue.len(),
        }
    }
}

impl<C: Send + 'static> Drop for Worker<C> {
    fn drop(&mut self) {
        if self.is_worker_thread() {
            // Dropped from inside a task: let the loop drain and exit on its own.
            self.shared.queue.close();
            return;
        }
        if let Err(e) = self.stop() {
            warn!(worker = %self.name, error = %e, "worker stop failed during drop");
        }
    }
}

fn run_loop<C>(name: &str, shared: &Shared<C>, mut context: C) {
    while let Some(task) = shared.queue.pop() {
        match panic::catch_unwind(AssertUnwindSafe(|| task(&mut context))) {
            Ok(Ok(())) => {
                shared.counters.completed.fetch_add(1, Ordering::Relaxed);
            }
            Ok(Err(e)) => {
                shared.counters.failed.fetch_add(1, Ordering::Relaxed);
                error!(worker = %name, error = %e, "task failed");
            }
            Err(payload) => {
                shared.counters.failed.fetch_add(1, Ordering::Relaxed);
                error!(
                    worker = %name,
                    panic = %panic_message(payload.as_ref()),
                    "task panicked"
                );
            }
        }
    }
    debug!(worker = %name, "queue drained, worker exiting");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
