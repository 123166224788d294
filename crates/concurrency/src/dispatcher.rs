//! Synchronous and asynchronous submission.
//!
//! | Mode | Method | Caller blocks | Sees result | Sees failure |
//! |------|--------|---------------|-------------|--------------|
//! | async | [`Dispatcher::post`] | no | no | no (logged only) |
//! | sync | [`Dispatcher::call`] | yes | yes | `TaskFailed` |
//! | sync | [`Dispatcher::call_or_default`] | yes | yes | `T::default()` |
//! | sync | [`Dispatcher::call_timeout`] | up to timeout | yes | `TaskFailed` / `Timeout` |
//!
//! A sync call wraps the task so that its [`Completer`](crate::Completer) is consumed or
//! dropped exactly once when the task ends, whether it succeeded, failed or
//! panicked. The caller is always woken.
//!
//! Sync calls must not be made from the worker thread: the task would queue
//! behind the very task that is waiting for it. That case is rejected with
//! `InvalidState` instead of deadlocking.
//!
//! There is no cancellation. A timed call that gives up leaves its task in
//! the queue, and the task still runs.

use crate::signal::CompletionSignal;
use crate::worker::Worker;
use localstore_core::{Error, Result};
use std::sync::Arc;
use std::time::Duration;

/// Submission front-end for a [`Worker`].
pub struct Dispatcher<C: Send + 'static> {
    worker: Arc<Worker<C>>,
}

impl<C: Send + 'static> Clone for Dispatcher<C> {
    fn clone(&self) -> Self {
        Self {
            worker: Arc::clone(&self.worker),
        }
    }
}

impl<C: Send + 'static> Dispatcher<C> {
    /// Wrap a worker
    pub fn new(worker: Arc<Worker<C>>) -> Self {
        Self { worker }
    }

    /// The underlying worker
    pub fn worker(&self) -> &Arc<Worker<C>> {
        &self.worker
    }

    /// Queue a task and return immediately.
    ///
    /// Tasks posted from one thread run in the order they were posted.
    /// Errors inside the task are logged by the worker and never reach the
    /// caller.
    pub fn post<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce(&mut C) -> Result<()> + Send + 'static,
    {
        self.worker.submit(task)
    }

    /// Queue a task and block until it has run.
    ///
    /// A task error or panic is reported as [`Error::TaskFailed`].
    pub fn call<T, F>(&self, task: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut C) -> Result<T> + Send + 'static,
    {
        self.submit_sync(task)?.wait()
    }

    /// Like [`call`](Self::call), but a failed task yields `T::default()`.
    ///
    /// The failure is still logged on the worker. Lifecycle errors such as
    /// submitting to a stopped worker are returned as usual.
    pub fn call_or_default<T, F>(&self, task: F) -> Result<T>
    where
        T: Default + Send + 'static,
        F: FnOnce(&mut C) -> Result<T> + Send + 'static,
    {
        match self.call(task) {
            Err(Error::TaskFailed(_)) => Ok(T::default()),
            other => other,
        }
    }

    /// Like [`call`](Self::call), but give up after `timeout`.
    ///
    /// On timeout the task stays queued and still runs later.
    pub fn call_timeout<T, F>(&self, task: F, timeout: Duration) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut C) -> Result<T> + Send + 'static,
    {
        self.submit_sync(task)?
            .wait_timeout(timeout)
            .unwrap_or(Err(Error::Timeout(timeout)))
    }

    /// Block until every task queued so far has run
    pub fn flush(&self) -> Result<()> {
        self.call(|_| Ok(()))
    }

    fn submit_sync<T, F>(&self, task: F) -> Result<Arc<CompletionSignal<T>>>
    where
        T: Send + 'static,
        F: FnOnce(&mut C) -> Result<T> + Send + 'static,
    {
        if self.worker.is_worker_thread() {
            return Err(Error::InvalidState(format!(
                "synchronous call from worker {} would deadlock",
                self.worker.name()
            )));
        }

        let (signal, completer) = CompletionSignal::<T>::pair();
        self.worker.submit(move |context| match task(context) {
            Ok(value) => {
                completer.complete(Ok(value));
                Ok(())
            }
            Err(e) => {
                completer.complete(Err(Error::TaskFailed(e.to_string())));
                Err(e)
            }
        })?;
        Ok(signal)
    }
}
