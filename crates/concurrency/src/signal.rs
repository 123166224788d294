//! One-shot completion signal
//!
//! A synchronous caller creates a [`CompletionSignal`], hands the paired
//! [`Completer`] to the task, and blocks in [`CompletionSignal::wait`]. The
//! completed flag is checked under the same lock used for waiting, so a
//! completion that lands before the caller starts waiting is never missed.
//!
//! A `Completer` dropped without completing (the task failed, panicked, or
//! was discarded) completes the signal with [`Error::TaskFailed`]. The
//! waiter is therefore woken exactly once whatever happens to the task.

use localstore_core::{Error, Result};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

enum Slot<T> {
    Pending,
    Ready(Result<T>),
    Taken,
}

/// Waiting side of a one-shot completion.
pub struct CompletionSignal<T> {
    slot: Mutex<Slot<T>>,
    cond: Condvar,
}

/// Signalling side of a one-shot completion.
pub struct Completer<T> {
    signal: Option<Arc<CompletionSignal<T>>>,
}

impl<T> CompletionSignal<T> {
    /// Create a signal and its completer
    pub fn pair() -> (Arc<Self>, Completer<T>) {
        let signal = Arc::new(Self {
            slot: Mutex::new(Slot::Pending),
            cond: Condvar::new(),
        });
        let completer = Completer {
            signal: Some(Arc::clone(&signal)),
        };
        (signal, completer)
    }

    fn complete(&self, result: Result<T>) {
        let mut slot = self.slot.lock();
        if matches!(*slot, Slot::Pending) {
            *slot = Slot::Ready(result);
            self.cond.notify_all();
        }
    }

    /// Whether the task has completed
    pub fn is_signaled(&self) -> bool {
        !matches!(*self.slot.lock(), Slot::Pending)
    }

    /// Block until completion and take the result
    pub fn wait(&self) -> Result<T> {
        let mut slot = self.slot.lock();
        while matches!(*slot, Slot::Pending) {
            self.cond.wait(&mut slot);
        }
        Self::take(&mut slot)
    }

    /// Block for at most `timeout`.
    ///
    /// Returns `None` if the task has not completed in time. The task is not
    /// cancelled and may still complete later.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<T>> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.slot.lock();
        while matches!(*slot, Slot::Pending) {
            if self.cond.wait_until(&mut slot, deadline).timed_out()
                && matches!(*slot, Slot::Pending)
            {
                return None;
            }
        }
        Some(Self::take(&mut slot))
    }

    fn take(slot: &mut Slot<T>) -> Result<T> {
        match std::mem::replace(slot, Slot::Taken) {
            Slot::Ready(result) => result,
            Slot::Taken => Err(Error::InvalidState(
                "completion result already taken".into(),
            )),
            Slot::Pending => unreachable!("take called on pending slot"),
        }
    }
}

impl<T> Completer<T> {
    /// Deliver the task's result and wake the waiter
    pub fn complete(mut self, result: Result<T>) {
        if let Some(signal) = self.signal.take() {
            signal.complete(result);
        }
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        if let Some(signal) = self.signal.take() {
            signal.complete(Err(Error::TaskFailed(
                "task ended without producing a result".into(),
            )));
        }
    }
}
