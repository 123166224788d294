//! Concurrency layer for localstore
//!
//! This crate serializes all backend access onto one thread:
//! - [`TaskQueue`]: unbounded FIFO shared by producers and the worker
//! - [`Worker`]: owns the dedicated thread and the context it mutates
//! - [`CompletionSignal`]: one-shot hand-off from a task to a blocked caller
//! - [`Dispatcher`]: synchronous and asynchronous submission on top of a worker
//!
//! ## Ordering
//!
//! Tasks run strictly in queue-arrival order, one at a time. A synchronous
//! call therefore observes the effects of every task queued before it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dispatcher;
pub mod queue;
pub mod signal;
pub mod worker;

pub use dispatcher::Dispatcher;
pub use queue::TaskQueue;
pub use signal::{CompletionSignal, Completer};
pub use worker::{Task, Worker, WorkerMetrics, WorkerState};
