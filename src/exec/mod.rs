// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the external commands the
//! action graph describes, using `tokio::process::Command`, and reporting
//! back to the orchestration runtime via `RuntimeEvent`s.
//!
//! - [`executor_loop`] owns the background loop which receives scheduled
//!   actions and spawns a worker per action.
//! - [`runner`] handles an individual action's process execution and output
//!   capture.
//! - [`backend`] provides the `ExecutorBackend` trait and a concrete
//!   `RealExecutorBackend` that the runtime uses in production, and which
//!   tests can replace with a fake implementation.

pub mod backend;
pub mod executor_loop;
pub mod runner;

pub use backend::{ExecutorBackend, RealExecutorBackend};
pub use executor_loop::spawn_executor;
