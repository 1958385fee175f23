// src/engine/mod.rs

//! Orchestration engine for parbuild.
//!
//! This module ties together:
//! - the action-graph scheduler
//! - the main runtime event loop that reacts to:
//!   - run start
//!   - action completion events from workers
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::graph::ActionId;

/// Outcome of an action's external process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Success,
    Failed(i32),
}

/// Events flowing into the runtime from the driver and the executor.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Seed the ready set and launch the first wave of actions.
    RunStarted,
    /// An action's process exited (or could not be spawned).
    ActionCompleted {
        action: ActionId,
        outcome: ActionOutcome,
        /// Captured stdout and stderr lines, in capture order.
        output: Vec<String>,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod runtime;

pub use self::core::{CoreCommand, CoreRuntime, CoreStep};
pub use runtime::Runtime;
