// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - sending `ScheduledAction`s to the executor
//! - printing action output
//! - handling Ctrl+C / shutdown
//!
//! The core is intended to be extensively unit tested without any Tokio,
//! channels, filesystem, or processes.

use crate::engine::RuntimeEvent;
use crate::graph::{ActionId, ScheduledAction, Scheduler, SchedulerStep};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Send these actions to the executor.
    DispatchActions(Vec<ScheduledAction>),
    /// Print a block of action output, optionally preceded by a group
    /// banner. Lines already carry their tool's output prefix.
    EmitOutput {
        banner: Option<String>,
        lines: Vec<String>,
    },
    /// Request that the run ends (all work done or unreachable).
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute (dispatch actions, print, exit).
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

/// Pure core runtime state.
///
/// This owns the scheduler and the output-grouping cursor. It has **no**
/// channels, no Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct CoreRuntime {
    scheduler: Scheduler,
    /// Group prefix of the most recently emitted output block; a banner is
    /// printed only when this changes between consecutive emissions.
    last_group: Option<String>,
}

impl CoreRuntime {
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            scheduler,
            last_group: None,
        }
    }

    /// Aggregate exit status of the run so far.
    pub fn exit_code(&self) -> i32 {
        self.scheduler.exit_code()
    }

    /// Expose whether the scheduler is idle (for tests).
    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle()
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::RunStarted => {
                let step = self.scheduler.start();
                from_scheduler_step(Vec::new(), step)
            }
            RuntimeEvent::ActionCompleted {
                action,
                outcome,
                output,
            } => {
                let mut commands = Vec::new();
                if let Some(cmd) = self.output_command(action, output) {
                    commands.push(cmd);
                }
                let step = self.scheduler.complete(action, outcome);
                from_scheduler_step(commands, step)
            }
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }

    /// Build the output command for a finished action, handling the grouped
    /// banner: it is repeated only when consecutive emissions come from
    /// different tool groups.
    fn output_command(&mut self, id: ActionId, lines: Vec<String>) -> Option<CoreCommand> {
        if lines.is_empty() {
            return None;
        }

        let action = &self.scheduler.graph()[id];

        let banner = if self.last_group.as_deref() != Some(action.group_prefix.as_str()) {
            self.last_group = Some(action.group_prefix.clone());
            if action.group_prefix.is_empty() {
                None
            } else {
                Some(action.group_prefix.clone())
            }
        } else {
            None
        };

        let prefix = action.output_prefix.clone();
        let lines = lines
            .into_iter()
            .map(|line| format!("{prefix}{line}"))
            .collect();

        Some(CoreCommand::EmitOutput { banner, lines })
    }
}

/// Turn a scheduler step into the commands the IO shell should execute.
fn from_scheduler_step(mut commands: Vec<CoreCommand>, step: SchedulerStep) -> CoreStep {
    if !step.newly_scheduled.is_empty() {
        commands.push(CoreCommand::DispatchActions(step.newly_scheduled));
    }

    let keep_running = !step.run_finished;
    if step.run_finished {
        commands.push(CoreCommand::RequestExit);
    }

    CoreStep {
        commands,
        keep_running,
    }
}
