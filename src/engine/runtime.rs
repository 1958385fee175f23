// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::core::{CoreCommand, CoreRuntime};
use crate::engine::RuntimeEvent;
use crate::errors::Result;
use crate::exec::ExecutorBackend;
use crate::graph::ScheduledAction;

/// Drives the scheduler in response to `RuntimeEvent`s and delegates actual
/// command execution to an `ExecutorBackend`.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// runtime semantics. This struct handles async IO: reading events from
/// channels, dispatching actions to the executor, and printing action
/// output to stdout.
pub struct Runtime<E: ExecutorBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, executor: E) -> Self {
        Self {
            core,
            event_rx,
            executor,
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `RuntimeEvent`s from `event_rx`.
    /// - Feeds them into the core runtime.
    /// - Executes commands returned by the core (dispatch actions, print
    ///   output, exit).
    ///
    /// Returns the aggregate exit code: zero on full success, otherwise the
    /// first non-zero exit code any action reported.
    pub async fn run(mut self) -> Result<i32> {
        info!("parbuild runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            // Feed the event into the pure core and get commands back.
            let step = self.core.step(event);

            // Execute the commands.
            for command in step.commands {
                self.execute_command(command).await?;
            }

            // If the core says to stop, break out of the loop.
            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        let exit_code = self.core.exit_code();
        info!(exit_code, "runtime exiting");
        Ok(exit_code)
    }

    /// Execute a single command from the core.
    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::DispatchActions(actions) => {
                self.spawn_ready(actions).await?;
            }
            CoreCommand::EmitOutput { banner, lines } => {
                // Action output goes to stdout; logging stays on stderr.
                if let Some(banner) = banner {
                    println!("{banner}");
                }
                for line in lines {
                    println!("{line}");
                }
            }
            CoreCommand::RequestExit => {
                // The core already returns keep_running=false in this case;
                // nothing to do beyond logging.
                info!("core issued RequestExit command");
            }
        }
        Ok(())
    }

    async fn spawn_ready(&mut self, actions: Vec<ScheduledAction>) -> Result<()> {
        if actions.is_empty() {
            return Ok(());
        }

        let names: Vec<_> = actions.iter().map(|a| a.name.as_str()).collect();
        debug!(?names, "dispatching ready actions");

        self.executor.spawn_ready_actions(actions).await
    }
}
