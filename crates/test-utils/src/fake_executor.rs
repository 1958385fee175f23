use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use parbuild::engine::{ActionOutcome, RuntimeEvent};
use parbuild::errors::Result;
use parbuild::exec::ExecutorBackend;
use parbuild::graph::ScheduledAction;

/// A fake executor that:
/// - records which actions were "run", in dispatch order
/// - immediately reports `ActionCompleted` for each scheduled action,
///   with a scripted exit code (default 0) and scripted output lines.
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    executed: Arc<Mutex<Vec<String>>>,
    exit_codes: HashMap<String, i32>,
    outputs: HashMap<String, Vec<String>>,
}

impl FakeExecutor {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, executed: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            runtime_tx,
            executed,
            exit_codes: HashMap::new(),
            outputs: HashMap::new(),
        }
    }

    /// Script a non-zero exit code for the named action.
    pub fn fail_action(mut self, name: &str, code: i32) -> Self {
        self.exit_codes.insert(name.to_string(), code);
        self
    }

    /// Script output lines for the named action.
    pub fn with_output(mut self, name: &str, lines: &[&str]) -> Self {
        self.outputs
            .insert(name.to_string(), lines.iter().map(|s| s.to_string()).collect());
        self
    }
}

impl ExecutorBackend for FakeExecutor {
    fn spawn_ready_actions(
        &mut self,
        actions: Vec<ScheduledAction>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let executed = Arc::clone(&self.executed);

        let completions: Vec<RuntimeEvent> = actions
            .iter()
            .map(|a| {
                let code = self.exit_codes.get(&a.name).copied().unwrap_or(0);
                let outcome = if code == 0 {
                    ActionOutcome::Success
                } else {
                    ActionOutcome::Failed(code)
                };
                RuntimeEvent::ActionCompleted {
                    action: a.id,
                    outcome,
                    output: self.outputs.get(&a.name).cloned().unwrap_or_default(),
                }
            })
            .collect();

        Box::pin(async move {
            for (action, completion) in actions.into_iter().zip(completions) {
                {
                    let mut guard = executed.lock().unwrap();
                    guard.push(action.name.clone());
                }

                tx.send(completion).await.map_err(anyhow::Error::from)?;
            }
            Ok(())
        })
    }
}
