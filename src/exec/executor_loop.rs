// src/exec/executor_loop.rs

//! Background executor loop that fans scheduled actions out to workers.

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::RuntimeEvent;
use crate::exec::runner::run_action;
use crate::graph::ScheduledAction;

/// Spawn the background executor loop.
///
/// The returned `mpsc::Sender<ScheduledAction>` is what the runtime (or
/// `RealExecutorBackend`) uses to hand work over. Each scheduled action is
/// executed in its own Tokio task; the scheduler guarantees an action is
/// dispatched at most once per run, so no dedup is needed here. The worker
/// bound is enforced upstream by the scheduler, not by this loop.
pub fn spawn_executor(runtime_tx: mpsc::Sender<RuntimeEvent>) -> mpsc::Sender<ScheduledAction> {
    let (tx, mut rx) = mpsc::channel::<ScheduledAction>(32);

    tokio::spawn(async move {
        info!("executor loop started");

        while let Some(action) = rx.recv().await {
            debug!(action = %action.name, "executor received action");

            let rt_tx = runtime_tx.clone();
            tokio::spawn(async move {
                run_action(action, rt_tx).await;
            });
        }

        info!("executor loop finished (channel closed)");
    });

    tx
}
