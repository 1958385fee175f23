// src/exec/runner.rs

//! Individual action process runner.

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::engine::{ActionOutcome, RuntimeEvent};
use crate::graph::ScheduledAction;

/// Run a single action's process to completion, capturing all output lines,
/// and emit an `ActionCompleted` event with the outcome.
///
/// A spawn or wait error is reported as `Failed(-1)` with the error text as
/// the only output line, so the scheduler always sees exactly one completion
/// per dispatched action.
pub async fn run_action(action: ScheduledAction, runtime_tx: mpsc::Sender<RuntimeEvent>) {
    let id = action.id;
    let name = action.name.clone();

    let (outcome, output) = match run_action_inner(action).await {
        Ok((output, code)) => {
            let outcome = if code == 0 {
                ActionOutcome::Success
            } else {
                ActionOutcome::Failed(code)
            };
            (outcome, output)
        }
        Err(err) => {
            error!(action = %name, error = %err, "action execution error");
            (ActionOutcome::Failed(-1), vec![format!("{err:#}")])
        }
    };

    let _ = runtime_tx
        .send(RuntimeEvent::ActionCompleted {
            action: id,
            outcome,
            output,
        })
        .await;
}

async fn run_action_inner(action: ScheduledAction) -> Result<(Vec<String>, i32)> {
    info!(
        action = %action.name,
        caption = %action.caption,
        program = %action.program,
        "starting action process"
    );

    let mut cmd = Command::new(&action.program);
    cmd.args(&action.args)
        .current_dir(&action.working_dir)
        .env_clear()
        .envs(action.env.iter())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process for action '{}'", action.name))?;

    // Both pipes are drained concurrently with the exit wait so a chatty
    // process can't fill a buffer and deadlock.
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let stdout_task = tokio::spawn(read_lines(stdout));
    let stderr_task = tokio::spawn(read_lines(stderr));

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of action '{}'", action.name))?;

    let mut output = stdout_task.await.unwrap_or_default();
    output.extend(stderr_task.await.unwrap_or_default());

    let code = status.code().unwrap_or(-1);
    info!(
        action = %action.name,
        exit_code = code,
        success = status.success(),
        lines = output.len(),
        "action process exited"
    );

    Ok((output, code))
}

async fn read_lines<R>(reader: Option<R>) -> Vec<String>
where
    R: AsyncRead + Unpin,
{
    let mut collected = Vec::new();

    if let Some(reader) = reader {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            collected.push(line);
        }
    }

    collected
}
