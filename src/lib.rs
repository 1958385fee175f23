// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod graph;
pub mod logging;

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent};
use crate::errors::{Error, Result};
use crate::exec::RealExecutorBackend;
use crate::graph::{ActionGraph, Scheduler};

/// Exit code reported when the build set itself fails to load or validate,
/// distinct from any executed action's own exit code.
pub const LOAD_ERROR_EXIT_CODE: i32 = 2;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - build-set loading and graph construction
/// - scheduler / core / runtime
/// - executor
/// - Ctrl-C handling
///
/// Returns the run's aggregate exit code.
pub async fn run(args: CliArgs) -> Result<i32> {
    let build_set = load_and_validate(&args.graph)?;
    let graph = Arc::new(ActionGraph::from_build_set(&build_set)?);

    if args.dry_run {
        print_dry_run(&graph);
        return Ok(0);
    }

    let max_workers = args.workers.unwrap_or_else(default_worker_count);
    execute_graph(graph, max_workers, args.stop_on_error).await
}

/// Driver entry point: load the build set at `graph_path`, run the action
/// graph to completion, and return the aggregate exit code.
///
/// Zero on full success, otherwise the first non-zero exit code observed
/// from any executed action. Load errors return `Err` before any process
/// runs; callers map them to [`LOAD_ERROR_EXIT_CODE`].
pub async fn execute(
    graph_path: impl AsRef<Path>,
    max_workers: usize,
    stop_on_error: bool,
) -> Result<i32> {
    let build_set = load_and_validate(graph_path)?;
    let graph = Arc::new(ActionGraph::from_build_set(&build_set)?);
    execute_graph(graph, max_workers, stop_on_error).await
}

/// Run an already-built action graph under the real process executor.
pub async fn execute_graph(
    graph: Arc<ActionGraph>,
    max_workers: usize,
    stop_on_error: bool,
) -> Result<i32> {
    let scheduler = Scheduler::new(graph, max_workers, stop_on_error);

    // Runtime event channel: the reconciliation loop is the only consumer,
    // so workers never mutate scheduler state directly.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    // Process executor backend (real implementation in production).
    let executor = RealExecutorBackend::new(rt_tx.clone());

    // Ctrl-C → graceful shutdown. In-flight processes are killed on drop.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    rt_tx
        .send(RuntimeEvent::RunStarted)
        .await
        .map_err(Error::from)?;

    let core = CoreRuntime::new(scheduler);
    let runtime = Runtime::new(core, rt_rx, executor);
    runtime.run().await
}

/// Default worker bound: one per available processing unit.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Simple dry-run output: print actions, dependencies and command lines.
fn print_dry_run(graph: &ActionGraph) {
    println!("parbuild dry-run");
    println!("actions ({}):", graph.len());

    for (_, action) in graph.iter() {
        println!("  - {} ({})", action.name, action.caption);
        println!("      cmd: {} {}", action.program, action.args.join(" "));
        if !action.dependencies.is_empty() {
            let deps: Vec<&str> = action
                .dependencies
                .iter()
                .map(|&dep| graph[dep].name.as_str())
                .collect();
            println!("      depends_on: {deps:?}");
        }
        println!("      fan_out: {}", action.total_dependants);
        if action.skip_if_project_failed {
            println!("      skip_if_project_failed: true");
        }
    }

    debug!("dry-run complete (no execution)");
}
