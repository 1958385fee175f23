// tests/runtime_fake_executor.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

use parbuild::config::BuildSet;
use parbuild::engine::{CoreRuntime, Runtime, RuntimeEvent};
use parbuild::graph::{ActionGraph, Scheduler};
use parbuild_test_utils::builders::{BuildSetBuilder, TaskBuilder};
use parbuild_test_utils::fake_executor::FakeExecutor;

type TestResult = Result<(), Box<dyn Error>>;

/// Very simple chain: a -> b.
fn simple_chain_config() -> BuildSet {
    BuildSetBuilder::new()
        .with_task("a", TaskBuilder::new().build())
        .with_task("b", TaskBuilder::new().depends_on("a").build())
        .build()
}

struct Harness {
    runtime: Runtime<FakeExecutor>,
    executed: Arc<Mutex<Vec<String>>>,
}

fn harness(
    build_set: &BuildSet,
    max_workers: usize,
    stop_on_error: bool,
    configure: impl FnOnce(FakeExecutor) -> FakeExecutor,
) -> Harness {
    let graph = Arc::new(ActionGraph::from_build_set(build_set).expect("build set should load"));
    let scheduler = Scheduler::new(graph, max_workers, stop_on_error);

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);

    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = configure(FakeExecutor::new(rt_tx.clone(), executed.clone()));

    // Seed the run before starting the event loop.
    rt_tx
        .try_send(RuntimeEvent::RunStarted)
        .expect("channel has capacity");

    let core = CoreRuntime::new(scheduler);
    let runtime = Runtime::new(core, rt_rx, executor);

    Harness { runtime, executed }
}

async fn run_to_completion(h: Harness) -> Result<(i32, Vec<String>), Box<dyn Error>> {
    // Enforce an upper bound on how long the loop may run.
    let exit_code = timeout(Duration::from_secs(3), h.runtime.run())
        .await
        .expect("runtime did not finish within 3 seconds")?;

    let executed = h.executed.lock().unwrap().clone();
    Ok((exit_code, executed))
}

#[tokio::test]
async fn fake_executor_runs_simple_chain_in_order() -> TestResult {
    init_tracing();

    let cfg = simple_chain_config();
    let h = harness(&cfg, 4, false, |e| e);

    let (exit_code, executed) = run_to_completion(h).await?;
    assert_eq!(exit_code, 0);
    assert_eq!(executed, vec!["a".to_string(), "b".to_string()]);

    Ok(())
}

#[tokio::test]
async fn failure_exit_code_propagates_through_the_runtime() -> TestResult {
    init_tracing();

    let cfg = simple_chain_config();
    let h = harness(&cfg, 4, false, |e| e.fail_action("a", 9));

    let (exit_code, executed) = run_to_completion(h).await?;
    assert_eq!(exit_code, 9);
    // "b" is orphaned behind the failure and never dispatched.
    assert_eq!(executed, vec!["a".to_string()]);

    Ok(())
}

#[tokio::test]
async fn stop_on_error_prevents_new_launches_end_to_end() -> TestResult {
    init_tracing();

    // "fail" outranks "solo" via its dependant, and the single worker slot
    // keeps "solo" queued until the failure lands.
    let cfg = BuildSetBuilder::new()
        .with_task("fail", TaskBuilder::new().build())
        .with_task("child", TaskBuilder::new().depends_on("fail").build())
        .with_task("solo", TaskBuilder::new().build())
        .build();

    let h = harness(&cfg, 1, true, |e| e.fail_action("fail", 4));

    let (exit_code, executed) = run_to_completion(h).await?;
    assert_eq!(exit_code, 4);
    assert_eq!(executed, vec!["fail".to_string()]);

    Ok(())
}

#[tokio::test]
async fn without_stop_on_error_independent_branch_completes() -> TestResult {
    init_tracing();

    let cfg = BuildSetBuilder::new()
        .with_task("fail", TaskBuilder::new().build())
        .with_task("child", TaskBuilder::new().depends_on("fail").build())
        .with_task("solo", TaskBuilder::new().build())
        .build();

    let h = harness(&cfg, 1, false, |e| e.fail_action("fail", 4));

    let (exit_code, executed) = run_to_completion(h).await?;
    assert_eq!(exit_code, 4);
    assert_eq!(executed, vec!["fail".to_string(), "solo".to_string()]);

    Ok(())
}

#[tokio::test]
async fn shutdown_request_stops_the_loop() -> TestResult {
    init_tracing();

    let cfg = simple_chain_config();
    let graph = Arc::new(ActionGraph::from_build_set(&cfg)?);
    let scheduler = Scheduler::new(graph, 4, false);

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(rt_tx.clone(), executed.clone());

    // Shut down before the run is ever seeded.
    rt_tx.try_send(RuntimeEvent::ShutdownRequested)?;

    let runtime = Runtime::new(CoreRuntime::new(scheduler), rt_rx, executor);
    let exit_code = timeout(Duration::from_secs(3), runtime.run())
        .await
        .expect("runtime did not finish within 3 seconds")?;

    assert_eq!(exit_code, 0);
    assert!(executed.lock().unwrap().is_empty());

    Ok(())
}
