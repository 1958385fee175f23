// tests/property_scheduler.rs

//! Randomized scheduler properties: on arbitrary acyclic graphs with
//! arbitrary failure sets and worker bounds, every run terminates, the
//! worker bound holds, nothing launches before its dependencies succeeded,
//! and nothing is left waiting without a reason.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use parbuild::config::BuildSet;
use parbuild::engine::ActionOutcome;
use parbuild::graph::{ActionGraph, ActionId, ActionState, Scheduler};
use parbuild_test_utils::builders::{BuildSetBuilder, TaskBuilder};

// Strategy to generate a valid action graph. Acyclicity is ensured by only
// allowing task N to depend on tasks 0..N-1.
fn dag_config_strategy(max_tasks: usize) -> impl Strategy<Value = BuildSet> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        let deps_strat = proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_tasks),
            num_tasks,
        );

        deps_strat.prop_map(move |raw_deps| {
            let mut builder = BuildSetBuilder::new();
            for (i, potential_deps) in raw_deps.into_iter().enumerate() {
                let name = format!("task_{i:02}");
                let mut task = TaskBuilder::new();

                // Sanitize dependencies: only allow deps < i.
                let mut valid_deps = HashSet::new();
                for dep_idx in potential_deps {
                    if i > 0 {
                        valid_deps.insert(dep_idx % i);
                    }
                }
                for dep_idx in valid_deps {
                    task = task.depends_on(&format!("task_{dep_idx:02}"));
                }

                builder = builder.with_task(&name, task.build());
            }
            builder.build()
        })
    })
}

proptest! {
    #[test]
    fn random_runs_terminate_and_respect_the_partial_order(
        cfg in dag_config_strategy(10),
        failing_indices in proptest::collection::vec(0..10usize, 0..5),
        max_workers in 1..4usize,
    ) {
        let graph = Arc::new(ActionGraph::from_build_set(&cfg).expect("generated build set loads"));

        let failing: HashSet<ActionId> = failing_indices
            .iter()
            .filter_map(|&i| graph.find(&format!("task_{i:02}")))
            .collect();

        let mut scheduler = Scheduler::new(Arc::clone(&graph), max_workers, false);

        let mut launched: HashSet<ActionId> = HashSet::new();
        let mut succeeded: HashSet<ActionId> = HashSet::new();

        // FIFO queue of actions currently "executing".
        let mut executing: Vec<ActionId> = Vec::new();

        let mut absorb = |scheduled: &[parbuild::graph::ScheduledAction],
                          launched: &mut HashSet<ActionId>,
                          succeeded: &HashSet<ActionId>,
                          executing: &mut Vec<ActionId>|
         -> Result<(), TestCaseError> {
            for action in scheduled {
                prop_assert!(
                    launched.insert(action.id),
                    "action {} launched twice",
                    action.name
                );
                for &dep in &graph[action.id].dependencies {
                    prop_assert!(
                        succeeded.contains(&dep),
                        "action {} launched before dependency {} succeeded",
                        action.name,
                        graph[dep].name
                    );
                }
                executing.push(action.id);
            }
            Ok(())
        };

        let step = scheduler.start();
        absorb(&step.newly_scheduled, &mut launched, &succeeded, &mut executing)?;

        let mut last_finished = step.run_finished;
        let mut steps = 0;
        let max_steps = 1000;

        while let Some(id) = executing.first().copied() {
            executing.remove(0);
            steps += 1;
            prop_assert!(steps < max_steps, "simulation did not terminate");

            let outcome = if failing.contains(&id) {
                ActionOutcome::Failed(1)
            } else {
                ActionOutcome::Success
            };
            if outcome == ActionOutcome::Success {
                succeeded.insert(id);
            }

            let step = scheduler.complete(id, outcome);
            prop_assert!(scheduler.running_count() <= max_workers);
            absorb(&step.newly_scheduled, &mut launched, &succeeded, &mut executing)?;
            last_finished = step.run_finished;
        }

        prop_assert!(last_finished, "drained all workers but the run is not finished");
        prop_assert!(scheduler.is_idle());

        // Nothing is left waiting without an unsatisfied dependency.
        for (id, action) in graph.iter() {
            if scheduler.state_of(id) == ActionState::Waiting {
                let blocked = action
                    .dependencies
                    .iter()
                    .any(|dep| !succeeded.contains(dep));
                prop_assert!(
                    blocked,
                    "action {} is waiting but all dependencies succeeded",
                    action.name
                );
            }
        }

        // The aggregate exit code is non-zero exactly when a launched action
        // failed.
        let any_failure = launched.iter().any(|id| failing.contains(id));
        prop_assert_eq!(scheduler.exit_code() != 0, any_failure);
    }
}
