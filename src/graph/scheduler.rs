// src/graph/scheduler.rs

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::engine::ActionOutcome;
use crate::graph::action::{ActionGraph, ActionId, ProjectId, ScheduledAction};
use crate::graph::ready::ReadyQueue;

/// Per-run state of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    /// Waiting on dependencies (or permanently orphaned behind a failure).
    Waiting,
    /// Dependencies satisfied; sitting in the ready queue.
    Queued,
    /// Handed to a worker and currently executing.
    Running,
    DoneSuccess,
    DoneFailed,
    /// Never launched because its owning project failed first.
    Skipped,
}

/// Scheduler holds the immutable action graph plus mutable per-run state.
///
/// It is responsible for:
/// - tracking each action's missing-dependency counter
/// - ordering ready actions by priority and filling worker slots up to the
///   concurrency bound
/// - recording the first failure as the aggregate exit code
/// - enforcing the fail-fast policy (no new launches after a failure)
///
/// All methods run on the reconciliation thread; workers never touch this
/// state directly.
#[derive(Debug)]
pub struct Scheduler {
    graph: Arc<ActionGraph>,
    /// Remaining unsatisfied dependencies per action. Reaches zero exactly
    /// when the action becomes ready; only successful completions decrement.
    missing_deps: Vec<usize>,
    state: Vec<ActionState>,
    ready: ReadyQueue,
    running: usize,
    max_workers: usize,
    stop_on_error: bool,
    /// First non-zero exit code observed, if any.
    failure_code: Option<i32>,
    failed_projects: HashSet<ProjectId>,
}

/// Result of one scheduling step.
#[derive(Debug, Clone)]
pub struct SchedulerStep {
    /// Actions to hand to the executor now.
    pub newly_scheduled: Vec<ScheduledAction>,
    /// True when nothing is running and nothing is queued: the run is over,
    /// even if some actions were never launched.
    pub run_finished: bool,
}

impl Scheduler {
    pub fn new(graph: Arc<ActionGraph>, max_workers: usize, stop_on_error: bool) -> Self {
        let missing_deps: Vec<usize> = graph.iter().map(|(_, a)| a.dependencies.len()).collect();
        let state = vec![ActionState::Waiting; graph.len()];

        Self {
            graph,
            missing_deps,
            state,
            ready: ReadyQueue::new(),
            running: 0,
            max_workers: max_workers.max(1),
            stop_on_error,
            failure_code: None,
            failed_projects: HashSet::new(),
        }
    }

    /// Seed the ready queue with dependency-free actions and fill worker
    /// slots.
    pub fn start(&mut self) -> SchedulerStep {
        let roots: Vec<ActionId> = self
            .graph
            .iter()
            .filter_map(|(id, _)| (self.missing_deps[id.0] == 0).then_some(id))
            .collect();

        debug!(
            actions = self.graph.len(),
            roots = roots.len(),
            max_workers = self.max_workers,
            "starting run"
        );

        for id in roots {
            self.enqueue(id);
        }

        let newly_scheduled = self.fill_worker_slots();
        SchedulerStep {
            newly_scheduled,
            run_finished: self.is_idle(),
        }
    }

    /// Reconcile a finished worker and launch whatever became ready.
    pub fn complete(&mut self, id: ActionId, outcome: ActionOutcome) -> SchedulerStep {
        if self.state[id.0] != ActionState::Running {
            warn!(
                action = %self.graph[id].name,
                state = ?self.state[id.0],
                "completion for an action that is not running; ignoring"
            );
            return SchedulerStep {
                newly_scheduled: Vec::new(),
                run_finished: self.is_idle(),
            };
        }

        self.running -= 1;

        match outcome {
            ActionOutcome::Success => {
                self.state[id.0] = ActionState::DoneSuccess;
                debug!(action = %self.graph[id].name, "action completed successfully");

                let dependants = self.graph[id].dependants.clone();
                for dep_id in dependants {
                    self.missing_deps[dep_id.0] -= 1;
                    if self.missing_deps[dep_id.0] == 0
                        && self.state[dep_id.0] == ActionState::Waiting
                    {
                        self.enqueue(dep_id);
                    }
                }
            }
            ActionOutcome::Failed(code) => {
                self.state[id.0] = ActionState::DoneFailed;
                self.failed_projects.insert(self.graph[id].project);

                warn!(
                    action = %self.graph[id].name,
                    exit_code = code,
                    "action failed; its dependants will never be scheduled in this run"
                );

                // First failure wins as the aggregate exit code.
                if self.failure_code.is_none() {
                    self.failure_code = Some(code);
                }

                // Dependants keep a non-zero missing count forever: they are
                // silently orphaned, not failed.
                if self.stop_on_error {
                    let dropped = self.ready.len();
                    self.ready.clear();
                    for state in self.state.iter_mut() {
                        if *state == ActionState::Queued {
                            *state = ActionState::Waiting;
                        }
                    }
                    info!(
                        dropped,
                        "stop-on-error: clearing ready queue; in-flight actions drain"
                    );
                }
            }
        }

        let newly_scheduled = self.fill_worker_slots();
        SchedulerStep {
            newly_scheduled,
            run_finished: self.is_idle(),
        }
    }

    /// No work is queued and no worker is executing. This can be true while
    /// some actions never ran (orphaned behind a failure or a dependency
    /// cycle); that is a normal end of run.
    pub fn is_idle(&self) -> bool {
        self.running == 0 && self.ready.is_empty()
    }

    /// Aggregate exit status: zero on full success, otherwise the first
    /// non-zero exit code observed.
    pub fn exit_code(&self) -> i32 {
        self.failure_code.unwrap_or(0)
    }

    pub fn graph(&self) -> &ActionGraph {
        &self.graph
    }

    /// Read-only view of an action's per-run state, for diagnostics and
    /// tests.
    pub fn state_of(&self, id: ActionId) -> ActionState {
        self.state[id.0]
    }

    pub fn running_count(&self) -> usize {
        self.running
    }

    fn enqueue(&mut self, id: ActionId) {
        let action = &self.graph[id];
        self.state[id.0] = ActionState::Queued;
        self.ready
            .push(id, action.total_dependants, action.sort_index);
    }

    /// Pop ready actions in priority order until the worker bound is reached.
    ///
    /// Actions whose owning project already failed and which opted into
    /// `skip_if_project_failed` are dropped here: never launched, never
    /// unblocking their dependants.
    fn fill_worker_slots(&mut self) -> Vec<ScheduledAction> {
        let mut launched = Vec::new();

        while self.running < self.max_workers {
            let Some(id) = self.ready.pop() else {
                break;
            };

            let action = &self.graph[id];
            if action.skip_if_project_failed && self.failed_projects.contains(&action.project) {
                self.state[id.0] = ActionState::Skipped;
                info!(
                    action = %action.name,
                    "owning project already failed; skipping action"
                );
                continue;
            }

            self.state[id.0] = ActionState::Running;
            self.running += 1;

            info!(
                action = %action.name,
                caption = %action.caption,
                fan_out = action.total_dependants,
                slots_used = self.running,
                "launching action"
            );

            launched.push(ScheduledAction::from_action(id, action));
        }

        launched
    }
}
