// src/graph/build.rs

//! Semantic load: validated build set -> [`ActionGraph`].
//!
//! Actions are created lazily the first time their name is referenced, either
//! as a declaration or as a dependency of another task. This lets forward
//! references within a project resolve in a single pass; a name that is still
//! undeclared when its project has been fully parsed is a hard load error.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, warn};

use crate::config::model::{BuildSet, ToolConfig};
use crate::errors::{ParbuildError, Result};
use crate::graph::action::{ActionGraph, ActionId, BuildAction, ProjectId};
use crate::graph::fanout;

/// Action under construction. `decl` stays `None` until the task declaration
/// itself is seen.
struct PendingAction {
    name: String,
    project: ProjectId,
    dependencies: Vec<ActionId>,
    dependants: Vec<ActionId>,
    decl: Option<ActionDecl>,
}

struct ActionDecl {
    sort_index: usize,
    caption: String,
    group_prefix: String,
    output_prefix: String,
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
    env: Arc<BTreeMap<String, String>>,
    skip_if_project_failed: bool,
}

impl ActionGraph {
    /// Build the action graph from a validated [`BuildSet`].
    ///
    /// Fails on unknown tool references and on dependency names that are
    /// never declared within their project. Unresolved `$(NAME)` placeholders
    /// are a warning only; the literal token is kept.
    pub fn from_build_set(cfg: &BuildSet) -> Result<ActionGraph> {
        let expander = PlaceholderExpander::new();

        // Ambient process environment; the fallback for projects that name
        // no environment, and the base layer for those that do.
        let ambient: Arc<BTreeMap<String, String>> = Arc::new(std::env::vars().collect());

        let mut envs: HashMap<&str, Arc<BTreeMap<String, String>>> = HashMap::new();
        for (name, env_cfg) in cfg.environment.iter() {
            let mut vars = (*ambient).clone();
            vars.extend(
                env_cfg
                    .variables
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            );
            envs.insert(name.as_str(), Arc::new(vars));
        }

        // Global tool registry; uniqueness across environments is validated
        // at config load.
        let mut tools: HashMap<&str, &ToolConfig> = HashMap::new();
        for env_cfg in cfg.environment.values() {
            for (tool_name, tool) in env_cfg.tool.iter() {
                tools.insert(tool_name.as_str(), tool);
            }
        }

        let mut pending: Vec<PendingAction> = Vec::new();
        let mut sort_counter = 0usize;

        for (proj_idx, project) in cfg.project.iter().enumerate() {
            let project_id = ProjectId(proj_idx);
            let label = project.label(proj_idx);

            let env = match project.env.as_deref() {
                Some(name) => Arc::clone(&envs[name]),
                None => Arc::clone(&ambient),
            };

            // Task names are scoped to their project.
            let mut by_name: HashMap<String, ActionId> = HashMap::new();

            for (task_name, task) in project.task.iter() {
                let action_id = intern(&mut pending, &mut by_name, task_name, project_id);

                let tool = tools.get(task.tool.as_str()).copied().ok_or_else(|| {
                    ParbuildError::UnknownTool {
                        task: task_name.clone(),
                        tool: task.tool.clone(),
                    }
                })?;

                let program = expander.expand(&tool.path, &env, task_name);
                let params = expander.expand(&tool.params, &env, task_name);
                let working_dir = match &tool.working_dir {
                    Some(dir) => PathBuf::from(expander.expand(dir, &env, task_name)),
                    None => PathBuf::from("."),
                };

                pending[action_id.0].decl = Some(ActionDecl {
                    sort_index: sort_counter,
                    caption: task.caption.clone().unwrap_or_else(|| task_name.clone()),
                    group_prefix: tool.effective_group_prefix().to_string(),
                    output_prefix: tool.effective_output_prefix().to_string(),
                    program,
                    args: params.split_whitespace().map(str::to_string).collect(),
                    working_dir,
                    env: Arc::clone(&env),
                    skip_if_project_failed: task.skip_if_project_failed,
                });
                sort_counter += 1;

                for dep_name in task.dependency_names() {
                    let dep_id = intern(&mut pending, &mut by_name, dep_name, project_id);
                    // `depends_on` is a set; ignore repeated names.
                    if pending[action_id.0].dependencies.contains(&dep_id) {
                        continue;
                    }
                    pending[action_id.0].dependencies.push(dep_id);
                    pending[dep_id.0].dependants.push(action_id);
                }
            }

            // Every name referenced within this project must have a real
            // declaration by now.
            for (name, id) in by_name.iter() {
                if pending[id.0].decl.is_none() {
                    return Err(ParbuildError::UndeclaredDependency {
                        project: label.clone(),
                        dependency: name.clone(),
                    });
                }
            }

            debug!(
                project = %label,
                tasks = project.task.len(),
                "project parsed into action graph"
            );
        }

        let mut actions: Vec<BuildAction> = pending
            .into_iter()
            .map(|p| {
                // Checked above: all pending actions are declared.
                let decl = p.decl.expect("undeclared action survived load");
                BuildAction {
                    name: p.name,
                    project: p.project,
                    sort_index: decl.sort_index,
                    caption: decl.caption,
                    group_prefix: decl.group_prefix,
                    output_prefix: decl.output_prefix,
                    program: decl.program,
                    args: decl.args,
                    working_dir: decl.working_dir,
                    env: decl.env,
                    skip_if_project_failed: decl.skip_if_project_failed,
                    dependencies: p.dependencies,
                    dependants: p.dependants,
                    total_dependants: 0,
                }
            })
            .collect();

        fanout::compute_total_dependants(&mut actions);

        Ok(ActionGraph::new(actions))
    }
}

/// Return the id for `name` within the current project, creating a
/// placeholder on first reference.
fn intern(
    pending: &mut Vec<PendingAction>,
    by_name: &mut HashMap<String, ActionId>,
    name: &str,
    project: ProjectId,
) -> ActionId {
    if let Some(&id) = by_name.get(name) {
        return id;
    }

    let id = ActionId(pending.len());
    pending.push(PendingAction {
        name: name.to_string(),
        project,
        dependencies: Vec::new(),
        dependants: Vec::new(),
        decl: None,
    });
    by_name.insert(name.to_string(), id);
    id
}

/// Expands `$(NAME)` placeholders against a resolved variable map.
struct PlaceholderExpander {
    token: Regex,
}

impl PlaceholderExpander {
    fn new() -> Self {
        Self {
            token: Regex::new(r"\$\(([A-Za-z0-9_]+)\)").expect("placeholder regex is valid"),
        }
    }

    /// Replace every resolvable `$(NAME)` with its value. An unresolved name
    /// is a warning, not an error: the literal token stays in place.
    fn expand(&self, input: &str, vars: &BTreeMap<String, String>, task: &str) -> String {
        self.token
            .replace_all(input, |caps: &regex::Captures<'_>| {
                let name = &caps[1];
                match vars.get(name) {
                    Some(value) => value.clone(),
                    None => {
                        warn!(
                            task = %task,
                            variable = %name,
                            "unresolved placeholder in command line; keeping literal text"
                        );
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }
}
