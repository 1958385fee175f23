#![allow(dead_code)]

use std::collections::BTreeMap;

use parbuild::config::{
    BuildSet, EnvironmentConfig, ProjectConfig, RawBuildSet, TaskConfig, ToolConfig,
};

/// Builder for `BuildSet` to simplify test setup.
///
/// Starts with a single unnamed project and an environment `"env"` holding a
/// no-op tool `"tool"` (path `"true"`), so most tests only need to add tasks.
pub struct BuildSetBuilder {
    raw: RawBuildSet,
}

impl BuildSetBuilder {
    pub fn new() -> Self {
        let mut environment = BTreeMap::new();
        let mut tool = BTreeMap::new();
        tool.insert("tool".to_string(), ToolBuilder::new("true").build());
        environment.insert(
            "env".to_string(),
            EnvironmentConfig {
                variables: BTreeMap::new(),
                tool,
            },
        );

        Self {
            raw: RawBuildSet {
                environment,
                project: vec![ProjectConfig {
                    name: None,
                    env: Some("env".to_string()),
                    task: BTreeMap::new(),
                }],
            },
        }
    }

    /// Add a task to the first project.
    pub fn with_task(self, name: &str, task: TaskConfig) -> Self {
        self.with_task_in_project(0, name, task)
    }

    pub fn with_task_in_project(mut self, project: usize, name: &str, task: TaskConfig) -> Self {
        while self.raw.project.len() <= project {
            let idx = self.raw.project.len();
            self.raw.project.push(ProjectConfig {
                name: Some(format!("p{idx}")),
                env: Some("env".to_string()),
                task: BTreeMap::new(),
            });
        }
        self.raw.project[project].task.insert(name.to_string(), task);
        self
    }

    pub fn with_variable(mut self, name: &str, value: &str) -> Self {
        let env = self
            .raw
            .environment
            .get_mut("env")
            .expect("default environment exists");
        env.variables.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_tool(mut self, name: &str, tool: ToolConfig) -> Self {
        let env = self
            .raw
            .environment
            .get_mut("env")
            .expect("default environment exists");
        env.tool.insert(name.to_string(), tool);
        self
    }

    pub fn build_raw(self) -> RawBuildSet {
        self.raw
    }

    pub fn build(self) -> BuildSet {
        BuildSet::try_from(self.raw).expect("Failed to build valid build set from builder")
    }
}

impl Default for BuildSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskBuilder {
    task: TaskConfig,
}

impl TaskBuilder {
    /// A task using the builder's default no-op tool.
    pub fn new() -> Self {
        Self::with_tool("tool")
    }

    pub fn with_tool(tool: &str) -> Self {
        Self {
            task: TaskConfig {
                tool: tool.to_string(),
                caption: None,
                depends_on: String::new(),
                skip_if_project_failed: false,
            },
        }
    }

    pub fn depends_on(mut self, dep: &str) -> Self {
        if self.task.depends_on.is_empty() {
            self.task.depends_on = dep.to_string();
        } else {
            self.task.depends_on = format!("{};{}", self.task.depends_on, dep);
        }
        self
    }

    pub fn caption(mut self, caption: &str) -> Self {
        self.task.caption = Some(caption.to_string());
        self
    }

    pub fn skip_if_project_failed(mut self, val: bool) -> Self {
        self.task.skip_if_project_failed = val;
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}

impl Default for TaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ToolConfig`.
pub struct ToolBuilder {
    tool: ToolConfig,
}

impl ToolBuilder {
    pub fn new(path: &str) -> Self {
        Self {
            tool: ToolConfig {
                group_prefix: None,
                output_prefix: None,
                path: path.to_string(),
                working_dir: None,
                params: String::new(),
            },
        }
    }

    pub fn group_prefix(mut self, prefix: &str) -> Self {
        self.tool.group_prefix = Some(prefix.to_string());
        self
    }

    pub fn output_prefix(mut self, prefix: &str) -> Self {
        self.tool.output_prefix = Some(prefix.to_string());
        self
    }

    pub fn params(mut self, params: &str) -> Self {
        self.tool.params = params.to_string();
        self
    }

    pub fn working_dir(mut self, dir: &str) -> Self {
        self.tool.working_dir = Some(dir.to_string());
        self
    }

    pub fn build(self) -> ToolConfig {
        self.tool
    }
}
