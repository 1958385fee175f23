// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// Top-level build-set description as read from a TOML file, before
/// validation.
///
/// ```toml
/// [environment.Release.variables]
/// OUT = "build/out"
///
/// [environment.Release.tool.cc]
/// group_prefix = "Compiling"
/// output_prefix = "cc> "
/// path = "/usr/bin/cc"
/// params = "-O2 -o $(OUT)"
///
/// [[project]]
/// name = "core"
/// env = "Release"
///
/// [project.task.lex]
/// tool = "cc"
///
/// [project.task.parse]
/// tool = "cc"
/// depends_on = "lex"
/// ```
///
/// Use [`BuildSet::try_from`] to obtain the validated form.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBuildSet {
    /// All environments from `[environment.<name>]`.
    #[serde(default)]
    pub environment: BTreeMap<String, EnvironmentConfig>,

    /// All projects from `[[project]]`, in file order.
    #[serde(default)]
    pub project: Vec<ProjectConfig>,
}

/// Validated build set.
///
/// Construction goes through `TryFrom<RawBuildSet>` (see `config::validate`),
/// so holders of this type can assume environment references resolve and the
/// structural invariants hold.
#[derive(Debug, Clone)]
pub struct BuildSet {
    pub environment: BTreeMap<String, EnvironmentConfig>,
    pub project: Vec<ProjectConfig>,
}

impl BuildSet {
    /// Internal constructor used by validation. Not for general use.
    pub(crate) fn new_unchecked(
        environment: BTreeMap<String, EnvironmentConfig>,
        project: Vec<ProjectConfig>,
    ) -> Self {
        Self {
            environment,
            project,
        }
    }
}

/// `[environment.<name>]` section: a named variable set plus the tools
/// declared under it.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EnvironmentConfig {
    /// Variable overrides applied on top of the ambient process environment.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,

    /// Tools from `[environment.<name>.tool.<tool>]`.
    #[serde(default)]
    pub tool: BTreeMap<String, ToolConfig>,
}

/// `[environment.<name>.tool.<tool>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolConfig {
    /// Banner printed above a block of output from actions using this tool.
    #[serde(default)]
    pub group_prefix: Option<String>,

    /// Prefix prepended to every output line of actions using this tool.
    #[serde(default)]
    pub output_prefix: Option<String>,

    /// Executable path. May contain `$(NAME)` placeholders.
    pub path: String,

    /// Default working directory for actions using this tool.
    ///
    /// Falls back to the current directory when omitted.
    #[serde(default)]
    pub working_dir: Option<String>,

    /// Argument string. May contain `$(NAME)` placeholders; split on
    /// whitespace after expansion.
    #[serde(default)]
    pub params: String,
}

impl ToolConfig {
    pub fn effective_group_prefix(&self) -> &str {
        self.group_prefix.as_deref().unwrap_or_default()
    }

    pub fn effective_output_prefix(&self) -> &str {
        self.output_prefix.as_deref().unwrap_or_default()
    }
}

/// `[[project]]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    /// Optional display name; projects without one are addressed by index.
    #[serde(default)]
    pub name: Option<String>,

    /// Named environment the project's tasks resolve variables against.
    ///
    /// When omitted, tasks expand against the ambient process environment.
    #[serde(default)]
    pub env: Option<String>,

    /// Tasks from `[project.task.<name>]`. Task names are unique within
    /// their project.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

impl ProjectConfig {
    /// Display label for diagnostics: the declared name, or `project#<idx>`.
    pub fn label(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("project#{index}"))
    }
}

/// `[project.task.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// Name of the tool this task invokes.
    pub tool: String,

    /// Display caption; defaults to the task name.
    #[serde(default)]
    pub caption: Option<String>,

    /// `;`-separated list of task names this task waits for, resolved
    /// within the same project.
    #[serde(default)]
    pub depends_on: String,

    /// Skip this task (without failing it) when another task in the same
    /// project has already failed.
    #[serde(default)]
    pub skip_if_project_failed: bool,
}

impl TaskConfig {
    /// Dependency names parsed out of `depends_on`.
    ///
    /// Empty segments (trailing `;`, doubled separators) are dropped.
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.depends_on
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
