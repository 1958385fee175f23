// src/config/validate.rs

use std::collections::BTreeSet;

use crate::config::model::{BuildSet, RawBuildSet};
use crate::errors::{ParbuildError, Result};

impl TryFrom<RawBuildSet> for BuildSet {
    type Error = ParbuildError;

    fn try_from(raw: RawBuildSet) -> std::result::Result<Self, Self::Error> {
        validate_raw_build_set(&raw)?;
        Ok(BuildSet::new_unchecked(raw.environment, raw.project))
    }
}

fn validate_raw_build_set(raw: &RawBuildSet) -> Result<()> {
    ensure_has_tasks(raw)?;
    validate_environment_refs(raw)?;
    validate_tool_names(raw)?;
    validate_self_dependencies(raw)?;
    Ok(())
}

fn ensure_has_tasks(raw: &RawBuildSet) -> Result<()> {
    if raw.project.iter().all(|p| p.task.is_empty()) {
        return Err(ParbuildError::ConfigError(
            "build set must contain at least one [project.task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_environment_refs(raw: &RawBuildSet) -> Result<()> {
    for (idx, project) in raw.project.iter().enumerate() {
        if let Some(env) = &project.env {
            if !raw.environment.contains_key(env) {
                return Err(ParbuildError::UnknownEnvironment {
                    project: project.label(idx),
                    environment: env.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Tools are declared per-environment but resolved through a single global
/// registry, so a tool name may only be declared once across the build set.
fn validate_tool_names(raw: &RawBuildSet) -> Result<()> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();

    for (env_name, env) in raw.environment.iter() {
        for (tool_name, tool) in env.tool.iter() {
            if !seen.insert(tool_name.as_str()) {
                return Err(ParbuildError::ConfigError(format!(
                    "tool '{tool_name}' is declared more than once (duplicate in environment '{env_name}')"
                )));
            }
            if tool.path.trim().is_empty() {
                return Err(ParbuildError::ConfigError(format!(
                    "tool '{tool_name}' in environment '{env_name}' has an empty path"
                )));
            }
        }
    }
    Ok(())
}

fn validate_self_dependencies(raw: &RawBuildSet) -> Result<()> {
    for (idx, project) in raw.project.iter().enumerate() {
        for (name, task) in project.task.iter() {
            if task.dependency_names().any(|dep| dep == name) {
                return Err(ParbuildError::ConfigError(format!(
                    "task '{}' in {} cannot depend on itself",
                    name,
                    project.label(idx)
                )));
            }
        }
    }
    Ok(())
}
