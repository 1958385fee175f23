// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{BuildSet, RawBuildSet};
use crate::errors::Result;

/// Load a build-set file from a given path and return the raw `RawBuildSet`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (environment references, etc.). Use [`load_and_validate`] for
/// that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawBuildSet> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let build_set: RawBuildSet = toml::from_str(&contents)?;

    Ok(build_set)
}

/// Load a build-set file from path and run structural validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for:
///   - unknown environment references,
///   - duplicate tool names across environments,
///   - tasks depending on themselves,
///   - an entirely empty build set.
///
/// Resolving tool and dependency references happens later, when the action
/// graph is built (`graph::build`), so that forward references within a
/// project resolve without a second parsing pass.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<BuildSet> {
    let raw = load_from_path(&path)?;
    let build_set = BuildSet::try_from(raw)?;
    Ok(build_set)
}

/// Helper to resolve a default build-set path.
///
/// Currently this just returns `Parbuild.toml` in the current working
/// directory, but this function exists so you can later:
///
/// - Respect an env var (e.g. `PARBUILD_GRAPH`).
/// - Look for multiple default locations.
pub fn default_graph_path() -> PathBuf {
    PathBuf::from("Parbuild.toml")
}
