// src/config/mod.rs

//! Build-set loading and validation for parbuild.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a build-set file from disk (`loader.rs`).
//! - Validate structural invariants like environment references (`validate.rs`).
//!
//! Dependency and tool *resolution* is deliberately not done here; the graph
//! builder (`graph::build`) creates actions lazily on first reference so that
//! forward references resolve in a single pass.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_graph_path, load_and_validate, load_from_path};
pub use model::{BuildSet, EnvironmentConfig, ProjectConfig, RawBuildSet, TaskConfig, ToolConfig};
