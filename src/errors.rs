// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParbuildError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("task '{task}' references unknown tool '{tool}'")]
    UnknownTool { task: String, tool: String },

    #[error("project '{project}' references unknown environment '{environment}'")]
    UnknownEnvironment {
        project: String,
        environment: String,
    },

    #[error("task '{dependency}' is referenced in project '{project}' but never declared")]
    UndeclaredDependency {
        project: String,
        dependency: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ParbuildError>;
