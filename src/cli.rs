// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! NOTE: this expects `clap` to be built with the `derive` feature, e.g.:
//! `clap = { version = "4.5.53", features = ["derive"] }` in `Cargo.toml`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `parbuild`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "parbuild",
    version,
    about = "Run a build-action graph with bounded parallelism.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the build-set description (TOML).
    ///
    /// Default: `Parbuild.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Parbuild.toml")]
    pub graph: String,

    /// Maximum number of concurrently executing actions.
    ///
    /// Defaults to the number of available processing units.
    #[arg(long, short = 'j', value_name = "N")]
    pub workers: Option<usize>,

    /// Stop launching new actions after the first failure.
    ///
    /// Actions already executing are allowed to finish.
    #[arg(long)]
    pub stop_on_error: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PARBUILD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the action graph, but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
