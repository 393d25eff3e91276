//! Defines the command-line arguments and subcommands for the harness CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "decaf-harness",
    version,
    about = "Golden-output regression harness for the Decaf compiler and TAC interpreter."
)]
pub struct HarnessArgs {
    /// Harness config file (YAML). Defaults to ./harness.yaml when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log pipeline progress at debug level (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run every fixture through the toolchain and compare against golden output.
    Run {
        /// Catalog file or directory of catalog files. Defaults to the built-in suite.
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Only run fixtures whose name contains this substring (case-insensitive).
        #[arg(short, long)]
        filter: Option<String>,
        /// Stop at the first fixture that fails or errors.
        #[arg(long)]
        fail_fast: bool,
        /// Directory the tools are launched from.
        #[arg(long)]
        work_dir: Option<PathBuf>,
        /// Override the number of banner lines skipped in every capture.
        #[arg(long)]
        header_lines: Option<usize>,
        /// Override the per-invocation timeout in milliseconds (0 disables).
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Report format.
        #[arg(long, value_enum, default_value_t = ReportFormat::Human)]
        format: ReportFormat,
    },
    /// List the fixtures of a catalog in execution order.
    List {
        /// Catalog file or directory of catalog files. Defaults to the built-in suite.
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Print the normalized payload lines of a capture file.
    Normalize {
        /// The capture file to normalize.
        #[arg(required = true)]
        file: PathBuf,
        /// Override the number of banner lines to skip.
        #[arg(long)]
        header_lines: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Human,
    Json,
}
