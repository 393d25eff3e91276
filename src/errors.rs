//! Decaf Harness Error Handling
//!
//! Every failure the harness can surface lives here, grouped by the layer that
//! produces it:
//!
//! - [`ToolInvocationError`]: an external tool could not be run, exited badly,
//!   or left no readable output behind.
//! - [`PipelineError`]: a tool failure tagged with the pipeline stage it came from.
//! - [`ComparisonMismatch`]: the tool ran, but its payload diverged from the golden lines.
//! - [`CatalogError`] / [`ConfigError`]: problems with the authored inputs.
//! - [`SuiteError`]: strict-mode termination of a suite run.
//!
//! All error enums derive `miette::Diagnostic` so the CLI can render them with codes and help.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

use crate::compare::Verdict;

// ============================================================================
// TOOL INVOCATION
// ============================================================================

/// Failure to run one external tool to completion with readable output.
#[derive(Error, Diagnostic, Debug)]
pub enum ToolInvocationError {
    #[error("executable `{executable}` was not found")]
    #[diagnostic(
        code(decaf_harness::invoke::not_found),
        help("check the `program` entry in the harness config, or build the tool first")
    )]
    NotFound { executable: String },

    #[error("failed to start `{executable}`: {source}")]
    #[diagnostic(code(decaf_harness::invoke::spawn))]
    Spawn {
        executable: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{executable}` exited with {}", describe_status(.status))]
    #[diagnostic(code(decaf_harness::invoke::exit_status))]
    NonZeroExit {
        executable: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("`{executable}` did not finish within {after:?}")]
    #[diagnostic(
        code(decaf_harness::invoke::timeout),
        help("raise `timeout_ms` in the harness config if the tool is just slow")
    )]
    TimedOut {
        executable: String,
        after: Duration,
        stderr: String,
    },

    #[error("output `{}` is unreadable: {reason}", .path.display())]
    #[diagnostic(
        code(decaf_harness::invoke::output_unreadable),
        help("the tool exited but never produced this file; see the `settle` config")
    )]
    OutputUnreadable {
        path: PathBuf,
        reason: String,
        status: Option<i32>,
        stderr: String,
    },
}

impl ToolInvocationError {
    /// Exit status of the process, when it ran to an exit at all.
    pub fn exit_status(&self) -> Option<i32> {
        match self {
            Self::NonZeroExit { status, .. } | Self::OutputUnreadable { status, .. } => *status,
            Self::NotFound { .. } | Self::Spawn { .. } | Self::TimedOut { .. } => None,
        }
    }

    /// Standard-error text captured from the process (empty if none was captured).
    pub fn stderr(&self) -> &str {
        match self {
            Self::NonZeroExit { stderr, .. }
            | Self::TimedOut { stderr, .. }
            | Self::OutputUnreadable { stderr, .. } => stderr,
            Self::NotFound { .. } | Self::Spawn { .. } => "",
        }
    }
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Pipeline stage that a tool failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Compile,
    Interpret,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Compile => write!(f, "compile"),
            Stage::Interpret => write!(f, "interpret"),
        }
    }
}

/// Failure of one fixture's pipeline run. Always becomes an `Errored` verdict.
#[derive(Error, Diagnostic, Debug)]
pub enum PipelineError {
    #[error("{stage} stage failed")]
    #[diagnostic(code(decaf_harness::pipeline::stage))]
    Tool {
        stage: Stage,
        #[source]
        source: ToolInvocationError,
    },

    #[error("could not prepare a capture directory in `{}`", .dir.display())]
    #[diagnostic(code(decaf_harness::pipeline::workspace))]
    Workspace {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Tool { stage, .. } => Some(*stage),
            Self::Workspace { .. } => None,
        }
    }

    /// One-line rendering including the tool failure and any stderr text.
    pub fn detail(&self) -> String {
        match self {
            Self::Tool { stage, source } => {
                let stderr = source.stderr().trim();
                if stderr.is_empty() {
                    format!("{} stage failed: {}", stage, source)
                } else {
                    format!("{} stage failed: {} (stderr: {})", stage, source, stderr)
                }
            }
            Self::Workspace { source, .. } => format!("{}: {}", self, source),
        }
    }
}

// ============================================================================
// COMPARISON
// ============================================================================

/// Normalized output that diverged from its golden lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonMismatch {
    pub fixture: String,
    pub actual: Vec<String>,
    pub expected: Vec<String>,
}

impl fmt::Display for ComparisonMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "got:\t\t{}", self.actual.join(","))?;
        write!(f, "expected:\t{}", self.expected.join(","))
    }
}

impl std::error::Error for ComparisonMismatch {}

// ============================================================================
// AUTHORED INPUTS
// ============================================================================

#[derive(Error, Diagnostic, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog `{}`", .path.display())]
    #[diagnostic(code(decaf_harness::catalog::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog `{}` is not valid YAML: {source}", .path.display())]
    #[diagnostic(code(decaf_harness::catalog::yaml))]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to walk catalog directory: {0}")]
    #[diagnostic(code(decaf_harness::catalog::walk))]
    Walk(#[from] walkdir::Error),

    #[error("fixture name must not be empty (entry {index})")]
    #[diagnostic(code(decaf_harness::catalog::empty_name))]
    EmptyName { index: usize },

    #[error("fixture `{name}` is declared more than once")]
    #[diagnostic(code(decaf_harness::catalog::duplicate))]
    Duplicate { name: String },

    #[error("{category} fixture `{name}` breaks the numbering: expected number {expected}")]
    #[diagnostic(
        code(decaf_harness::catalog::numbering),
        help("numbered fixtures must run 1, 2, 3, ... in declaration order within a category")
    )]
    NonContiguous {
        category: String,
        name: String,
        expected: u32,
    },
}

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("failed to read config `{}`", .path.display())]
    #[diagnostic(code(decaf_harness::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config `{}` is not valid YAML: {source}", .path.display())]
    #[diagnostic(code(decaf_harness::config::yaml))]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    #[diagnostic(code(decaf_harness::config::invalid))]
    Invalid(String),
}

// ============================================================================
// SUITE
// ============================================================================

#[derive(Error, Diagnostic, Debug)]
pub enum SuiteError {
    #[error("fixture `{}` did not pass; stopping (fail-fast)", .verdict.fixture_name)]
    #[diagnostic(code(decaf_harness::suite::strict))]
    StrictFailure {
        verdict: Box<Verdict>,
        /// Every verdict produced before and including the failing one.
        completed: Vec<Verdict>,
    },
}
