//! Pipeline Runner
//!
//! Drives one fixture through the toolchain:
//!
//! - `functional` / `basic`: compiler writes `<stem>.<ir>` next to the source,
//!   then the interpreter runs on it with stdout captured.
//! - `warnings`: compiler only, with its own stdout captured.
//!
//! Captures live in a fresh temporary directory per run, so no two runs share
//! a capture path and the directory is removed on every exit path when the
//! [`tempfile::TempDir`] guard drops.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::catalog::{Category, Fixture};
use crate::compare::Outcome;
use crate::config::HarnessConfig;
use crate::errors::{PipelineError, Stage};
use crate::invoker::ToolInvoker;
use crate::normalize::normalize;

const CAPTURE_FILE: &str = "capture.txt";
const COMPILE_LOG: &str = "compile.log";

/// Text read back from a tool and its normalized payload. Dropped after comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    pub raw_text: String,
    pub lines: Vec<String>,
}

/// Per-fixture progress, logged as the run advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Pending,
    Invoking(Stage),
    Capturing,
    Normalizing,
    Comparing,
    Done(Outcome),
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Pending => write!(f, "pending"),
            RunState::Invoking(stage) => write!(f, "invoking({})", stage),
            RunState::Capturing => write!(f, "capturing"),
            RunState::Normalizing => write!(f, "normalizing"),
            RunState::Comparing => write!(f, "comparing"),
            RunState::Done(outcome) => write!(f, "{:?}", outcome),
        }
    }
}

pub(crate) fn transition(fixture: &str, state: RunState) {
    log::info!("[{}] {}", fixture, state);
}

pub struct PipelineRunner<'a> {
    config: &'a HarnessConfig,
    invoker: ToolInvoker,
}

impl<'a> PipelineRunner<'a> {
    pub fn new(config: &'a HarnessConfig) -> Self {
        Self {
            config,
            invoker: ToolInvoker::from_config(config),
        }
    }

    pub fn run(&self, fixture: &Fixture) -> Result<CapturedOutput, PipelineError> {
        let scratch = tempfile::Builder::new()
            .prefix("decaf-harness-")
            .tempdir()
            .map_err(|source| PipelineError::Workspace {
                dir: std::env::temp_dir(),
                source,
            })?;
        let capture = scratch.path().join(CAPTURE_FILE);

        let raw_text = match fixture.category {
            Category::WarningsOnly => self.compile(fixture, &capture)?,
            Category::Functional | Category::Basic => {
                let compile_log = scratch.path().join(COMPILE_LOG);
                self.compile(fixture, &compile_log)?;
                self.interpret(fixture, &capture)?
            }
        };

        transition(&fixture.name, RunState::Normalizing);
        let lines = normalize(&raw_text, self.config.header_lines);
        release(scratch);
        Ok(CapturedOutput { raw_text, lines })
    }

    /// Run the compiler with stdout into `stdout_target` and return that stdout.
    /// Functional runs additionally wait for the IR artifact to settle.
    fn compile(&self, fixture: &Fixture, stdout_target: &Path) -> Result<String, PipelineError> {
        let stage = Stage::Compile;
        transition(&fixture.name, RunState::Invoking(stage));
        let compiler = &self.config.compiler;
        let mut args = compiler.args.clone();
        if fixture.category != Category::Basic {
            args.push(compiler.mode_token.clone());
            args.push(self.config.source_path(&fixture.stem));
        }
        let tool_error = |source| PipelineError::Tool { stage, source };

        let ir = self.ir_artifact(fixture);
        if fixture.category.interprets() {
            clear_stale(&ir)?;
        }
        let run = self
            .invoker
            .invoke(&compiler.program, &args, stdout_target)
            .map_err(tool_error)?;
        transition(&fixture.name, RunState::Capturing);
        let stdout = self
            .invoker
            .await_output(stdout_target, &run)
            .map_err(tool_error)?;

        if fixture.category.interprets() {
            let ir_text = self.invoker.await_output(&ir, &run).map_err(tool_error)?;
            log::debug!(
                "[{}] {} ready ({} lines)",
                fixture.name,
                ir.display(),
                ir_text.lines().count()
            );
        }
        Ok(stdout)
    }

    fn interpret(&self, fixture: &Fixture, capture: &Path) -> Result<String, PipelineError> {
        let stage = Stage::Interpret;
        transition(&fixture.name, RunState::Invoking(stage));
        let interpreter = &self.config.interpreter;
        let mut args = interpreter.args.clone();
        args.push(self.config.ir_path(&fixture.stem));
        let tool_error = |source| PipelineError::Tool { stage, source };

        let run = self
            .invoker
            .invoke(&interpreter.program, &args, capture)
            .map_err(tool_error)?;
        transition(&fixture.name, RunState::Capturing);
        self.invoker.await_output(capture, &run).map_err(tool_error)
    }

    fn ir_artifact(&self, fixture: &Fixture) -> PathBuf {
        self.invoker
            .work_dir()
            .join(self.config.ir_path(&fixture.stem))
    }
}

/// Remove an IR artifact left by an earlier run. A compiler that fails to
/// parse exits 0 without writing one, so a leftover would be read as fresh.
fn clear_stale(ir: &Path) -> Result<(), PipelineError> {
    match fs::remove_file(ir) {
        Ok(()) => {
            log::debug!("removed stale {}", ir.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(PipelineError::Workspace {
            dir: ir.to_path_buf(),
            source,
        }),
    }
}

fn release(scratch: TempDir) {
    let path = scratch.path().to_path_buf();
    if let Err(e) = scratch.close() {
        log::warn!("failed to remove {}: {}", path.display(), e);
    }
}
