//! Tool Invoker
//!
//! Runs one external tool to completion with its standard output redirected
//! into a file, then waits for that file to settle before it is read back.
//!
//! Process exit alone does not prove the output is on disk: the interpreter
//! runs inside a JVM that writes through its own buffers, and the compiler
//! writes its IR file separately from its stdout. [`ToolInvoker::await_output`]
//! therefore applies the configured [`SettleConfig`] policy after every
//! invocation, either a fixed delay or polling until size and mtime stop
//! changing, bounded by `max_wait_ms`.

use std::env;
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use crate::config::{HarnessConfig, SettleConfig, SettleMode};
use crate::errors::ToolInvocationError;

/// Interval between `try_wait` checks while a bounded invocation is running.
const EXIT_POLL: Duration = Duration::from_millis(10);

/// A finished, successful tool run.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub status: ExitStatus,
    /// Standard-error text, which a tool may write even when it exits 0.
    pub stderr: String,
}

#[derive(Debug, Clone)]
pub struct ToolInvoker {
    work_dir: PathBuf,
    timeout: Option<Duration>,
    settle: SettleConfig,
}

impl ToolInvoker {
    pub fn new(work_dir: impl Into<PathBuf>, timeout: Option<Duration>, settle: SettleConfig) -> Self {
        Self {
            work_dir: work_dir.into(),
            timeout,
            settle,
        }
    }

    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(config.work_dir.clone(), config.timeout(), config.settle.clone())
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Run `executable args...` from the work dir with stdout written to
    /// `stdout_target` (created or truncated). Blocks until the process exits.
    ///
    /// Only a zero exit status is returned as `Ok`.
    pub fn invoke(
        &self,
        executable: &str,
        args: &[String],
        stdout_target: &Path,
    ) -> Result<Invocation, ToolInvocationError> {
        let program = self.resolve(executable)?;
        let stdout = File::create(stdout_target).map_err(|source| ToolInvocationError::Spawn {
            executable: executable.to_string(),
            source,
        })?;
        let mut stderr = tempfile::tempfile().map_err(|source| ToolInvocationError::Spawn {
            executable: executable.to_string(),
            source,
        })?;
        let stderr_handle = stderr.try_clone().map_err(|source| ToolInvocationError::Spawn {
            executable: executable.to_string(),
            source,
        })?;

        let mut command = Command::new(&program);
        command
            .args(args)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr_handle));
        log::debug!("running {:?} > {}", command, stdout_target.display());

        let child = command.spawn().map_err(|source| ToolInvocationError::Spawn {
            executable: executable.to_string(),
            source,
        })?;
        let waited = self.wait(child);
        let stderr_text = read_back(&mut stderr);
        if !stderr_text.trim().is_empty() {
            log::debug!("{} stderr: {}", executable, stderr_text.trim());
        }

        let status = match waited {
            Ok(Some(status)) => status,
            Ok(None) => {
                return Err(ToolInvocationError::TimedOut {
                    executable: executable.to_string(),
                    after: self.timeout.unwrap_or_default(),
                    stderr: stderr_text,
                })
            }
            Err(source) => {
                return Err(ToolInvocationError::Spawn {
                    executable: executable.to_string(),
                    source,
                })
            }
        };
        if !status.success() {
            return Err(ToolInvocationError::NonZeroExit {
                executable: executable.to_string(),
                status: status.code(),
                stderr: stderr_text,
            });
        }
        Ok(Invocation {
            status,
            stderr: stderr_text,
        })
    }

    /// Apply the settle policy to `path` and read it. `run` is the invocation
    /// that was supposed to produce it.
    pub fn await_output(&self, path: &Path, run: &Invocation) -> Result<String, ToolInvocationError> {
        let unreadable = |reason: String| ToolInvocationError::OutputUnreadable {
            path: path.to_path_buf(),
            reason,
            status: run.status.code(),
            stderr: run.stderr.clone(),
        };
        match self.settle.mode {
            SettleMode::Fixed => thread::sleep(self.settle.delay()),
            SettleMode::Stable => wait_until_stable(path, &self.settle).map_err(&unreadable)?,
        }
        let bytes = fs::read(path).map_err(|e| unreadable(e.to_string()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Resolve bare names on `PATH` and relative paths against the work dir.
    fn resolve(&self, executable: &str) -> Result<PathBuf, ToolInvocationError> {
        let found = which::which_in(executable, env::var_os("PATH"), &self.work_dir).map_err(|e| {
            log::debug!("could not resolve {}: {}", executable, e);
            ToolInvocationError::NotFound {
                executable: executable.to_string(),
            }
        })?;
        // relative program paths are ambiguous once current_dir is set
        Ok(fs::canonicalize(&found).unwrap_or(found))
    }

    /// `Ok(None)` means the timeout elapsed and the child was killed.
    fn wait(&self, mut child: Child) -> std::io::Result<Option<ExitStatus>> {
        let Some(timeout) = self.timeout else {
            return child.wait().map(Some);
        };
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                log::warn!("killing process {} after {:?}", child.id(), timeout);
                child.kill()?;
                child.wait()?;
                return Ok(None);
            }
            thread::sleep(EXIT_POLL);
        }
    }
}

fn read_back(file: &mut File) -> String {
    let mut bytes = Vec::new();
    if file.seek(SeekFrom::Start(0)).is_err() || file.read_to_end(&mut bytes).is_err() {
        return String::new();
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Observation {
    len: u64,
    modified: Option<SystemTime>,
}

fn observe(path: &Path) -> Option<Observation> {
    let meta = fs::metadata(path).ok()?;
    Some(Observation {
        len: meta.len(),
        modified: meta.modified().ok(),
    })
}

/// Poll until `stable_polls` consecutive observations of `path` agree.
fn wait_until_stable(path: &Path, settle: &SettleConfig) -> Result<(), String> {
    let deadline = Instant::now() + settle.max_wait();
    let mut last = observe(path);
    let mut stable = 0;
    loop {
        if stable >= settle.stable_polls {
            return Ok(());
        }
        if Instant::now() >= deadline {
            log::warn!("{} did not settle within {:?}", path.display(), settle.max_wait());
            return Err(match last {
                None => "file was never created".to_string(),
                Some(_) => format!("file kept changing for {:?}", settle.max_wait()),
            });
        }
        thread::sleep(settle.poll_interval());
        let current = observe(path);
        match (last, current) {
            (Some(prev), Some(now)) if prev == now => stable += 1,
            _ => stable = 0,
        }
        log::trace!("settle {}: {:?} (stable {})", path.display(), current, stable);
        last = current;
    }
}
