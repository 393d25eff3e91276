//! Harness configuration.
//!
//! The header-line count, file-naming convention, tool command lines and
//! settle policy all travel in one [`HarnessConfig`] value handed to the
//! pipeline, so a new tool version only needs a new `harness.yaml`.
//!
//! ```yaml
//! work_dir: .
//! compiler:
//!   program: ./build/DecafComp
//!   args: []
//!   mode_token: asdf
//! interpreter:
//!   program: java
//!   args: ["-cp", "./JTacInt.jar", "is.ru.tacint.TacBlock"]
//! source_extension: decaf
//! ir_extension: tac
//! header_lines: 2
//! settle:
//!   mode: stable
//!   poll_interval_ms: 50
//!   stable_polls: 2
//!   max_wait_ms: 2000
//! timeout_ms: 30000
//! fail_fast: false
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::errors::ConfigError;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "harness.yaml";

/// Number of banner lines the Decaf toolchain prints before any payload.
pub const DEFAULT_HEADER_LINES: usize = 2;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Directory both tools are launched from; fixture stems are relative to it.
    pub work_dir: PathBuf,
    pub compiler: CompilerConfig,
    pub interpreter: InterpreterConfig,
    pub source_extension: String,
    pub ir_extension: String,
    /// Leading lines of every capture that belong to the tool banner.
    pub header_lines: usize,
    pub settle: SettleConfig,
    /// Upper bound on a single tool invocation; `0` waits forever.
    pub timeout_ms: u64,
    pub fail_fast: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            compiler: CompilerConfig::default(),
            interpreter: InterpreterConfig::default(),
            source_extension: "decaf".to_string(),
            ir_extension: "tac".to_string(),
            header_lines: DEFAULT_HEADER_LINES,
            settle: SettleConfig::default(),
            timeout_ms: 30_000,
            fail_fast: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    pub program: String,
    /// Arguments placed before the mode token, e.g. a script for an interpreter `program`.
    pub args: Vec<String>,
    /// First argument; anything other than `-s`/`-a` keeps the compiler quiet
    /// apart from its banner and warnings.
    pub mode_token: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: "./build/DecafComp".to_string(),
            args: Vec::new(),
            mode_token: "asdf".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct InterpreterConfig {
    pub program: String,
    /// Arguments placed before the IR file path.
    pub args: Vec<String>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            program: "java".to_string(),
            args: vec![
                "-cp".to_string(),
                "./JTacInt.jar".to_string(),
                "is.ru.tacint.TacBlock".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SettleMode {
    /// Sleep for `delay_ms` after the process exits.
    Fixed,
    /// Poll the output until its size and mtime hold still.
    Stable,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SettleConfig {
    pub mode: SettleMode,
    pub delay_ms: u64,
    pub poll_interval_ms: u64,
    /// Consecutive identical observations required before the file counts as settled.
    pub stable_polls: u32,
    pub max_wait_ms: u64,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            mode: SettleMode::Stable,
            delay_ms: 200,
            poll_interval_ms: 50,
            stable_polls: 2,
            max_wait_ms: 2_000,
        }
    }
}

impl SettleConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}

impl HarnessConfig {
    /// Load a config file. Missing keys fall back to the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: HarnessConfig =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else `harness.yaml` in the current directory if it
    /// exists, else the defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    log::debug!("using config {}", fallback.display());
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.compiler.program.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "compiler.program must not be empty".to_string(),
            ));
        }
        if self.interpreter.program.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "interpreter.program must not be empty".to_string(),
            ));
        }
        if self.source_extension.is_empty() || self.ir_extension.is_empty() {
            return Err(ConfigError::Invalid(
                "source_extension and ir_extension must not be empty".to_string(),
            ));
        }
        if self.settle.mode == SettleMode::Stable && self.settle.stable_polls == 0 {
            return Err(ConfigError::Invalid(
                "settle.stable_polls must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.timeout_ms))
        }
    }

    /// `<stem>.<source_extension>`
    pub fn source_path(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.source_extension)
    }

    /// `<stem>.<ir_extension>`, the artifact the compiler leaves next to its input.
    pub fn ir_path(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.ir_extension)
    }
}
