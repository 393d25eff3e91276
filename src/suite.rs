//! Test Suite Driver
//!
//! Runs every catalog fixture in declaration order and collects one
//! [`Verdict`] each. By default every fixture runs regardless of earlier
//! failures; strict mode stops at the first verdict that did not pass.

use serde::Serialize;

use crate::catalog::{CatalogEntry, FixtureCatalog};
use crate::compare::{compare, Outcome, Verdict};
use crate::config::HarnessConfig;
use crate::errors::SuiteError;
use crate::pipeline::{transition, PipelineRunner, RunState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    ScanAll,
    FailFast,
}

#[derive(Debug, Clone, Default)]
pub struct SuiteOptions {
    /// Case-insensitive substring; non-matching fixtures are skipped.
    pub filter: Option<String>,
    pub fail_fast: bool,
}

impl SuiteOptions {
    pub fn mode(&self) -> RunMode {
        if self.fail_fast {
            RunMode::FailFast
        } else {
            RunMode::ScanAll
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SuiteSummary {
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub skipped: usize,
}

impl SuiteSummary {
    pub fn from_verdicts(verdicts: &[Verdict]) -> Self {
        let mut summary = Self::default();
        for verdict in verdicts {
            match verdict.outcome {
                Outcome::Passed => summary.passed += 1,
                Outcome::Failed => summary.failed += 1,
                Outcome::Errored => summary.errored += 1,
                Outcome::Skipped => summary.skipped += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errored + self.skipped
    }

    /// True when no fixture failed or errored.
    pub fn success(&self) -> bool {
        self.failed == 0 && self.errored == 0
    }
}

pub struct SuiteDriver<'a> {
    runner: PipelineRunner<'a>,
    options: SuiteOptions,
}

impl<'a> SuiteDriver<'a> {
    pub fn new(config: &'a HarnessConfig, options: SuiteOptions) -> Self {
        Self {
            runner: PipelineRunner::new(config),
            options,
        }
    }

    /// Run the whole catalog. In fail-fast mode the first non-passing,
    /// non-skipped verdict ends the run with [`SuiteError::StrictFailure`].
    pub fn run_all(&self, catalog: &FixtureCatalog) -> Result<Vec<Verdict>, SuiteError> {
        let mut verdicts = Vec::with_capacity(catalog.len());
        for entry in catalog.iter() {
            let verdict = self.run_entry(entry);
            if self.options.mode() == RunMode::FailFast
                && matches!(verdict.outcome, Outcome::Failed | Outcome::Errored)
            {
                let failing = Box::new(verdict.clone());
                verdicts.push(verdict);
                return Err(SuiteError::StrictFailure {
                    verdict: failing,
                    completed: verdicts,
                });
            }
            verdicts.push(verdict);
        }
        Ok(verdicts)
    }

    /// Run (or skip) a single catalog entry.
    pub fn run_entry(&self, entry: &CatalogEntry) -> Verdict {
        let name = &entry.fixture.name;
        let expected = &entry.expected.lines;
        if let Some(reason) = skip_reason(entry, self.options.filter.as_deref()) {
            transition(name, RunState::Done(Outcome::Skipped));
            return Verdict::skipped(name, expected, reason);
        }

        transition(name, RunState::Pending);
        let verdict = match self.runner.run(&entry.fixture) {
            Ok(captured) => {
                transition(name, RunState::Comparing);
                compare(name, &captured.lines, expected)
            }
            Err(error) => {
                log::warn!("[{}] {}", name, error.detail());
                Verdict::errored(name, expected, &error)
            }
        };
        transition(name, RunState::Done(verdict.outcome));
        verdict
    }
}

/// Why an entry should not run, if it should not.
pub fn skip_reason(entry: &CatalogEntry, filter: Option<&str>) -> Option<String> {
    if entry.skip {
        return Some("Marked 'skip'".to_string());
    }
    if let Some(filter) = filter {
        let filter = filter.to_lowercase();
        if !entry.fixture.name.to_lowercase().contains(&filter) {
            return Some(format!("Filtered out by substring: {}", filter));
        }
    }
    None
}
