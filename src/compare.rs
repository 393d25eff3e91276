//! Golden comparison and the per-fixture [`Verdict`].

use serde::Serialize;

use crate::errors::{ComparisonMismatch, PipelineError};

/// Terminal state of one fixture run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Tool ran and its payload matched the golden lines exactly.
    Passed,
    /// Tool ran but its payload diverged.
    Failed,
    /// A tool could not be run or left no readable output.
    Errored,
    /// Not run (marked `skip` or filtered out).
    Skipped,
}

/// Result of one fixture. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub fixture_name: String,
    pub outcome: Outcome,
    pub passed: bool,
    pub actual: Vec<String>,
    pub expected: Vec<String>,
    pub message: String,
}

impl Verdict {
    pub fn errored(fixture_name: &str, expected: &[String], error: &PipelineError) -> Self {
        Self {
            fixture_name: fixture_name.to_string(),
            outcome: Outcome::Errored,
            passed: false,
            actual: Vec::new(),
            expected: expected.to_vec(),
            message: error.detail(),
        }
    }

    pub fn skipped(fixture_name: &str, expected: &[String], reason: String) -> Self {
        Self {
            fixture_name: fixture_name.to_string(),
            outcome: Outcome::Skipped,
            passed: false,
            actual: Vec::new(),
            expected: expected.to_vec(),
            message: reason,
        }
    }

    /// The mismatch behind a `Failed` verdict.
    pub fn mismatch(&self) -> Option<ComparisonMismatch> {
        match self.outcome {
            Outcome::Failed => Some(ComparisonMismatch {
                fixture: self.fixture_name.clone(),
                actual: self.actual.clone(),
                expected: self.expected.clone(),
            }),
            _ => None,
        }
    }
}

/// Strict ordered comparison: same length, same strings at every position.
/// No numeric tolerance; `"3"` and `"3.0"` differ.
pub fn compare(fixture_name: &str, actual: &[String], expected: &[String]) -> Verdict {
    if actual == expected {
        return Verdict {
            fixture_name: fixture_name.to_string(),
            outcome: Outcome::Passed,
            passed: true,
            actual: actual.to_vec(),
            expected: expected.to_vec(),
            message: String::new(),
        };
    }
    let mismatch = ComparisonMismatch {
        fixture: fixture_name.to_string(),
        actual: actual.to_vec(),
        expected: expected.to_vec(),
    };
    Verdict {
        fixture_name: fixture_name.to_string(),
        outcome: Outcome::Failed,
        passed: false,
        message: mismatch.to_string(),
        actual: mismatch.actual,
        expected: mismatch.expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn equal_sequences_pass() {
        let v = compare("t1", &strings(&["6"]), &strings(&["6"]));
        assert!(v.passed);
        assert_eq!(v.outcome, Outcome::Passed);
        assert!(v.message.is_empty());
        assert!(v.mismatch().is_none());
    }

    #[test]
    fn shorter_actual_is_a_mismatch() {
        let v = compare("t", &strings(&["1", "2"]), &strings(&["1", "2", "3"]));
        assert!(!v.passed);
        assert_eq!(v.outcome, Outcome::Failed);
    }

    #[test]
    fn extra_trailing_element_is_a_mismatch() {
        let v = compare("t", &strings(&["1", "2", "3"]), &strings(&["1", "2"]));
        assert_eq!(v.outcome, Outcome::Failed);
    }

    #[test]
    fn order_matters() {
        let v = compare("t", &strings(&["2", "1"]), &strings(&["1", "2"]));
        assert_eq!(v.outcome, Outcome::Failed);
    }

    #[test]
    fn no_numeric_tolerance() {
        let v = compare("t7", &strings(&["8", "0.0"]), &strings(&["8.0", "0.0"]));
        assert_eq!(v.outcome, Outcome::Failed);
    }

    #[test]
    fn message_shows_both_sequences_comma_joined() {
        let v = compare("t3", &strings(&["0", "1"]), &strings(&["1"]));
        assert_eq!(v.message, "got:\t\t0,1\nexpected:\t1");
        let mismatch = v.mismatch().unwrap();
        assert_eq!(mismatch.actual, strings(&["0", "1"]));
        assert_eq!(mismatch.expected, strings(&["1"]));
    }
}
