//! Result types shared by the orchestrator, reporter and entry points.
//!
//! These types carry no I/O and are deterministic: the same run yields the
//! same serialized form.

use std::error::Error;
use std::fmt;

use serde::Serialize;

/// Outcome of one executed check.
///
/// `passed == error.is_none()` holds for every value; the only constructors
/// are [`CheckResult::pass`] and [`CheckResult::fail`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    name: String,
    passed: bool,
    details: String,
    #[serde(skip)]
    error: Option<String>,
}

impl CheckResult {
    pub fn pass(name: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            details: details.into(),
            error: None,
        }
    }

    pub fn fail(
        name: impl Into<String>,
        details: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            passed: false,
            details: details.into(),
            error: Some(error.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Captured combined output (may be empty).
    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Ordered results of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PipelineRun {
    pub results: Vec<CheckResult>,
}

impl PipelineRun {
    pub fn new(results: Vec<CheckResult>) -> Self {
        Self { results }
    }

    pub fn failed(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|result| !result.passed())
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    pub fn passed(&self) -> bool {
        self.failed_count() == 0
    }

    /// Aggregate pipeline-level signal: `Err` iff at least one check failed.
    pub fn ensure_passed(&self) -> Result<(), ChecksFailed> {
        let failed: Vec<String> = self.failed().map(|r| r.name().to_string()).collect();
        if failed.is_empty() {
            Ok(())
        } else {
            Err(ChecksFailed {
                failed,
                total: self.results.len(),
            })
        }
    }
}

/// One or more checks reported findings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksFailed {
    pub failed: Vec<String>,
    pub total: usize,
}

impl fmt::Display for ChecksFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} checks failed: {}",
            self.failed.len(),
            self.total,
            self.failed.join(", ")
        )
    }
}

impl Error for ChecksFailed {}

/// The caller cancelled the run while it was in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("quality run cancelled")
    }
}

impl Error for Cancelled {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_keep_passed_and_error_consistent() {
        let ok = CheckResult::pass("Build", "");
        assert!(ok.passed());
        assert!(ok.error().is_none());

        let bad = CheckResult::fail("Vet", "x.go:1: bad", "exit status 1");
        assert!(!bad.passed());
        assert_eq!(bad.error(), Some("exit status 1"));
    }

    #[test]
    fn serializes_without_error_field() {
        let run = PipelineRun::new(vec![CheckResult::fail("Build", "boom", "exit status 2")]);
        let json = serde_json::to_value(&run).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!([{ "name": "Build", "passed": false, "details": "boom" }])
        );
    }

    #[test]
    fn ensure_passed_lists_failed_checks() {
        let run = PipelineRun::new(vec![
            CheckResult::pass("Build", ""),
            CheckResult::fail("Vet", "", "exit status 1"),
            CheckResult::fail("DeepLint", "", "exit status 1"),
        ]);
        let err = run.ensure_passed().expect_err("two failures");
        assert_eq!(err.failed, vec!["Vet", "DeepLint"]);
        assert_eq!(err.to_string(), "2 of 3 checks failed: Vet, DeepLint");
    }

    #[test]
    fn empty_run_passes() {
        let run = PipelineRun::default();
        assert!(run.passed());
        assert!(run.ensure_passed().is_ok());
    }
}
