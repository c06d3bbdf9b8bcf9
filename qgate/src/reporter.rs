//! Result reporting: console output plus the failure artifact lifecycle.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::core::report::{render_failure_report, render_summary};
use crate::core::types::PipelineRun;
use crate::io::artifact::{artifact_path, remove_artifact, write_artifact};

/// What happened to the failure artifact after reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// At least one check failed; the artifact holds this run's report.
    ArtifactWritten(PathBuf),
    /// Every check passed and a stale artifact was deleted.
    ArtifactRemoved(PathBuf),
    /// Every check passed and there was no artifact to delete.
    Clean,
}

/// Renders a finished run and keeps the failure artifact in sync with it.
#[derive(Debug, Clone)]
pub struct Reporter {
    artifact_path: PathBuf,
}

impl Reporter {
    pub fn new(project_dir: &Path) -> Self {
        Self {
            artifact_path: artifact_path(project_dir),
        }
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    /// Sync the failure artifact with `run`, then write the per-check
    /// breakdown and verdict to `sink`.
    ///
    /// The artifact is updated even when `sink` fails, so it always reflects
    /// the latest completed run.
    #[instrument(skip_all, fields(artifact = %self.artifact_path.display()))]
    pub fn report<W: Write>(&self, run: &PipelineRun, sink: &mut W) -> Result<ReportOutcome> {
        let outcome = self.sync_artifact(run);
        let printed = write_summary(run, sink);
        let outcome = outcome?;
        printed?;
        Ok(outcome)
    }

    fn sync_artifact(&self, run: &PipelineRun) -> Result<ReportOutcome> {
        if !run.passed() {
            let report = render_failure_report(run)?;
            write_artifact(&self.artifact_path, &report)?;
            info!(failed = run.failed_count(), "failure report written");
            return Ok(ReportOutcome::ArtifactWritten(self.artifact_path.clone()));
        }

        if remove_artifact(&self.artifact_path)? {
            info!("stale failure report removed");
            Ok(ReportOutcome::ArtifactRemoved(self.artifact_path.clone()))
        } else {
            Ok(ReportOutcome::Clean)
        }
    }
}

fn write_summary<W: Write>(run: &PipelineRun, sink: &mut W) -> Result<()> {
    sink.write_all(render_summary(run).as_bytes())
        .context("write report output")?;
    sink.flush().context("flush report output")
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::{self, ErrorKind};

    use super::*;
    use crate::core::types::CheckResult;

    fn failing(details: &str) -> PipelineRun {
        PipelineRun::new(vec![CheckResult::fail("Build", details, "exit status 1")])
    }

    fn passing() -> PipelineRun {
        PipelineRun::new(vec![
            CheckResult::pass("Build", ""),
            CheckResult::pass("Vet", ""),
        ])
    }

    #[test]
    fn failure_writes_artifact_and_output() {
        let temp = tempfile::tempdir().expect("tempdir");
        let reporter = Reporter::new(temp.path());
        let mut out = Vec::new();

        let outcome = reporter.report(&failing("undefined: x"), &mut out).expect("report");

        assert_eq!(
            outcome,
            ReportOutcome::ArtifactWritten(temp.path().join("QUALITY_FAILURES.md"))
        );
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("❌ Build"));
        let artifact = fs::read_to_string(reporter.artifact_path()).expect("artifact");
        assert!(artifact.contains("undefined: x"));
    }

    #[test]
    fn repeated_failures_overwrite_artifact() {
        let temp = tempfile::tempdir().expect("tempdir");
        let reporter = Reporter::new(temp.path());

        reporter.report(&failing("first"), &mut Vec::new()).expect("first");
        reporter.report(&failing("second"), &mut Vec::new()).expect("second");

        let artifact = fs::read_to_string(reporter.artifact_path()).expect("artifact");
        assert!(artifact.contains("second"));
        assert!(!artifact.contains("first"));
        assert_eq!(artifact.matches("# Quality Check Failures").count(), 1);
    }

    #[test]
    fn success_removes_stale_artifact() {
        let temp = tempfile::tempdir().expect("tempdir");
        let reporter = Reporter::new(temp.path());
        fs::write(reporter.artifact_path(), "stale").expect("stale");

        let first = reporter.report(&passing(), &mut Vec::new()).expect("first");
        let second = reporter.report(&passing(), &mut Vec::new()).expect("second");

        assert_eq!(
            first,
            ReportOutcome::ArtifactRemoved(reporter.artifact_path().to_path_buf())
        );
        assert_eq!(second, ReportOutcome::Clean);
        assert!(!reporter.artifact_path().exists());
    }

    #[test]
    fn empty_run_counts_as_clean() {
        let temp = tempfile::tempdir().expect("tempdir");
        let reporter = Reporter::new(temp.path());
        let mut out = Vec::new();

        let outcome = reporter
            .report(&PipelineRun::default(), &mut out)
            .expect("report");

        assert_eq!(outcome, ReportOutcome::Clean);
        assert!(String::from_utf8(out).expect("utf8").contains("No applicable checks"));
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn closed_sink_still_removes_stale_artifact() {
        let temp = tempfile::tempdir().expect("tempdir");
        let reporter = Reporter::new(temp.path());
        fs::write(reporter.artifact_path(), "stale").expect("stale");

        let err = reporter
            .report(&passing(), &mut ClosedPipe)
            .expect_err("closed sink");

        assert!(err.to_string().contains("write report output"));
        assert!(!reporter.artifact_path().exists());
    }

    #[test]
    fn closed_sink_still_writes_failure_artifact() {
        let temp = tempfile::tempdir().expect("tempdir");
        let reporter = Reporter::new(temp.path());
        fs::write(reporter.artifact_path(), "stale").expect("stale");

        reporter
            .report(&failing("undefined: y"), &mut ClosedPipe)
            .expect_err("closed sink");

        let artifact = fs::read_to_string(reporter.artifact_path()).expect("artifact");
        assert!(artifact.contains("undefined: y"));
        assert!(!artifact.contains("stale"));
    }
}
