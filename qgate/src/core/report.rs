//! Rendering of run results: console summary lines and the Markdown failure
//! report handed to automated fixers.

use std::fmt::Write as _;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use minijinja::{Environment, context};
use serde::Serialize;

use crate::core::checks::CheckKind;
use crate::core::types::{CheckResult, PipelineRun};

const FAILURE_REPORT_TEMPLATE: &str = include_str!("templates/failure_report.md");

static TEMPLATES: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();
    env.add_template("failure_report.md", FAILURE_REPORT_TEMPLATE)
        .expect("failure report template should be valid");
    env
});

/// Failed check context for template rendering.
#[derive(Debug, Clone, Serialize)]
struct FailedCheckContext<'a> {
    name: &'a str,
    advice: Option<&'static str>,
    details: String,
}

impl<'a> FailedCheckContext<'a> {
    fn from_result(result: &'a CheckResult) -> Self {
        let details = result.details().trim_end();
        let details = if details.is_empty() {
            result.error().unwrap_or("(no output)").to_string()
        } else {
            details.to_string()
        };
        Self {
            name: result.name(),
            advice: spec_advice(result.name()),
            details,
        }
    }
}

fn spec_advice(name: &str) -> Option<&'static str> {
    CheckKind::PIPELINE_ORDER
        .into_iter()
        .map(CheckKind::spec)
        .find(|spec| spec.name == name)
        .map(|spec| spec.failure_advice)
}

fn success_message(name: &str) -> Option<&'static str> {
    CheckKind::PIPELINE_ORDER
        .into_iter()
        .map(CheckKind::spec)
        .find(|spec| spec.name == name)
        .map(|spec| spec.success_message)
}

/// Render the Markdown failure report. Only failed checks get a section.
pub fn render_failure_report(run: &PipelineRun) -> Result<String> {
    let failed: Vec<FailedCheckContext<'_>> =
        run.failed().map(FailedCheckContext::from_result).collect();
    let template = TEMPLATES
        .get_template("failure_report.md")
        .context("load failure report template")?;
    let mut rendered = template
        .render(context! {
            failed => failed,
            total => run.results.len(),
        })
        .context("render failure report")?;
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    Ok(rendered)
}

/// Render per-check lines followed by the summary verdict.
///
/// Failed checks are followed by their captured output indented by four
/// spaces, so a reader always sees why a check failed before the verdict.
pub fn render_summary(run: &PipelineRun) -> String {
    let mut out = String::new();
    if run.results.is_empty() {
        out.push_str("No applicable checks for this project\n");
        return out;
    }
    for result in &run.results {
        if result.passed() {
            let message = success_message(result.name()).unwrap_or("passed");
            let _ = writeln!(out, "✅ {}: {}", result.name(), message);
            continue;
        }
        let advice = spec_advice(result.name()).unwrap_or("failed");
        let _ = writeln!(out, "❌ {}: {}", result.name(), advice);
        let details = result.details().trim_end();
        if details.is_empty() {
            if let Some(error) = result.error() {
                let _ = writeln!(out, "    {error}");
            }
        } else {
            for line in details.lines() {
                let _ = writeln!(out, "    {line}");
            }
        }
    }
    let failed = run.failed_count();
    if failed == 0 {
        let _ = writeln!(out, "All {} checks passed", run.results.len());
    } else {
        let _ = writeln!(
            out,
            "{} of {} checks failed",
            failed,
            run.results.len()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing_run() -> PipelineRun {
        PipelineRun::new(vec![
            CheckResult::pass("Build", ""),
            CheckResult::fail("Vet", "main.go:3:2: unreachable code\n", "exit status 1"),
        ])
    }

    #[test]
    fn failure_report_has_header_and_only_failed_sections() {
        let report = render_failure_report(&failing_run()).expect("render");
        assert!(report.starts_with("# Quality Check Failures\n"));
        assert!(report.contains("1 of 2 checks failed."));
        assert!(report.contains("## Vet"));
        assert!(report.contains("main.go:3:2: unreachable code"));
        assert!(!report.contains("## Build"));
    }

    #[test]
    fn failure_report_falls_back_to_error_when_output_is_empty() {
        let run = PipelineRun::new(vec![CheckResult::fail("Build", "", "exit status 2")]);
        let report = render_failure_report(&run).expect("render");
        assert!(report.contains("exit status 2"));
    }

    #[test]
    fn failure_report_is_deterministic() {
        let first = render_failure_report(&failing_run()).expect("render");
        let second = render_failure_report(&failing_run()).expect("render");
        assert_eq!(first, second);
    }

    #[test]
    fn summary_shows_breakdown_before_verdict() {
        let summary = render_summary(&failing_run());
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines[0], "✅ Build: Code compiles");
        assert!(lines[1].starts_with("❌ Vet: "));
        assert_eq!(lines[2], "    main.go:3:2: unreachable code");
        assert_eq!(lines.last().copied(), Some("1 of 2 checks failed"));
    }

    #[test]
    fn summary_for_empty_run() {
        let summary = render_summary(&PipelineRun::default());
        assert_eq!(summary, "No applicable checks for this project\n");
    }
}
