//! Step executor abstraction for running one external check.
//!
//! The [`StepRunner`] trait decouples pipeline orchestration from process
//! spawning. Tests use scripted runners that return predetermined outputs
//! without touching `PATH`.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::io::process::{CancelToken, run_command};

/// Parameters for one step invocation.
#[derive(Debug, Clone)]
pub struct StepInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub workdir: PathBuf,
    pub timeout: Duration,
    /// Captured output beyond this many bytes per stream is dropped.
    pub output_limit_bytes: usize,
    /// `(needle, replacement)` pairs applied to the captured output, in order.
    ///
    /// Any step that receives a generated file path must list that path here
    /// so reports never mention per-run names. Runners apply the substitutions
    /// before returning [`StepOutput::Completed`].
    pub redactions: Vec<(String, String)>,
    pub cancel: CancelToken,
}

impl StepInvocation {
    /// Render as a shell-like command line for logs.
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    pub fn redact(&self, text: &str) -> String {
        self.redactions
            .iter()
            .fold(text.to_string(), |acc, (needle, replacement)| {
                if needle.is_empty() {
                    acc
                } else {
                    acc.replace(needle.as_str(), replacement)
                }
            })
    }
}

/// What happened when a step ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutput {
    /// The tool ran to completion. A non-zero exit is `success: false`.
    Completed {
        success: bool,
        exit_code: Option<i32>,
        output: String,
    },
    /// The tool is not on the execution path; nothing was spawned.
    ToolMissing,
    /// The tool exceeded its time budget and was killed.
    TimedOut { output: String },
}

/// Abstraction over check execution backends.
pub trait StepRunner {
    /// Run one step. `Err` is reserved for system errors and cancellation;
    /// a tool reporting findings is an `Ok` value.
    fn run(&self, invocation: &StepInvocation) -> Result<StepOutput>;
}

impl<R: StepRunner + ?Sized> StepRunner for &R {
    fn run(&self, invocation: &StepInvocation) -> Result<StepOutput> {
        (**self).run(invocation)
    }
}

/// Step runner that spawns real processes found on `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessStepRunner;

impl StepRunner for ProcessStepRunner {
    #[instrument(skip_all, fields(program = %invocation.program, timeout_secs = invocation.timeout.as_secs()))]
    fn run(&self, invocation: &StepInvocation) -> Result<StepOutput> {
        let program = match which::which(&invocation.program) {
            Ok(path) => path,
            Err(err) => {
                warn!(err = %err, "tool not found in PATH");
                return Ok(StepOutput::ToolMissing);
            }
        };

        info!(command = %invocation.command_line(), "running step");
        let mut cmd = Command::new(program);
        cmd.args(&invocation.args).current_dir(&invocation.workdir);

        let output = run_command(
            cmd,
            invocation.timeout,
            invocation.output_limit_bytes,
            &invocation.cancel,
        )
        .with_context(|| format!("run {}", invocation.program))?;

        let text = invocation.redact(&output.combined());
        if output.timed_out {
            return Ok(StepOutput::TimedOut { output: text });
        }

        debug!(exit_code = ?output.status.code(), "step finished");
        Ok(StepOutput::Completed {
            success: output.status.success(),
            exit_code: output.status.code(),
            output: text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(program: &str, args: &[&str]) -> StepInvocation {
        StepInvocation {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            workdir: std::env::temp_dir(),
            timeout: Duration::from_secs(10),
            output_limit_bytes: 10_000,
            redactions: Vec::new(),
            cancel: CancelToken::new(),
        }
    }

    #[test]
    fn redact_replaces_in_order() {
        let mut inv = invocation("golangci-lint", &[]);
        inv.redactions = vec![
            ("/work/.golangci-qgate-a1b2.yml".to_string(), ".golangci.yml".to_string()),
            (".golangci-qgate-a1b2.yml".to_string(), ".golangci.yml".to_string()),
        ];
        let text = "config /work/.golangci-qgate-a1b2.yml and .golangci-qgate-a1b2.yml";
        assert_eq!(inv.redact(text), "config .golangci.yml and .golangci.yml");
    }

    #[test]
    fn missing_tool_is_reported_without_spawning() {
        let inv = invocation("qgate-definitely-not-installed-tool", &[]);
        let output = ProcessStepRunner.run(&inv).expect("run");
        assert_eq!(output, StepOutput::ToolMissing);
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_not_an_error() {
        let inv = invocation("sh", &["-c", "echo finding; exit 1"]);
        let output = ProcessStepRunner.run(&inv).expect("run");
        assert_eq!(
            output,
            StepOutput::Completed {
                success: false,
                exit_code: Some(1),
                output: "finding\n".to_string(),
            }
        );
    }

    #[cfg(unix)]
    #[test]
    fn captured_output_is_redacted() {
        let mut inv = invocation("sh", &["-c", "echo using /tmp/.golangci-qgate-xyz.yml"]);
        inv.redactions = vec![(
            "/tmp/.golangci-qgate-xyz.yml".to_string(),
            ".golangci.yml".to_string(),
        )];
        let output = ProcessStepRunner.run(&inv).expect("run");
        assert_eq!(
            output,
            StepOutput::Completed {
                success: true,
                exit_code: Some(0),
                output: "using .golangci.yml\n".to_string(),
            }
        );
    }
}
