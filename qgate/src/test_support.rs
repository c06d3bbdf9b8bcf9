//! Test-only helpers: scripted step runners and scratch Go projects.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use tempfile::TempDir;

use crate::core::mode::Mode;
use crate::core::types::Cancelled;
use crate::io::artifact::artifact_path;
use crate::io::steps::{StepInvocation, StepOutput, StepRunner};
use crate::pipeline::PipelineRequest;

/// Token in scripted output replaced by the `--config` argument, emulating a
/// tool that echoes its config path.
pub const CONFIG_TOKEN: &str = "{config}";

/// One queued response for [`ScriptedStepRunner`].
#[derive(Debug, Clone)]
pub enum ScriptedStep {
    Pass(String),
    Fail(String),
    Missing,
    TimedOut(String),
    /// Runner-level system error.
    Error(String),
    Cancelled,
}

impl ScriptedStep {
    pub fn pass(output: &str) -> Self {
        Self::Pass(output.to_string())
    }

    pub fn fail(output: &str) -> Self {
        Self::Fail(output.to_string())
    }

    pub fn missing() -> Self {
        Self::Missing
    }

    pub fn timed_out(output: &str) -> Self {
        Self::TimedOut(output.to_string())
    }

    pub fn error(message: &str) -> Self {
        Self::Error(message.to_string())
    }

    pub fn cancelled() -> Self {
        Self::Cancelled
    }
}

/// What the scripted runner saw for one invocation.
#[derive(Debug, Clone)]
pub struct RecordedStep {
    pub command_line: String,
    /// Value following `--config`, if any.
    pub config_path: Option<PathBuf>,
    /// Whether that config file existed when the step ran.
    pub config_existed: bool,
}

/// Step runner that replays queued responses in order and records every call.
#[derive(Debug, Default)]
pub struct ScriptedStepRunner {
    queue: Mutex<VecDeque<ScriptedStep>>,
    calls: Mutex<Vec<RecordedStep>>,
}

impl ScriptedStepRunner {
    pub fn new(steps: Vec<ScriptedStep>) -> Self {
        Self {
            queue: Mutex::new(steps.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn invocations(&self) -> Vec<RecordedStep> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.invocations()
            .into_iter()
            .map(|call| call.command_line)
            .collect()
    }

    pub fn assert_drained(&self) -> Result<()> {
        let queue = self
            .queue
            .lock()
            .map_err(|_| anyhow!("scripted queue poisoned"))?;
        if !queue.is_empty() {
            bail!("{} scripted steps were never run", queue.len());
        }
        Ok(())
    }
}

impl StepRunner for ScriptedStepRunner {
    fn run(&self, invocation: &StepInvocation) -> Result<StepOutput> {
        let config_path = invocation
            .args
            .iter()
            .position(|arg| arg == "--config")
            .and_then(|idx| invocation.args.get(idx + 1))
            .map(PathBuf::from);
        let config_existed = config_path.as_deref().is_some_and(Path::exists);
        self.calls
            .lock()
            .map_err(|_| anyhow!("scripted calls poisoned"))?
            .push(RecordedStep {
                command_line: invocation.command_line(),
                config_path: config_path.clone(),
                config_existed,
            });

        let step = self
            .queue
            .lock()
            .map_err(|_| anyhow!("scripted queue poisoned"))?
            .pop_front()
            .with_context(|| format!("no scripted step for {}", invocation.command_line()))?;

        let render = |raw: &str| {
            let raw = match &config_path {
                Some(path) => raw.replace(CONFIG_TOKEN, &path.display().to_string()),
                None => raw.to_string(),
            };
            invocation.redact(&raw)
        };

        match step {
            ScriptedStep::Pass(output) => Ok(StepOutput::Completed {
                success: true,
                exit_code: Some(0),
                output: render(&output),
            }),
            ScriptedStep::Fail(output) => Ok(StepOutput::Completed {
                success: false,
                exit_code: Some(1),
                output: render(&output),
            }),
            ScriptedStep::Missing => Ok(StepOutput::ToolMissing),
            ScriptedStep::TimedOut(output) => Ok(StepOutput::TimedOut {
                output: render(&output),
            }),
            ScriptedStep::Error(message) => Err(anyhow!(message)),
            ScriptedStep::Cancelled => Err(Cancelled.into()),
        }
    }
}

/// Scratch project directory removed on drop.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    /// Empty directory with a `go.mod`.
    pub fn go() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp project")?;
        let project = Self { dir };
        project.write("go.mod", "module example.com/demo\n\ngo 1.22\n")?;
        Ok(project)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn request(&self, mode: Mode) -> PipelineRequest {
        let mut request = PipelineRequest::new(self.path(), mode);
        request.check_timeout = Duration::from_secs(30);
        request
    }

    pub fn write(&self, rel: &str, contents: &str) -> Result<()> {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))
    }

    pub fn artifact_path(&self) -> PathBuf {
        artifact_path(self.path())
    }

    pub fn read_artifact(&self) -> Result<String> {
        let path = self.artifact_path();
        fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))
    }

    /// Materialized lint configs still present in the project root.
    pub fn leftover_lint_configs(&self) -> Result<Vec<PathBuf>> {
        let mut leftovers = Vec::new();
        for entry in fs::read_dir(self.path()).context("read project dir")? {
            let path = entry.context("read entry")?.path();
            let is_temp = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(".golangci-qgate-"));
            if is_temp {
                leftovers.push(path);
            }
        }
        Ok(leftovers)
    }
}
