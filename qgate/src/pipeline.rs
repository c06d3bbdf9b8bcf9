//! Orchestration of one quality pipeline run.
//!
//! Stages run strictly in order `Build → Vet → DeepLint → VulnerabilityScan →
//! SecretScan`, each skipped when the mode disables it. A failed build ends
//! the run; every other check always runs once enabled.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{debug, info, instrument, warn};

use crate::core::checks::{CheckKind, CheckSpec, DEFAULT_PATH_SCOPE};
use crate::core::mode::{LintSource, Mode};
use crate::core::types::{CheckResult, PipelineRun};
use crate::io::config::QualityConfig;
use crate::io::lint_config::{LOCAL_CONFIG_NAMES, find_local_config, materialize};
use crate::io::process::CancelToken;
use crate::io::project::detect_project;
use crate::io::steps::{StepInvocation, StepOutput, StepRunner};

/// Everything one run needs, built once per invocation.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub project_dir: PathBuf,
    pub mode: Mode,
    /// Relative paths handed to path-aware checks.
    pub paths: Vec<String>,
    pub check_timeout: Duration,
    pub output_limit_bytes: usize,
    pub cancel: CancelToken,
}

impl PipelineRequest {
    pub fn new(project_dir: impl Into<PathBuf>, mode: Mode) -> Self {
        Self::from_config(project_dir, mode, &QualityConfig::default())
    }

    pub fn from_config(project_dir: impl Into<PathBuf>, mode: Mode, cfg: &QualityConfig) -> Self {
        Self {
            project_dir: project_dir.into(),
            mode,
            paths: Vec::new(),
            check_timeout: cfg.check_timeout(),
            output_limit_bytes: cfg.output_limit_bytes,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_paths(mut self, paths: Vec<String>) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.project_dir.is_dir() {
            bail!(
                "project directory {} does not exist",
                self.project_dir.display()
            );
        }
        for raw in &self.paths {
            validate_scope_path(raw)?;
        }
        Ok(())
    }
}

fn validate_scope_path(raw: &str) -> Result<()> {
    if raw.trim().is_empty() {
        bail!("path filter must not be empty");
    }
    if raw.starts_with('-') {
        bail!("path filter {raw:?} must not look like a command-line option");
    }
    let path = Path::new(raw);
    if path.is_absolute() {
        bail!("path filter {raw:?} must be relative to the project directory");
    }
    if path
        .components()
        .any(|component| matches!(component, Component::ParentDir))
    {
        bail!("path filter {raw:?} must not leave the project directory");
    }
    Ok(())
}

/// Run every check the request's mode enables.
///
/// Returns `Err` only for system errors (bad request, missing lint config,
/// filesystem failures) and cancellation; failing checks are results. Call
/// [`PipelineRun::ensure_passed`] for the aggregate verdict.
#[instrument(skip_all, fields(mode = %request.mode, project_dir = %request.project_dir.display()))]
pub fn run_pipeline<R: StepRunner + ?Sized>(
    request: &PipelineRequest,
    runner: &R,
) -> Result<PipelineRun> {
    request.validate()?;

    let kind = detect_project(&request.project_dir);
    if !kind.has_checks() {
        info!(?kind, "no applicable checks for project");
        return Ok(PipelineRun::default());
    }

    let plan = request.mode.plan();
    if plan.lint == LintSource::Local && find_local_config(&request.project_dir).is_none() {
        bail!(
            "mode {} needs a golangci-lint config in {} (one of: {})",
            request.mode,
            request.project_dir.display(),
            LOCAL_CONFIG_NAMES.join(", ")
        );
    }

    let checks = plan.enabled_checks();
    debug!(checks = ?checks, "resolved checks");

    let mut results = Vec::with_capacity(checks.len());
    for kind in checks {
        request.cancel.check()?;
        let spec = kind.spec();
        let result = match kind {
            CheckKind::DeepLint => run_deep_lint(request, runner, spec, plan.lint)?,
            _ => run_check(request, runner, spec, Vec::new(), Vec::new())?,
        };
        let build_failed = kind == CheckKind::Build && !result.passed();
        results.push(result);
        if build_failed {
            warn!("build failed, skipping remaining checks");
            break;
        }
    }

    let run = PipelineRun::new(results);
    info!(
        total = run.results.len(),
        failed = run.failed_count(),
        "pipeline finished"
    );
    Ok(run)
}

fn run_deep_lint<R: StepRunner + ?Sized>(
    request: &PipelineRequest,
    runner: &R,
    spec: &CheckSpec,
    source: LintSource,
) -> Result<CheckResult> {
    match source {
        LintSource::Skip => bail!("deep lint scheduled without a config source"),
        LintSource::Local => run_check(request, runner, spec, Vec::new(), Vec::new()),
        LintSource::Embedded(asset) => {
            let handle = materialize(asset, &request.project_dir)
                .with_context(|| format!("materialize {} lint config", asset.name()))?;
            debug!(asset = handle.asset().name(), "running deep lint with bundled ruleset");
            let extra = vec!["--config".to_string(), handle.path().display().to_string()];
            let result = run_check(request, runner, spec, extra, handle.redactions());
            let released = handle.release();
            let result = result?;
            released?;
            Ok(result)
        }
    }
}

fn run_check<R: StepRunner + ?Sized>(
    request: &PipelineRequest,
    runner: &R,
    spec: &CheckSpec,
    extra_args: Vec<String>,
    redactions: Vec<(String, String)>,
) -> Result<CheckResult> {
    let mut args: Vec<String> = spec.args.iter().map(|arg| arg.to_string()).collect();
    args.extend(extra_args);
    if spec.accepts_paths {
        if request.paths.is_empty() {
            args.push(DEFAULT_PATH_SCOPE.to_string());
        } else {
            args.extend(request.paths.iter().cloned());
        }
    }

    let invocation = StepInvocation {
        program: spec.program.to_string(),
        args,
        workdir: request.project_dir.clone(),
        timeout: request.check_timeout,
        output_limit_bytes: request.output_limit_bytes,
        redactions,
        cancel: request.cancel.clone(),
    };

    let output = runner
        .run(&invocation)
        .with_context(|| format!("{} check", spec.name))?;
    let result = match output {
        StepOutput::Completed {
            success: true,
            output,
            ..
        } => CheckResult::pass(spec.name, output),
        StepOutput::Completed {
            success: false,
            exit_code,
            output,
        } => {
            let error = match exit_code {
                Some(code) => format!("exit status {code}"),
                None => "terminated by signal".to_string(),
            };
            CheckResult::fail(spec.name, output, error)
        }
        StepOutput::ToolMissing => CheckResult::fail(
            spec.name,
            format!(
                "{} not found in PATH; install it: {}",
                spec.program, spec.install_hint
            ),
            "tool not found in execution path",
        ),
        StepOutput::TimedOut { output } => CheckResult::fail(
            spec.name,
            output,
            format!("timed out after {}s", request.check_timeout.as_secs()),
        ),
    };
    debug!(check = spec.name, passed = result.passed(), "check finished");
    Ok(result)
}
