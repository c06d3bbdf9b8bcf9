//! Quality check pipeline command line.
//!
//! Runs the checks selected by a mode against the project in the current (or
//! given) directory, prints a per-check breakdown, and keeps
//! `QUALITY_FAILURES.md` in sync with the latest run.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::debug;

use qgate::core::mode::LintSource;
use qgate::exit_codes;
use qgate::io::config::{CONFIG_FILE_NAME, QualityConfig, load_project_config, write_config};
use qgate::io::lint_config::{LOCAL_CONFIG_NAMES, asset_by_name, asset_contents};
use qgate::{
    CancelToken, Mode, PipelineRequest, ProcessStepRunner, ReportOutcome, Reporter, run_pipeline,
};

#[derive(Parser)]
#[command(
    name = "qgate",
    version,
    about = "Run build, lint and security checks with one consistent contract"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the checks for a mode and report the results.
    Check {
        /// essential | strict | style | complexity | security | local
        #[arg(short, long)]
        mode: Option<String>,
        /// Project root (contains go.mod).
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
        /// Per-check timeout in seconds (overrides qgate.toml).
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Limit path-aware checks (golangci-lint) to these paths.
        paths: Vec<String>,
    },
    /// List modes and the checks each one runs.
    Modes,
    /// Write a default `qgate.toml` if missing.
    Init {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
        /// Overwrite existing files.
        #[arg(short, long)]
        force: bool,
        /// Also copy a bundled ruleset (strict | style | complexity | security)
        /// to `.golangci.yml` for `local` mode.
        #[arg(long, value_name = "RULESET")]
        lint_config: Option<String>,
    },
}

fn main() {
    qgate::logging::init();
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            exit_codes::SYSTEM_ERROR
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Check {
            mode,
            project_dir,
            timeout_secs,
            paths,
        } => cmd_check(mode.as_deref(), &project_dir, timeout_secs, paths),
        Command::Modes => cmd_modes(),
        Command::Init {
            project_dir,
            force,
            lint_config,
        } => cmd_init(&project_dir, force, lint_config.as_deref()),
    }
}

fn cmd_check(
    mode: Option<&str>,
    project_dir: &Path,
    timeout_secs: Option<u64>,
    paths: Vec<String>,
) -> Result<i32> {
    let mut cfg = load_project_config(project_dir)?;
    if let Some(secs) = timeout_secs {
        cfg.check_timeout_secs = secs;
        cfg.validate()?;
    }
    let mode = match mode {
        Some(raw) => raw.parse::<Mode>()?,
        None => cfg.default_mode,
    };
    debug!(%mode, project_dir = %project_dir.display(), "starting check");

    // Checks run in their own process group and never see the terminal's
    // SIGINT. Ctrl-C cancels the run instead.
    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    ctrlc::set_handler(move || on_interrupt.cancel()).context("install interrupt handler")?;

    let request = PipelineRequest::from_config(project_dir, mode, &cfg)
        .with_paths(paths)
        .with_cancel(cancel);
    let run = run_pipeline(&request, &ProcessStepRunner)?;

    let reporter = Reporter::new(project_dir);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let outcome = reporter.report(&run, &mut out)?;
    if let ReportOutcome::ArtifactWritten(path) = &outcome {
        writeln!(out, "Failure report written to {}", path.display())
            .context("write report output")?;
    }

    match run.ensure_passed() {
        Ok(()) => Ok(exit_codes::OK),
        Err(_) => Ok(exit_codes::CHECKS_FAILED),
    }
}

fn cmd_modes() -> Result<i32> {
    for mode in Mode::ALL {
        let plan = mode.plan();
        let checks: Vec<&str> = plan
            .enabled_checks()
            .into_iter()
            .map(|kind| kind.spec().name)
            .collect();
        let lint = match plan.lint {
            LintSource::Skip => "none".to_string(),
            LintSource::Embedded(asset) => format!("bundled {}", asset.name()),
            LintSource::Local => "project file".to_string(),
        };
        println!(
            "{:<11} checks={} lint-config={}",
            mode.as_str(),
            checks.join(","),
            lint
        );
        println!("{:<11} {}", "", mode.description());
    }
    Ok(exit_codes::OK)
}

fn cmd_init(project_dir: &Path, force: bool, lint_config: Option<&str>) -> Result<i32> {
    let path = project_dir.join(CONFIG_FILE_NAME);
    let lint = lint_config
        .map(|name| {
            asset_by_name(name).map(|asset| (asset, project_dir.join(LOCAL_CONFIG_NAMES[0])))
        })
        .transpose()?;

    let mut targets = vec![path.as_path()];
    if let Some((_, lint_path)) = &lint {
        targets.push(lint_path.as_path());
    }
    if !force && let Some(existing) = targets.iter().find(|target| target.exists()) {
        bail!("{} already exists (use --force to overwrite)", existing.display());
    }

    write_config(&path, &QualityConfig::default())?;
    println!("wrote {}", path.display());
    if let Some((asset, lint_path)) = lint {
        fs::write(&lint_path, asset_contents(asset))
            .with_context(|| format!("write {}", lint_path.display()))?;
        println!("wrote {} ({} ruleset)", lint_path.display(), asset.name());
    }
    Ok(exit_codes::OK)
}
