//! The `run-quality-checks` agent tool.

use std::path::Path;

use anyhow::{Result, anyhow};
use jsonschema::Validator;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use qgate::io::config::load_project_config;
use qgate::{Mode, PipelineRequest, Reporter, StepRunner, run_pipeline};

pub const TOOL_NAME: &str = "run-quality-checks";
pub const PASS_MARKER: &str = "✅ All quality checks passed";
pub const FAIL_MARKER: &str = "❌ Quality checks failed";

const INPUT_SCHEMA: &str = include_str!("schemas/run_quality_checks.input.schema.json");

#[derive(Debug, Default, Deserialize)]
pub struct ToolArgs {
    pub mode: Option<String>,
}

/// Text result handed back to the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
    /// Set for system errors; failing checks are a normal result.
    pub is_error: bool,
}

pub fn input_schema() -> Result<Value> {
    serde_json::from_str(INPUT_SCHEMA).map_err(|err| anyhow!("invalid input schema: {err}"))
}

/// `tools/list` entry.
pub fn descriptor() -> Result<Value> {
    Ok(json!({
        "name": TOOL_NAME,
        "description": "Run the project's quality checks (build, vet, golangci-lint, \
            vulnerability and secret scans, depending on mode) and return the \
            per-check log. Failures are also written to QUALITY_FAILURES.md.",
        "inputSchema": input_schema()?,
    }))
}

/// Compiled validator for tool arguments.
pub fn argument_validator() -> Result<Validator> {
    let schema = input_schema()?;
    jsonschema::validator_for(&schema).map_err(|err| anyhow!("invalid input schema: {err}"))
}

/// Validate raw arguments and deserialize them.
pub fn parse_args(validator: &Validator, raw: Option<&Value>) -> Result<ToolArgs> {
    let value = raw.cloned().unwrap_or_else(|| json!({}));
    let messages: Vec<String> = validator
        .iter_errors(&value)
        .map(|err| err.to_string())
        .collect();
    if !messages.is_empty() {
        return Err(anyhow!("invalid arguments: {}", messages.join("; ")));
    }
    serde_json::from_value(value).map_err(|err| anyhow!("invalid arguments: {err}"))
}

/// Run the pipeline and reporter, returning the captured log plus a final
/// outcome marker line.
pub fn run_quality_checks<R: StepRunner + ?Sized>(
    project_dir: &Path,
    runner: &R,
    args: &ToolArgs,
) -> ToolOutput {
    let mut log = Vec::new();
    let outcome = (|| -> Result<bool> {
        let mode = match args.mode.as_deref() {
            Some(raw) => raw.parse::<Mode>()?,
            None => Mode::Local,
        };
        let cfg = load_project_config(project_dir)?;
        let request = PipelineRequest::from_config(project_dir, mode, &cfg);
        let run = run_pipeline(&request, runner)?;
        Reporter::new(project_dir).report(&run, &mut log)?;
        Ok(run.passed())
    })();

    let mut text = String::from_utf8_lossy(&log).into_owned();
    let (marker, is_error) = match outcome {
        Ok(true) => (PASS_MARKER, false),
        Ok(false) => (FAIL_MARKER, false),
        Err(err) => {
            warn!(err = %format!("{err:#}"), "quality tool failed");
            text.push_str(&format!("error: {err:#}\n"));
            (FAIL_MARKER, true)
        }
    };
    text.push_str(marker);
    text.push('\n');
    info!(is_error, "quality tool finished");
    ToolOutput { text, is_error }
}
