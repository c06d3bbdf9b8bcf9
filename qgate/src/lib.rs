//! Quality check pipeline for Go codebases.
//!
//! A mode selects which external checks run (`go build`, `go vet`,
//! `golangci-lint`, `govulncheck`, `gitleaks`); the pipeline runs them in a
//! fixed order and the reporter turns the results into console output and a
//! `QUALITY_FAILURES.md` report for automated fixers.
//!
//! - **[`core`]**: Pure, deterministic logic (mode table, check descriptors,
//!   result types, report rendering). No I/O.
//! - **[`io`]**: Side-effecting operations (process execution, temp config
//!   files, artifact persistence, config loading).
//!
//! [`pipeline`] and [`reporter`] coordinate the two and are shared by the
//! command line, HTTP server and agent-tool front ends.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod pipeline;
pub mod reporter;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::core::mode::Mode;
pub use crate::core::types::{Cancelled, CheckResult, ChecksFailed, PipelineRun};
pub use crate::io::process::CancelToken;
pub use crate::io::steps::{ProcessStepRunner, StepRunner};
pub use crate::pipeline::{PipelineRequest, run_pipeline};
pub use crate::reporter::{ReportOutcome, Reporter};
