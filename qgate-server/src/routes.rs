//! HTTP route handlers.

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use serde::Deserialize;
use tracing::{info, warn};

use qgate::io::config::load_project_config;
use qgate::{CancelToken, Mode, PipelineRequest, PipelineRun, run_pipeline};

use crate::state::AppState;

/// Build the router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/quality", get(quality))
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Default, Deserialize)]
pub struct QualityParams {
    pub mode: Option<String>,
}

/// Cancels the run when the request future is dropped (client went away).
struct CancelOnDrop(CancelToken);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// GET /quality?mode=<mode> - run the pipeline and return every check result.
///
/// Failing checks still answer 200; only system errors (invalid mode, config
/// materialization, filesystem) answer 500 with a plain-text message.
pub async fn quality(State(state): State<AppState>, Query(params): Query<QualityParams>) -> Response {
    match run_quality(state, params).await {
        Ok(run) => {
            info!(
                total = run.results.len(),
                failed = run.failed_count(),
                "quality run finished"
            );
            Json(run.results).into_response()
        }
        Err(err) => {
            warn!(err = %format!("{err:#}"), "quality run failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("{err:#}")).into_response()
        }
    }
}

async fn run_quality(state: AppState, params: QualityParams) -> Result<PipelineRun> {
    let mode = match params.mode.as_deref() {
        Some(raw) => raw.parse::<Mode>()?,
        None => Mode::Essential,
    };
    let cfg = load_project_config(&state.project_dir)?;
    let cancel = CancelToken::new();
    let _guard = CancelOnDrop(cancel.clone());
    let request = PipelineRequest::from_config(&state.project_dir, mode, &cfg).with_cancel(cancel);
    let runner = state.runner.clone();

    tokio::task::spawn_blocking(move || run_pipeline(&request, &*runner))
        .await
        .context("join pipeline task")?
}
