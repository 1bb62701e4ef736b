//! HTTP request handlers for the web server.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::AppState;
use crate::crawler::run_crawl;
use crate::output::RunFailure;

/// Runs one crawl and reports its summary.
///
/// Answers 409 if another run holds the lock and 500 with
/// `{success: false, error}` if the run fails.
pub async fn trigger_crawl(State(state): State<AppState>) -> Response {
    let Ok(_guard) = state.run_lock.try_lock() else {
        tracing::warn!("Rejecting crawl trigger: a run is already in progress");
        return (
            StatusCode::CONFLICT,
            Json(RunFailure::new("A crawl is already running")),
        )
            .into_response();
    };

    match run_crawl(&state.config, state.store.clone()).await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(RunFailure::new(e))).into_response(),
    }
}
