use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::metrics::CONTENT_TYPE;
use crate::AppState;

use super::AppError;

// ─── GET /metrics ────────────────────────────────────────────────
/// Prometheus scrape target. Reading never mutates the instruments.

pub async fn export_metrics(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let body = state.metrics.render()?;
    Ok(([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response())
}
