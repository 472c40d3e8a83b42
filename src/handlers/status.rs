use axum::Json;
use serde::Serialize;

// ─── Response types ──────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub message: &'static str,
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

// ─── GET / ───────────────────────────────────────────────────────

pub async fn home() -> Json<HomeResponse> {
    Json(HomeResponse {
        message: "Hello from pulse-metrics!",
        status: "running",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ─── GET /health ─────────────────────────────────────────────────

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}
