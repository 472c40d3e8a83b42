use axum::{middleware as axum_mw, routing::get, Router};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::handlers;
use crate::metrics::RequestMetrics;
use crate::middleware::timing;
use crate::routes;
use crate::AppState;

/// Builds the full Axum `Router` with all routes and middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    let metrics = state.metrics.clone();

    let router = Router::new()
        .route(routes::HOME.path, get(handlers::status::home))
        .route(routes::HEALTH.path, get(handlers::status::health))
        .route(routes::DATA.path, get(handlers::data::get_data))
        .route(routes::METRICS.path, get(handlers::metrics::export_metrics))
        // ── Unmatched paths still pass through the layers below ─
        .fallback(handlers::not_found)
        .with_state(state);

    instrument(router, metrics)
}

/// Wraps every route (and the fallback) of `router` in the global middleware.
///
/// Layers apply bottom-up, so the order of execution per request is
/// trace → cors → metrics → catch-panic → handler.
pub fn instrument(router: Router, metrics: Arc<RequestMetrics>) -> Router {
    router
        .layer(CatchPanicLayer::custom(handlers::panic_response))
        .layer(axum_mw::from_fn_with_state(metrics, timing::track_metrics))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
