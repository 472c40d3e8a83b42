use axum::{
    extract::{MatchedPath, Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

use crate::metrics::{RequestMetrics, CLIENT_CLOSED_REQUEST};
use crate::routes;

/// Tower-compatible middleware that records, for every request:
///
///   http_request_duration_seconds{method, endpoint}     one observation
///   http_request_total{method, endpoint, status}        +1
///
/// Must sit outside the panic-catching layer so that handler panics reach
/// this point as a 500 response.
pub async fn track_metrics(
    State(metrics): State<Arc<RequestMetrics>>,
    req: Request,
    next: Next,
) -> Response {
    let endpoint = routes::endpoint_for(
        req.extensions().get::<MatchedPath>().map(MatchedPath::as_str),
    );
    let timer = RequestTimer::start(metrics, req.method().clone(), endpoint);

    let response = next.run(req).await;

    timer.finish(response.status());
    response
}

/// Start time of one in-flight request plus the labels it is recorded under.
///
/// Records exactly once: on `finish()`, or on drop with status 499 if the
/// request future was cancelled before a response existed.
pub struct RequestTimer {
    metrics: Arc<RequestMetrics>,
    method: Method,
    endpoint: &'static str,
    start: Instant,
    recorded: bool,
}

impl RequestTimer {
    pub fn start(metrics: Arc<RequestMetrics>, method: Method, endpoint: &'static str) -> Self {
        Self {
            metrics,
            method,
            endpoint,
            start: Instant::now(),
            recorded: false,
        }
    }

    pub fn finish(mut self, status: StatusCode) {
        self.record(status.as_u16());
    }

    fn record(&mut self, status: u16) {
        if self.recorded {
            return;
        }
        self.recorded = true;

        let elapsed = self.start.elapsed().as_secs_f64();
        self.metrics
            .observe(self.method.as_str(), self.endpoint, status, elapsed);
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        self.record(CLIENT_CLOSED_REQUEST);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server;
    use axum::{body::Body, http, routing::get, Router};
    use std::time::Duration;
    use tower::ServiceExt;

    async fn panicking() -> &'static str {
        panic!("boom")
    }

    fn metrics() -> Arc<RequestMetrics> {
        Arc::new(RequestMetrics::new().unwrap())
    }

    #[test]
    fn finish_records_once() {
        let metrics = metrics();
        let timer = RequestTimer::start(metrics.clone(), Method::GET, "health");
        timer.finish(StatusCode::OK);

        assert_eq!(metrics.request_count("GET", "health", 200), 1);
        assert_eq!(metrics.request_count("GET", "health", 499), 0);
        assert_eq!(metrics.observation_count("GET", "health"), 1);
    }

    #[test]
    fn dropped_timer_records_client_closed() {
        let metrics = metrics();
        drop(RequestTimer::start(metrics.clone(), Method::GET, "get_data"));

        assert_eq!(metrics.request_count("GET", "get_data", 499), 1);
        assert_eq!(metrics.observation_count("GET", "get_data"), 1);
    }

    #[tokio::test]
    async fn handler_panic_is_counted_as_500() {
        let metrics = metrics();
        let app = server::instrument(
            Router::new().route(routes::HEALTH.path, get(panicking)),
            metrics.clone(),
        );

        let response = app
            .oneshot(
                http::Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(metrics.request_count("GET", "health", 500), 1);
        assert_eq!(metrics.observation_count("GET", "health"), 1);
    }

    #[tokio::test]
    async fn cancelled_request_is_counted_as_client_closed() {
        let metrics = metrics();
        let app = server::instrument(
            Router::new().route(
                routes::DATA.path,
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "late"
                }),
            ),
            metrics.clone(),
        );

        let request = http::Request::builder()
            .uri("/api/data")
            .body(Body::empty())
            .unwrap();
        let outcome = tokio::time::timeout(Duration::from_millis(20), app.oneshot(request)).await;

        assert!(outcome.is_err());
        assert_eq!(metrics.request_count("GET", "get_data", 499), 1);
        assert_eq!(metrics.total_requests(), 1);
    }
}
