use prometheus::proto::MetricFamily;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

// ─── Configuration ───────────────────────────────────────────────

/// Counter of completed requests, labelled by method, endpoint and status.
pub const REQUEST_TOTAL: &str = "http_request_total";

/// Histogram of request wall time in seconds, labelled by method and endpoint.
pub const REQUEST_DURATION: &str = "http_request_duration_seconds";

const COUNTER_LABELS: &[&str] = &["method", "endpoint", "status"];
const HISTOGRAM_LABELS: &[&str] = &["method", "endpoint"];

// ─── Public types ────────────────────────────────────────────────

/// Process-wide request instruments and the registry they are exported from.
///
/// Every update goes through `observe()`, the `/metrics` handler calls
/// `render()`. Both instruments are internally atomic per label set, so
/// concurrent requests never need a lock here.
pub struct RequestMetrics {
    registry: Registry,
    requests: IntCounterVec,
    durations: HistogramVec,
}

// ─── RequestMetrics impl ─────────────────────────────────────────

impl RequestMetrics {
    /// Builds a fresh registry with both instruments registered.
    ///
    /// The histogram uses the default bucket layout (5 ms → 10 s), which
    /// puts the 100 ms synthetic delay of `/api/data` on a bucket boundary.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new(REQUEST_TOTAL, "Total HTTP requests"),
            COUNTER_LABELS,
        )?;
        let durations = HistogramVec::new(
            HistogramOpts::new(REQUEST_DURATION, "HTTP request duration"),
            HISTOGRAM_LABELS,
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(durations.clone()))?;

        Ok(Self {
            registry,
            requests,
            durations,
        })
    }

    /// Record one completed request. Series are created on first use.
    pub fn observe(&self, method: &str, endpoint: &str, status: u16, duration_secs: f64) {
        self.durations
            .with_label_values(&[method, endpoint])
            .observe(duration_secs);

        let status = status.to_string();
        self.requests
            .with_label_values(&[method, endpoint, &status])
            .inc();
    }

    /// Encode every registered family in the Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let families = self.registry.gather();
        let mut buf = Vec::new();
        TextEncoder::new().encode(&families, &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    /// Sum of the request counter across all label sets.
    pub fn total_requests(&self) -> u64 {
        self.family(REQUEST_TOTAL)
            .map(|f| {
                f.get_metric()
                    .iter()
                    .map(|m| m.get_counter().get_value() as u64)
                    .sum()
            })
            .unwrap_or(0)
    }

    /// Reads go through `gather()` so looking up an unseen label set never
    /// creates an empty series.
    fn family(&self, name: &str) -> Option<MetricFamily> {
        self.registry
            .gather()
            .into_iter()
            .find(|f| f.get_name() == name)
    }
}

// ─── Test-only readers ───────────────────────────────────────────

#[cfg(test)]
impl RequestMetrics {
    fn find_metric(
        &self,
        name: &str,
        labels: &[(&str, &str)],
    ) -> Option<prometheus::proto::Metric> {
        let family = self.family(name)?;
        family
            .get_metric()
            .iter()
            .find(|m| {
                m.get_label().len() == labels.len()
                    && labels.iter().all(|(k, v)| {
                        m.get_label()
                            .iter()
                            .any(|p| p.get_name() == *k && p.get_value() == *v)
                    })
            })
            .cloned()
    }

    pub fn request_count(&self, method: &str, endpoint: &str, status: u16) -> u64 {
        let status = status.to_string();
        self.find_metric(
            REQUEST_TOTAL,
            &[("method", method), ("endpoint", endpoint), ("status", &status)],
        )
        .map(|m| m.get_counter().get_value() as u64)
        .unwrap_or(0)
    }

    pub fn observation_count(&self, method: &str, endpoint: &str) -> u64 {
        self.find_metric(REQUEST_DURATION, &[("method", method), ("endpoint", endpoint)])
            .map(|m| m.get_histogram().get_sample_count())
            .unwrap_or(0)
    }

    pub fn observation_sum(&self, method: &str, endpoint: &str) -> f64 {
        self.find_metric(REQUEST_DURATION, &[("method", method), ("endpoint", endpoint)])
            .map(|m| m.get_histogram().get_sample_sum())
            .unwrap_or(0.0)
    }

    pub fn total_observations(&self) -> u64 {
        self.family(REQUEST_DURATION)
            .map(|f| {
                f.get_metric()
                    .iter()
                    .map(|m| m.get_histogram().get_sample_count())
                    .sum()
            })
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn empty_registry_reports_zero() {
        let metrics = RequestMetrics::new().unwrap();
        assert_eq!(metrics.total_requests(), 0);
        assert_eq!(metrics.total_observations(), 0);
        assert_eq!(metrics.request_count("GET", "health", 200), 0);
    }

    #[test]
    fn observe_updates_counter_and_histogram() {
        let metrics = RequestMetrics::new().unwrap();
        metrics.observe("GET", "health", 200, 0.002);
        metrics.observe("GET", "health", 200, 0.003);
        metrics.observe("GET", "health", 503, 0.004);

        assert_eq!(metrics.request_count("GET", "health", 200), 2);
        assert_eq!(metrics.request_count("GET", "health", 503), 1);
        // Histogram is keyed without status.
        assert_eq!(metrics.observation_count("GET", "health"), 3);
        assert!((metrics.observation_sum("GET", "health") - 0.009).abs() < 1e-9);
        assert_eq!(metrics.total_requests(), 3);
    }

    #[test]
    fn lookups_do_not_create_series() {
        let metrics = RequestMetrics::new().unwrap();
        metrics.observe("GET", "home", 200, 0.001);

        assert_eq!(metrics.request_count("POST", "home", 200), 0);
        let text = metrics.render().unwrap();
        assert!(!text.contains(r#"method="POST""#));
    }

    #[test]
    fn render_emits_text_exposition() {
        let metrics = RequestMetrics::new().unwrap();
        metrics.observe("GET", "get_data", 200, 0.15);

        let text = metrics.render().unwrap();
        assert!(text.contains("# TYPE http_request_total counter"));
        assert!(text.contains("# TYPE http_request_duration_seconds histogram"));
        assert!(text.contains("http_request_duration_seconds_bucket"));
        assert!(text.contains("http_request_duration_seconds_count"));
        assert!(text.contains(r#"endpoint="get_data""#));
    }

    #[test]
    fn render_has_no_side_effects() {
        let metrics = RequestMetrics::new().unwrap();
        metrics.observe("GET", "home", 200, 0.001);

        let first = metrics.render().unwrap();
        let second = metrics.render().unwrap();
        assert_eq!(first, second);
        assert_eq!(metrics.total_requests(), 1);
    }

    #[test]
    fn concurrent_observations_are_not_lost() {
        let metrics = Arc::new(RequestMetrics::new().unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = metrics.clone();
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        metrics.observe("GET", "home", 200, 0.0001);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(metrics.request_count("GET", "home", 200), 8_000);
        assert_eq!(metrics.observation_count("GET", "home"), 8_000);
    }
}
