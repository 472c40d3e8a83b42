//! Route table shared by the router and the metrics middleware.
//!
//! Metrics are labelled with a route's logical name rather than its raw path,
//! so the label set stays fixed no matter what clients request.

/// Label used when the router matched nothing.
pub const UNKNOWN_ENDPOINT: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// Path template as registered with the router.
    pub path: &'static str,
    /// Value of the `endpoint` metrics label.
    pub endpoint: &'static str,
}

pub const HOME: Route = Route {
    path: "/",
    endpoint: "home",
};

pub const HEALTH: Route = Route {
    path: "/health",
    endpoint: "health",
};

pub const DATA: Route = Route {
    path: "/api/data",
    endpoint: "get_data",
};

pub const METRICS: Route = Route {
    path: "/metrics",
    endpoint: "metrics",
};

pub const ROUTES: [Route; 4] = [HOME, HEALTH, DATA, METRICS];

/// Resolve the endpoint label for a matched path template.
///
/// `None` (no route matched) and templates missing from the table both map
/// to [`UNKNOWN_ENDPOINT`].
pub fn endpoint_for(matched_path: Option<&str>) -> &'static str {
    matched_path
        .and_then(|path| ROUTES.iter().find(|r| r.path == path))
        .map(|r| r.endpoint)
        .unwrap_or(UNKNOWN_ENDPOINT)
}
