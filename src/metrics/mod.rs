pub mod collector;

pub use collector::RequestMetrics;

/// Content type of the Prometheus text exposition format (v0.0.4).
pub const CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

/// Status recorded for requests dropped before a response was produced,
/// following the nginx "client closed request" convention.
pub const CLIENT_CLOSED_REQUEST: u16 = 499;
