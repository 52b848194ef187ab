//! Push-based observability for the valuation service
//!
//! Metrics are kept in a Prometheus registry and pushed as periodic
//! structured JSON logs to stdout (for Loki, Fluentd, CloudWatch).

pub mod metrics;
pub mod reporter;

pub use metrics::Metrics;
pub use reporter::MetricsReporter;
