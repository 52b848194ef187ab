//! Push-based metrics reporter
//!
//! Periodically outputs metrics as structured JSON to stdout.

use crate::application::valuation_service::ValuationService;
use crate::infrastructure::observability::metrics::Metrics;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Metrics snapshot for JSON output
#[derive(Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub model: ModelSnapshot,
    pub valuations: ValuationSnapshot,
}

#[derive(Serialize)]
pub struct ModelSnapshot {
    pub trained: bool,
    pub training_r2: Option<f64>,
}

#[derive(Serialize)]
pub struct ValuationSnapshot {
    pub success: u64,
    pub invalid: u64,
    pub not_ready: u64,
    pub error: u64,
}

/// Push-based metrics reporter
///
/// Outputs metrics as structured JSON logs on a configurable interval.
pub struct MetricsReporter {
    service: Arc<ValuationService>,
    metrics: Metrics,
    start_time: Instant,
    interval: Duration,
}

impl MetricsReporter {
    /// Create a new metrics reporter
    ///
    /// # Arguments
    /// * `service` - Shared valuation service
    /// * `metrics` - Prometheus metrics (for internal tracking)
    /// * `interval_seconds` - How often to output metrics (default: 60)
    pub fn new(service: Arc<ValuationService>, metrics: Metrics, interval_seconds: u64) -> Self {
        Self {
            service,
            metrics,
            start_time: Instant::now(),
            interval: Duration::from_secs(interval_seconds.max(1)),
        }
    }

    /// Run the reporter in a loop, outputting metrics periodically
    pub async fn run(self) {
        info!(
            "MetricsReporter: Starting push-based metrics (interval: {:?})",
            self.interval
        );

        loop {
            tokio::time::sleep(self.interval).await;

            let snapshot = self.collect_snapshot();
            match serde_json::to_string(&snapshot) {
                Ok(json) => {
                    // Use a special prefix so logs can be easily filtered
                    println!("METRICS_JSON:{}", json);
                    info!(
                        "Model trained: {} | Valuations: {} ok / {} failed | Uptime: {}s",
                        snapshot.model.trained,
                        snapshot.valuations.success,
                        snapshot.valuations.invalid + snapshot.valuations.not_ready + snapshot.valuations.error,
                        snapshot.uptime_seconds
                    );
                }
                Err(e) => warn!("Failed to serialize metrics: {}", e),
            }
        }
    }

    /// Collect current metrics snapshot
    pub fn collect_snapshot(&self) -> MetricsSnapshot {
        let uptime = self.start_time.elapsed().as_secs();
        self.metrics.uptime_seconds.set(uptime as f64);

        let trained = self.service.is_trained();
        let training_r2 = if trained && self.metrics.model_trained.get() > 0.0 {
            Some(self.metrics.model_training_r2.get())
        } else {
            None
        };

        MetricsSnapshot {
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_seconds: uptime,
            version: env!("CARGO_PKG_VERSION").to_string(),
            model: ModelSnapshot {
                trained,
                training_r2,
            },
            valuations: ValuationSnapshot {
                success: self.metrics.valuations("success") as u64,
                invalid: self.metrics.valuations("invalid") as u64,
                not_ready: self.metrics.valuations("not_ready") as u64,
                error: self.metrics.valuations("error") as u64,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;

    #[test]
    fn test_metrics_snapshot_collection() {
        let service = Arc::new(ValuationService::new(ModelConfig::default()));
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.inc_valuations("invalid");
        let reporter = MetricsReporter::new(service, metrics, 60);

        let snapshot = reporter.collect_snapshot();

        assert!(!snapshot.model.trained);
        assert!(snapshot.model.training_r2.is_none());
        assert_eq!(snapshot.valuations.invalid, 1);
        assert!(!snapshot.timestamp.is_empty());
    }

    #[test]
    fn test_snapshot_serialization() {
        let snapshot = MetricsSnapshot {
            timestamp: "2026-01-10T10:00:00Z".to_string(),
            uptime_seconds: 3600,
            version: "0.4.2".to_string(),
            model: ModelSnapshot {
                trained: true,
                training_r2: Some(0.97),
            },
            valuations: ValuationSnapshot {
                success: 12,
                invalid: 1,
                not_ready: 0,
                error: 0,
            },
        };

        let json = serde_json::to_string(&snapshot).expect("Failed to serialize");
        assert!(json.contains("\"trained\":true"));
        assert!(json.contains("0.97"));
    }
}
