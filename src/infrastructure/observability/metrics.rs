//! Prometheus metrics definitions for the valuation service
//!
//! All metrics use the `valuation_` prefix.

use prometheus::{
    CounterVec, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
    core::{AtomicF64, GenericGauge},
};
use std::sync::Arc;

/// Prometheus metrics for the valuation service
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Valuations served, by outcome (success, invalid, not_ready, error)
    pub valuations_total: CounterVec,
    /// Training cycles, by trigger and outcome
    pub training_runs_total: CounterVec,
    /// Wall time of one training cycle
    pub training_duration_seconds: Histogram,
    /// Time spent predicting one property (excluding lazy training)
    pub prediction_latency_seconds: Histogram,
    /// 1 once a model is live
    pub model_trained: GenericGauge<AtomicF64>,
    /// R² of the live model on its own training set
    pub model_training_r2: GenericGauge<AtomicF64>,
    /// Uptime in seconds
    pub uptime_seconds: GenericGauge<AtomicF64>,
}

impl Metrics {
    /// Create a new Metrics instance with all gauges and counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let valuations_total = CounterVec::new(
            Opts::new("valuation_requests_total", "Valuations served by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(valuations_total.clone()))?;

        let training_runs_total = CounterVec::new(
            Opts::new(
                "valuation_training_runs_total",
                "Training cycles by trigger and outcome",
            ),
            &["trigger", "outcome"],
        )?;
        registry.register(Box::new(training_runs_total.clone()))?;

        let training_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "valuation_training_duration_seconds",
                "Wall time of a training cycle in seconds",
            )
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        )?;
        registry.register(Box::new(training_duration_seconds.clone()))?;

        let prediction_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "valuation_prediction_latency_seconds",
                "Latency of a single prediction in seconds",
            )
            .buckets(vec![
                0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25,
            ]),
        )?;
        registry.register(Box::new(prediction_latency_seconds.clone()))?;

        let model_trained = Gauge::with_opts(Opts::new(
            "valuation_model_trained",
            "Whether a model is live (0=no, 1=yes)",
        ))?;
        registry.register(Box::new(model_trained.clone()))?;

        let model_training_r2 = Gauge::with_opts(Opts::new(
            "valuation_model_training_r2",
            "R2 of the live model on its training set",
        ))?;
        registry.register(Box::new(model_training_r2.clone()))?;

        let uptime_seconds = Gauge::with_opts(Opts::new(
            "valuation_uptime_seconds",
            "Server uptime in seconds",
        ))?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            valuations_total,
            training_runs_total,
            training_duration_seconds,
            prediction_latency_seconds,
            model_trained,
            model_training_r2,
            uptime_seconds,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn inc_valuations(&self, outcome: &str) {
        self.valuations_total.with_label_values(&[outcome]).inc();
    }

    pub fn valuations(&self, outcome: &str) -> f64 {
        self.valuations_total.with_label_values(&[outcome]).get()
    }

    /// Record a finished training cycle
    pub fn record_training(&self, trigger: &str, outcome: &str, seconds: f64, r2: Option<f64>) {
        self.training_runs_total
            .with_label_values(&[trigger, outcome])
            .inc();
        self.training_duration_seconds.observe(seconds);
        if let Some(r2) = r2 {
            self.model_trained.set(1.0);
            self.model_training_r2.set(r2);
        }
    }

    pub fn observe_prediction_latency(&self, seconds: f64) {
        self.prediction_latency_seconds.observe(seconds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.inc_valuations("success");
        metrics.inc_valuations("success");
        assert_eq!(metrics.valuations("success"), 2.0);
        assert_eq!(metrics.valuations("invalid"), 0.0);
    }

    #[test]
    fn test_record_training_sets_gauges() {
        let metrics = Metrics::new().unwrap();
        metrics.record_training("explicit", "success", 1.5, Some(0.93));
        assert_eq!(metrics.model_trained.get(), 1.0);
        assert_eq!(metrics.model_training_r2.get(), 0.93);

        let output = metrics.render();
        assert!(output.contains("valuation_training_runs_total"));
        assert!(output.contains("valuation_model_trained 1"));
    }
}
