use super::feature_registry::FeatureVector;
use serde::{Deserialize, Serialize};

/// Every generated training price is floored here.
pub const MIN_TRAINING_PRICE: f64 = 50_000.0;

/// z-value of the two-sided 95% band.
pub const CONFIDENCE_Z: f64 = 1.96;

/// A labeled synthetic property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSample {
    pub features: FeatureVector,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Point estimate plus the heuristic dispersion band around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub predicted_value: f64,
    pub confidence_interval: ConfidenceInterval,
    /// 0..=100, higher means the trees agree more.
    pub confidence_score: f64,
    /// Features substituted with the default because the request omitted them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defaulted_features: Vec<String>,
}

/// Summary of one completed training cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub samples: usize,
    pub n_trees: usize,
    pub training_r2: f64,
    pub duration_ms: u64,
    pub trained_at: chrono::DateTime<chrono::Utc>,
}

pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `clamp(100 - spread / prediction * 100, 0, 100)`.
///
/// A non-positive prediction or a non-finite spread scores 0 rather than
/// dividing by zero.
pub fn confidence_score(prediction: f64, spread: f64) -> f64 {
    if prediction <= 0.0 || !prediction.is_finite() || !spread.is_finite() {
        return 0.0;
    }
    (100.0 - spread / prediction * 100.0).clamp(0.0, 100.0)
}
