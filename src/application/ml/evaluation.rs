//! Hold-out evaluation of a trained model

use super::model::{TrainedModel, r2_score};
use crate::domain::errors::ValuationError;
use crate::domain::valuation::feature_registry::FeatureVector;
use crate::domain::valuation::types::TrainingSample;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub samples: usize,
    pub r2: f64,
    pub mae: f64,
    pub rmse: f64,
    /// Share of actual prices that fall inside their (rounded) 95% band
    pub interval_coverage: f64,
    pub mean_interval_width: f64,
    pub mean_confidence_score: f64,
}

pub fn evaluate(model: &TrainedModel, samples: &[TrainingSample]) -> Result<EvaluationReport, ValuationError> {
    if samples.is_empty() {
        return Err(ValuationError::internal("cannot evaluate on an empty set"));
    }

    let features: Vec<FeatureVector> = samples.iter().map(|s| s.features).collect();
    let actual: Vec<f64> = samples.iter().map(|s| s.price).collect();
    let raw = model.predict_raw_batch(&features)?;
    let predicted: Vec<f64> = raw.iter().map(|r| r.mean).collect();

    let n = samples.len() as f64;
    let mae = actual
        .iter()
        .zip(&predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / n;
    let rmse = (actual
        .iter()
        .zip(&predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / n)
        .sqrt();

    let valuations: Vec<_> = raw.iter().map(|r| r.into_valuation()).collect();
    let covered = valuations
        .iter()
        .zip(&actual)
        .filter(|(v, a)| v.confidence_interval.contains(**a))
        .count();

    Ok(EvaluationReport {
        samples: samples.len(),
        r2: r2_score(&actual, &predicted),
        mae,
        rmse,
        interval_coverage: covered as f64 / n,
        mean_interval_width: valuations
            .iter()
            .map(|v| v.confidence_interval.width())
            .sum::<f64>()
            / n,
        mean_confidence_score: valuations.iter().map(|v| v.confidence_score).sum::<f64>() / n,
    })
}
