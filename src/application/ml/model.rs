use super::forest::{ForestParameters, RandomForest};
use super::predictor::PricePredictor;
use super::scaler::StandardScaler;
use crate::domain::errors::ValuationError;
use crate::domain::valuation::feature_registry::FeatureVector;
use crate::domain::valuation::types::{
    CONFIDENCE_Z, ConfidenceInterval, TrainingSample, ValuationResult, confidence_score,
    round_to_cents,
};
use chrono::{DateTime, Utc};
use statrs::statistics::Statistics;

/// A fitted scaler and forest pair. Immutable once built; retraining builds a
/// new one.
#[derive(Debug)]
pub struct TrainedModel {
    scaler: StandardScaler,
    forest: RandomForest,
    training_r2: f64,
    samples: usize,
    trained_at: DateTime<Utc>,
}

/// Unrounded estimate with the spread of the individual trees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPrediction {
    pub mean: f64,
    pub std_dev: f64,
}

impl RawPrediction {
    fn from_trees(per_tree: &[f64]) -> Self {
        Self {
            mean: per_tree.iter().mean(),
            // Population form: every tree is a member, not a sample.
            std_dev: per_tree.iter().population_std_dev(),
        }
    }

    pub fn into_valuation(self) -> ValuationResult {
        let half_width = CONFIDENCE_Z * self.std_dev;
        ValuationResult {
            predicted_value: round_to_cents(self.mean),
            confidence_interval: ConfidenceInterval {
                lower: round_to_cents(self.mean - half_width),
                upper: round_to_cents(self.mean + half_width),
            },
            confidence_score: confidence_score(self.mean, self.std_dev),
            defaulted_features: Vec::new(),
        }
    }
}

/// Coefficient of determination.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    let mean = actual.iter().mean();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

impl TrainedModel {
    /// Fits the scaler on the raw features, then the forest on the scaled ones.
    pub fn fit(samples: &[TrainingSample], params: &ForestParameters) -> Result<Self, ValuationError> {
        let features: Vec<FeatureVector> = samples.iter().map(|s| s.features).collect();
        let targets: Vec<f64> = samples.iter().map(|s| s.price).collect();

        let scaler = StandardScaler::fit(&features)?;
        let scaled = scaler.transform_all(&features);
        let forest = RandomForest::fit(&scaled, &targets, params)?;

        let fitted: Vec<f64> = forest
            .tree_predictions_batch(&scaled)?
            .iter()
            .map(|per_tree| per_tree.iter().mean())
            .collect();
        let training_r2 = r2_score(&targets, &fitted);

        Ok(Self {
            scaler,
            forest,
            training_r2,
            samples: samples.len(),
            trained_at: Utc::now(),
        })
    }

    pub fn predict_raw(&self, features: &FeatureVector) -> Result<RawPrediction, ValuationError> {
        let scaled = self.scaler.transform(features);
        let per_tree = self.forest.tree_predictions(&scaled)?;
        Ok(RawPrediction::from_trees(&per_tree))
    }

    /// Raw predictions for many properties at once.
    pub fn predict_raw_batch(&self, rows: &[FeatureVector]) -> Result<Vec<RawPrediction>, ValuationError> {
        let scaled = self.scaler.transform_all(rows);
        Ok(self
            .forest
            .tree_predictions_batch(&scaled)?
            .iter()
            .map(|per_tree| RawPrediction::from_trees(per_tree))
            .collect())
    }

    pub fn training_r2(&self) -> f64 {
        self.training_r2
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn n_trees(&self) -> usize {
        self.forest.n_trees()
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }
}

impl PricePredictor for TrainedModel {
    fn predict(&self, features: &FeatureVector) -> Result<ValuationResult, ValuationError> {
        let raw = self.predict_raw(features)?;
        if !raw.mean.is_finite() {
            return Err(ValuationError::internal("ensemble produced a non-finite prediction"));
        }
        Ok(raw.into_valuation())
    }

    fn name(&self) -> &str {
        "SmartCore Bagged Regression Trees"
    }

    fn version(&self) -> &str {
        "v1.0"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ml::synthetic::SyntheticDataGenerator;

    fn small_model() -> TrainedModel {
        let samples = SyntheticDataGenerator::new(42).generate(300);
        let params = ForestParameters {
            n_trees: 15,
            ..ForestParameters::default()
        };
        TrainedModel::fit(&samples, &params).unwrap()
    }

    fn typical_house() -> FeatureVector {
        let mut f = FeatureVector::default();
        f.set("square_feet", 2000.0);
        f.set("bedrooms", 3.0);
        f.set("bathrooms", 2.0);
        f
    }

    #[test]
    fn test_r2_score() {
        assert_eq!(r2_score(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), 1.0);
        assert_eq!(r2_score(&[1.0, 2.0, 3.0], &[2.0, 2.0, 2.0]), 0.0);
    }

    #[test]
    fn test_fit_reports_training_fit() {
        let model = small_model();
        assert_eq!(model.samples(), 300);
        assert_eq!(model.n_trees(), 15);
        assert!(model.training_r2() > 0.5, "r2 = {}", model.training_r2());
    }

    #[test]
    fn test_prediction_is_repeatable() {
        let model = small_model();
        let a = model.predict(&typical_house()).unwrap();
        let b = model.predict(&typical_house()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_interval_is_symmetric_and_score_bounded() {
        let model = small_model();
        let v = model.predict(&typical_house()).unwrap();
        let up = v.confidence_interval.upper - v.predicted_value;
        let down = v.predicted_value - v.confidence_interval.lower;
        assert!((up - down).abs() <= 0.011, "up = {}, down = {}", up, down);
        assert!(v.predicted_value.is_finite() && v.predicted_value > 0.0);
        assert!((0.0..=100.0).contains(&v.confidence_score));
    }

    #[test]
    fn test_raw_prediction_rounding() {
        let raw = RawPrediction {
            mean: 250_000.126,
            std_dev: 10_000.0,
        };
        let v = raw.into_valuation();
        assert_eq!(v.predicted_value, 250_000.13);
        assert_eq!(v.confidence_interval.lower, 230_400.13);
        assert_eq!(v.confidence_interval.upper, 269_600.13);
        assert!((v.confidence_score - 96.0).abs() < 1e-3);
    }

    #[test]
    fn test_batch_agrees_with_single() {
        let model = small_model();
        let rows = vec![typical_house(), FeatureVector::default()];
        let batch = model.predict_raw_batch(&rows).unwrap();
        assert_eq!(batch[0], model.predict_raw(&rows[0]).unwrap());
        assert_eq!(batch[1], model.predict_raw(&rows[1]).unwrap());
    }
}
