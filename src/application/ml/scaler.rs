//! Z-score feature scaling

use crate::domain::errors::ValuationError;
use crate::domain::valuation::feature_registry::{FEATURE_COUNT, FeatureVector};
use statrs::statistics::Statistics;

/// Per-feature mean and population standard deviation.
///
/// A constant column keeps a scale of 1 so it maps to 0 instead of NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: [f64; FEATURE_COUNT],
    scale: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    pub fn fit(rows: &[FeatureVector]) -> Result<Self, ValuationError> {
        if rows.is_empty() {
            return Err(ValuationError::internal("cannot fit scaler on an empty matrix"));
        }

        let mut mean = [0.0; FEATURE_COUNT];
        let mut scale = [1.0; FEATURE_COUNT];
        for col in 0..FEATURE_COUNT {
            let column: Vec<f64> = rows.iter().map(|r| r.values()[col]).collect();
            let m = column.iter().mean();
            let sd = column.iter().population_std_dev();
            if !m.is_finite() || !sd.is_finite() {
                return Err(ValuationError::internal(format!(
                    "non-finite statistics for feature column {}",
                    col
                )));
            }
            mean[col] = m;
            if sd > 0.0 {
                scale[col] = sd;
            }
        }

        Ok(Self { mean, scale })
    }

    pub fn transform(&self, row: &FeatureVector) -> Vec<f64> {
        row.values()
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(x, (m, s))| (x - m) / s)
            .collect()
    }

    pub fn transform_all(&self, rows: &[FeatureVector]) -> Vec<Vec<f64>> {
        rows.iter().map(|r| self.transform(r)).collect()
    }

    pub fn mean(&self) -> &[f64; FEATURE_COUNT] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64; FEATURE_COUNT] {
        &self.scale
    }
}
