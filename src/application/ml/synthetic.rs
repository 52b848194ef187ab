//! Synthetic labeled training data.
//!
//! Prices follow a fixed linear formula of the features plus Gaussian noise,
//! so the forest always has a self-consistent target to learn.

use crate::domain::valuation::feature_registry::{FEATURE_COUNT, FeatureVector};
use crate::domain::valuation::types::{MIN_TRAINING_PRICE, TrainingSample};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// Year the age penalty is measured from.
pub const REFERENCE_YEAR: f64 = 2024.0;

/// Standard deviation of the additive price noise.
pub const PRICE_NOISE_SD: f64 = 50_000.0;

/// How one feature column is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureDistribution {
    Normal { mean: f64, sd: f64 },
    Uniform { low: f64, high: f64 },
    /// Inclusive on both ends.
    DiscreteUniform { low: i64, high: i64 },
}

impl FeatureDistribution {
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        match *self {
            FeatureDistribution::Normal { mean, sd } => sample_normal(rng, mean, sd),
            FeatureDistribution::Uniform { low, high } => rng.random_range(low..high),
            FeatureDistribution::DiscreteUniform { low, high } => {
                rng.random_range(low..=high) as f64
            }
        }
    }
}

/// Column distributions, in `FEATURE_NAMES` order.
pub const FEATURE_DISTRIBUTIONS: [FeatureDistribution; FEATURE_COUNT] = [
    // square_feet
    FeatureDistribution::Normal { mean: 2000.0, sd: 500.0 },
    // bedrooms
    FeatureDistribution::DiscreteUniform { low: 1, high: 5 },
    // bathrooms
    FeatureDistribution::DiscreteUniform { low: 1, high: 3 },
    // lot_size
    FeatureDistribution::Normal { mean: 8000.0, sd: 2000.0 },
    // year_built
    FeatureDistribution::DiscreteUniform { low: 1950, high: 2023 },
    // neighborhood_score
    FeatureDistribution::Uniform { low: 1.0, high: 10.0 },
    // walkability_score
    FeatureDistribution::Uniform { low: 0.0, high: 100.0 },
    // school_rating
    FeatureDistribution::Uniform { low: 1.0, high: 10.0 },
    // crime_rate
    FeatureDistribution::Uniform { low: 0.0, high: 50.0 },
    // median_income
    FeatureDistribution::Normal { mean: 60000.0, sd: 20000.0 },
    // price_per_sqft_area
    FeatureDistribution::Normal { mean: 150.0, sd: 50.0 },
    // days_on_market_avg
    FeatureDistribution::Normal { mean: 30.0, sd: 15.0 },
    // property_tax_rate
    FeatureDistribution::Uniform { low: 0.5, high: 3.0 },
];

/// Box-Muller draw from Normal(mean, sd)
pub fn sample_normal<R: Rng>(rng: &mut R, mean: f64, sd: f64) -> f64 {
    let u1: f64 = rng.random::<f64>().max(1e-10);
    let u2: f64 = rng.random::<f64>();
    mean + (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos() * sd
}

/// Noise-free price of a property. Walkability, area price, days on market
/// and tax rate are deliberately left out of the formula.
pub fn base_price(f: &FeatureVector) -> f64 {
    let v = f.values();
    v[0] * 100.0 // square_feet
        + v[1] * 15_000.0 // bedrooms
        + v[2] * 10_000.0 // bathrooms
        + v[3] * 5.0 // lot_size
        + (REFERENCE_YEAR - v[4]) * -500.0 // age
        + v[5] * 20_000.0 // neighborhood_score
        + v[7] * 15_000.0 // school_rating
        + (10.0 - v[8]) * 2_000.0 // crime_rate
        + v[9] * 2.0 // median_income
}

/// Deterministic generator of labeled properties.
#[derive(Debug, Clone)]
pub struct SyntheticDataGenerator {
    seed: u64,
}

impl SyntheticDataGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// `n` samples; the same seed always yields the same samples.
    ///
    /// Columns are drawn one feature at a time, then the noise column.
    pub fn generate(&self, n: usize) -> Vec<TrainingSample> {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut rows = vec![[0.0; FEATURE_COUNT]; n];
        for (col, distribution) in FEATURE_DISTRIBUTIONS.iter().enumerate() {
            for row in rows.iter_mut() {
                row[col] = distribution.sample(&mut rng);
            }
        }

        rows.into_iter()
            .map(|values| {
                let features = FeatureVector::new(values);
                let noise = sample_normal(&mut rng, 0.0, PRICE_NOISE_SD);
                TrainingSample {
                    features,
                    price: (base_price(&features) + noise).max(MIN_TRAINING_PRICE),
                }
            })
            .collect()
    }
}

impl Default for SyntheticDataGenerator {
    fn default() -> Self {
        Self::new(42)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_deterministic() {
        let generator = SyntheticDataGenerator::new(7);
        let a = generator.generate(200);
        let b = generator.generate(200);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = SyntheticDataGenerator::new(1).generate(50);
        let b = SyntheticDataGenerator::new(2).generate(50);
        assert_ne!(a, b);
    }

    #[test]
    fn test_prices_are_floored() {
        let samples = SyntheticDataGenerator::default().generate(1000);
        assert_eq!(samples.len(), 1000);
        assert!(samples.iter().all(|s| s.price >= MIN_TRAINING_PRICE));
    }

    #[test]
    fn test_discrete_columns_stay_in_range() {
        let samples = SyntheticDataGenerator::default().generate(500);
        for s in &samples {
            let bedrooms = s.features.get("bedrooms").unwrap();
            let bathrooms = s.features.get("bathrooms").unwrap();
            let year = s.features.get("year_built").unwrap();
            assert!((1.0..=5.0).contains(&bedrooms) && bedrooms.fract() == 0.0);
            assert!((1.0..=3.0).contains(&bathrooms) && bathrooms.fract() == 0.0);
            assert!((1950.0..=2023.0).contains(&year));
        }
    }

    #[test]
    fn test_square_feet_moments() {
        let samples = SyntheticDataGenerator::default().generate(5000);
        let n = samples.len() as f64;
        let mean = samples.iter().map(|s| s.features.values()[0]).sum::<f64>() / n;
        let var = samples
            .iter()
            .map(|s| (s.features.values()[0] - mean).powi(2))
            .sum::<f64>()
            / n;
        assert!((mean - 2000.0).abs() < 30.0, "mean = {}", mean);
        assert!((var.sqrt() - 500.0).abs() < 30.0, "sd = {}", var.sqrt());
    }

    #[test]
    fn test_base_price_formula() {
        let mut f = FeatureVector::default();
        f.set("square_feet", 1000.0);
        f.set("year_built", 2024.0);
        f.set("crime_rate", 10.0);
        assert_eq!(base_price(&f), 100_000.0);

        f.set("walkability_score", 99.0);
        assert_eq!(base_price(&f), 100_000.0);
    }

    #[test]
    fn test_empty_request() {
        assert!(SyntheticDataGenerator::default().generate(0).is_empty());
    }
}
