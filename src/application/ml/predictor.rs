use crate::domain::errors::ValuationError;
use crate::domain::valuation::feature_registry::FeatureVector;
use crate::domain::valuation::types::ValuationResult;

/// Interface for property price models
pub trait PricePredictor: Send + Sync {
    /// Point estimate, 95% band and confidence score for one property
    fn predict(&self, features: &FeatureVector) -> Result<ValuationResult, ValuationError>;

    /// Get model name/type
    fn name(&self) -> &str;

    /// Get model version/id
    fn version(&self) -> &str;
}
