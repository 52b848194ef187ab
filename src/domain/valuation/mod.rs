pub mod feature_registry;
pub mod types;

pub use feature_registry::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector, ParsedFeatures, parse_features};
pub use types::{ConfidenceInterval, TrainingReport, TrainingSample, ValuationResult};
