use crate::domain::errors::ValidationError;
use serde_json::{Map, Value};

/// Ordered list of feature names.
/// This order MUST match the column order the scaler and forest were fitted on.
/// Any change here invalidates trained models.
pub const FEATURE_NAMES: &[&str] = &[
    "square_feet",
    "bedrooms",
    "bathrooms",
    "lot_size",
    "year_built",
    "neighborhood_score",
    "walkability_score",
    "school_rating",
    "crime_rate",
    "median_income",
    "price_per_sqft_area",
    "days_on_market_avg",
    "property_tax_rate",
];

pub const FEATURE_COUNT: usize = 13;

/// Fields a `/valuate` request must carry.
pub const REQUIRED_FEATURES: &[&str] = &["square_feet", "bedrooms", "bathrooms"];

/// Value substituted for any optional feature absent from a request.
pub const MISSING_FEATURE_DEFAULT: f64 = 0.0;

/// Ordered feature vector, indexed like `FEATURE_NAMES`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self {
            values: [MISSING_FEATURE_DEFAULT; FEATURE_COUNT],
        }
    }
}

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    /// Value of a named feature, `None` if the name is not registered.
    pub fn get(&self, name: &str) -> Option<f64> {
        feature_index(name).map(|i| self.values[i])
    }

    pub fn set(&mut self, name: &str, value: f64) -> bool {
        match feature_index(name) {
            Some(i) => {
                self.values[i] = value;
                true
            }
            None => false,
        }
    }
}

pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_NAMES.iter().position(|n| *n == name)
}

/// A request body parsed into model input.
#[derive(Debug, Clone)]
pub struct ParsedFeatures {
    pub vector: FeatureVector,
    /// Features absent (or null) in the body, replaced by `MISSING_FEATURE_DEFAULT`.
    pub defaulted: Vec<String>,
}

/// Builds a `FeatureVector` from a JSON object.
///
/// Required fields must be present and non-null. Optional features that are
/// absent fall back to `MISSING_FEATURE_DEFAULT` and are reported in
/// `defaulted`. Keys that are not features (`id`, `address`, ...) are ignored.
pub fn parse_features(body: &Value) -> Result<ParsedFeatures, ValidationError> {
    let object = body.as_object().ok_or(ValidationError::NotAnObject)?;

    for field in REQUIRED_FEATURES {
        if matches!(object.get(*field), None | Some(Value::Null)) {
            return Err(ValidationError::MissingField {
                field: field.to_string(),
            });
        }
    }

    let mut vector = FeatureVector::default();
    let mut defaulted = Vec::new();
    for (i, name) in FEATURE_NAMES.iter().enumerate() {
        match numeric_field(object, name)? {
            Some(value) => vector.values[i] = value,
            None => defaulted.push(name.to_string()),
        }
    }

    Ok(ParsedFeatures { vector, defaulted })
}

/// Reads a numeric field; `Ok(None)` when absent or null.
pub fn numeric_field(object: &Map<String, Value>, name: &str) -> Result<Option<f64>, ValidationError> {
    match object.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_f64().map(Some).ok_or_else(|| ValidationError::NotNumeric {
            field: name.to_string(),
            found: n.to_string(),
        }),
        Some(other) => Err(ValidationError::NotNumeric {
            field: name.to_string(),
            found: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feature_vector_length() {
        assert_eq!(FEATURE_NAMES.len(), FEATURE_COUNT);
        assert_eq!(FeatureVector::default().values().len(), FEATURE_NAMES.len());
    }

    #[test]
    fn test_required_features_are_registered() {
        for name in REQUIRED_FEATURES {
            assert!(feature_index(name).is_some(), "{} not registered", name);
        }
    }

    #[test]
    fn test_parse_defaults_missing_optional_features() {
        let parsed = parse_features(&json!({
            "square_feet": 2000,
            "bedrooms": 3,
            "bathrooms": 2,
        }))
        .unwrap();

        assert_eq!(parsed.vector.get("square_feet"), Some(2000.0));
        assert_eq!(parsed.vector.get("bathrooms"), Some(2.0));
        assert_eq!(parsed.vector.get("year_built"), Some(0.0));
        assert_eq!(parsed.defaulted.len(), FEATURE_COUNT - 3);
        assert!(parsed.defaulted.contains(&"lot_size".to_string()));
    }

    #[test]
    fn test_parse_rejects_missing_required_field() {
        let err = parse_features(&json!({"square_feet": 2000, "bathrooms": 2})).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                field: "bedrooms".to_string()
            }
        );
    }

    #[test]
    fn test_parse_rejects_non_numeric_feature() {
        let err = parse_features(&json!({
            "square_feet": 2000,
            "bedrooms": 3,
            "bathrooms": 2,
            "crime_rate": "low",
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::NotNumeric { ref field, .. } if field == "crime_rate"));
    }

    #[test]
    fn test_parse_ignores_non_feature_keys() {
        let parsed = parse_features(&json!({
            "id": "prop-17",
            "address": "12 Elm St",
            "square_feet": 1500.5,
            "bedrooms": 2,
            "bathrooms": 1,
            "year_built": null,
        }))
        .unwrap();
        assert_eq!(parsed.vector.get("square_feet"), Some(1500.5));
        assert!(parsed.defaulted.contains(&"year_built".to_string()));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert_eq!(
            parse_features(&json!([1, 2, 3])).unwrap_err(),
            ValidationError::NotAnObject
        );
    }
}
