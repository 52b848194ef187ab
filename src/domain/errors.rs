use thiserror::Error;

/// Errors raised while turning a request body into model input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Field {field} must be a number, got {found}")]
    NotNumeric { field: String, found: String },

    #[error("Request body must be a JSON object")]
    NotAnObject,
}

/// Errors surfaced by the valuation pipeline
#[derive(Debug, Error)]
pub enum ValuationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Valuation model is not trained yet")]
    ModelNotReady,

    #[error("Internal computation error: {reason}")]
    InternalComputation { reason: String },
}

impl ValuationError {
    pub fn internal(reason: impl Into<String>) -> Self {
        ValuationError::InternalComputation {
            reason: reason.into(),
        }
    }

    /// Only an untrained model is worth retrying: a later `/train` call fixes it.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ValuationError::ModelNotReady)
    }
}
