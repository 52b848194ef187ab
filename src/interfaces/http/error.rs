//! Error types for the HTTP interface

use crate::domain::errors::{ValidationError, ValuationError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Valuation(#[from] ValuationError),

    #[error("{0}")]
    Internal(String),
}

impl From<ValidationError> for ServerError {
    fn from(e: ValidationError) -> Self {
        ServerError::Valuation(ValuationError::Validation(e))
    }
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Valuation(ValuationError::Validation(_)) => StatusCode::BAD_REQUEST,
            ServerError::Valuation(ValuationError::ModelNotReady) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Valuation(ValuationError::InternalComputation { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Label used for the valuation outcome counter
    pub fn outcome(&self) -> &'static str {
        match self {
            ServerError::BadRequest(_) | ServerError::NotFound(_) => "invalid",
            ServerError::Valuation(ValuationError::Validation(_)) => "invalid",
            ServerError::Valuation(ValuationError::ModelNotReady) => "not_ready",
            _ => "error",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(detail = %self, status = status.as_u16(), "Request failed");
        }

        let mut body = json!({ "error": self.to_string() });
        if let ServerError::Valuation(e) = &self {
            body["retryable"] = json!(e.is_retryable());
        }

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let missing: ServerError = ValidationError::MissingField {
            field: "bedrooms".to_string(),
        }
        .into();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(missing.to_string(), "Missing required field: bedrooms");

        assert_eq!(
            ServerError::from(ValuationError::ModelNotReady).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ServerError::from(ValuationError::internal("nan")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(ServerError::BadRequest("x".into()).outcome(), "invalid");
        assert_eq!(ServerError::from(ValuationError::ModelNotReady).outcome(), "not_ready");
        assert_eq!(ServerError::Internal("x".into()).outcome(), "error");
    }
}
