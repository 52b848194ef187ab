//! HTTP request handlers

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json,
    extract::State,
    extract::rejection::JsonRejection,
    http::header,
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::market_insights;
use crate::application::valuation_service::TrainingTrigger;
use crate::domain::errors::ValuationError;
use crate::domain::market::insights::{MarketAnalysis, MarketInsights};
use crate::domain::valuation::ValuationResult;
use crate::domain::valuation::feature_registry::parse_features;

use super::error::{Result, ServerError};
use super::state::AppState;

fn json_body(payload: std::result::Result<Json<Value>, JsonRejection>) -> Result<Value> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ServerError::BadRequest(rejection.body_text()))
}

async fn run_blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> std::result::Result<T, ValuationError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ServerError::Internal(format!("worker task failed: {}", e)))?
        .map_err(ServerError::from)
}

// ============================================================================
// Health
// ============================================================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "model_trained": state.service.is_trained(),
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": (chrono::Utc::now() - state.started_at).num_seconds(),
    }))
}

/// Prometheus text exposition of the service counters
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = (chrono::Utc::now() - state.started_at).num_seconds().max(0);
    state.metrics.uptime_seconds.set(uptime as f64);
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

// ============================================================================
// Model Handlers
// ============================================================================

/// Retrain the model from a fresh synthetic set
pub async fn train_model(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let service = Arc::clone(&state.service);
    let started = Instant::now();
    let trigger = TrainingTrigger::Explicit;

    match run_blocking(move || service.train(trigger)).await {
        Ok(report) => {
            state.metrics.record_training(
                trigger.as_str(),
                "success",
                started.elapsed().as_secs_f64(),
                Some(report.training_r2),
            );
            Ok(Json(json!({
                "message": "Model trained successfully",
                "status": "success",
                "samples": report.samples,
                "n_trees": report.n_trees,
                "training_r2": report.training_r2,
                "duration_ms": report.duration_ms,
            })))
        }
        Err(e) => {
            state.metrics.record_training(
                trigger.as_str(),
                "failure",
                started.elapsed().as_secs_f64(),
                None,
            );
            Err(e)
        }
    }
}

// ============================================================================
// Valuation Handlers
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ValuationResponse {
    pub valuation: ValuationResult,
    pub market_insights: MarketInsights,
    pub timestamp: String,
    /// Request `id` echoed as sent, or `"unknown"`
    pub property_id: Value,
}

/// Value one property and attach market insights
pub async fn valuate_property(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<ValuationResponse>> {
    let result = valuate(&state, payload).await;
    match &result {
        Ok(_) => state.metrics.inc_valuations("success"),
        Err(e) => state.metrics.inc_valuations(e.outcome()),
    }
    result
}

async fn valuate(
    state: &Arc<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<ValuationResponse>> {
    let body = json_body(payload)?;
    let parsed = parse_features(&body)?;
    let request_id = Uuid::new_v4();

    let service = Arc::clone(&state.service);
    let (report, valuation, predict_secs) = run_blocking(move || {
        let report = if service.config().lazy_training {
            service.ensure_trained()?
        } else {
            None
        };
        let started = Instant::now();
        let valuation = service.valuate(&parsed)?;
        Ok((report, valuation, started.elapsed().as_secs_f64()))
    })
    .await?;

    if let Some(report) = &report {
        warn!(%request_id, "Model was untrained; trained on first valuation");
        state.metrics.record_training(
            TrainingTrigger::FirstUse.as_str(),
            "success",
            report.duration_ms as f64 / 1000.0,
            Some(report.training_r2),
        );
    }
    state.metrics.observe_prediction_latency(predict_secs);

    let insights = {
        let mut rng = rand::rng();
        market_insights::market_insights(&body, &mut rng)?
    };

    info!(
        %request_id,
        predicted_value = valuation.predicted_value,
        confidence_score = valuation.confidence_score,
        defaulted = valuation.defaulted_features.len(),
        "Property valuated"
    );

    Ok(Json(ValuationResponse {
        valuation,
        market_insights: insights,
        timestamp: chrono::Utc::now().to_rfc3339(),
        property_id: body
            .get("id")
            .cloned()
            .unwrap_or_else(|| Value::String("unknown".to_string())),
    }))
}

// ============================================================================
// Market Handlers
// ============================================================================

pub async fn market_analysis(
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<MarketAnalysis>> {
    let body = json_body(payload)?;
    let analysis = {
        let mut rng = rand::rng();
        market_insights::market_analysis(&body, &mut rng)?
    };
    Ok(Json(analysis))
}

pub async fn handle_404() -> ServerError {
    ServerError::NotFound("endpoint does not exist".to_string())
}
