//! Router construction

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::{handlers, state::AppState};
use crate::config::ServerConfig;

pub fn create_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let app = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .route("/train", post(handlers::train_model))
        .route("/valuate", post(handlers::valuate_property))
        .route("/market-analysis", post(handlers::market_analysis))
        .fallback(handlers::handle_404)
        .with_state(state);

    // CORS_ORIGIN is validated at config load; `None` allows every origin
    let cors = match &config.cors_origin {
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.clone())
            .allow_methods(Any)
            .allow_headers(Any),
    };

    app.layer(cors).layer(TraceLayer::new_for_http())
}
