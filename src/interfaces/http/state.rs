//! Application state shared across handlers

use crate::application::valuation_service::ValuationService;
use crate::infrastructure::observability::Metrics;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct AppState {
    pub service: Arc<ValuationService>,
    pub metrics: Metrics,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(service: Arc<ValuationService>, metrics: Metrics) -> Self {
        Self {
            service,
            metrics,
            started_at: Utc::now(),
        }
    }
}
