//! Valuation Server - REST API for property valuations
//!
//! Trains the model on startup (unless disabled), then serves
//! `/health`, `/train`, `/valuate` and `/market-analysis`.
//!
//! # Usage
//! ```sh
//! PORT=5001 N_TREES=100 cargo run --bin server
//! ```
//!
//! # Environment Variables
//! - `PORT` / `HOST` - Listening address (default: 0.0.0.0:5001)
//! - `TRAIN_ON_STARTUP` - Fit the model before accepting requests (default: true)
//! - `LAZY_TRAINING` - Train on the first valuation if still untrained (default: true)
//! - `OBSERVABILITY_INTERVAL` - Seconds between metric outputs (default: 60)

use anyhow::{Context, Result};
use homevalue::application::valuation_service::{TrainingTrigger, ValuationService};
use homevalue::config::Config;
use homevalue::infrastructure::observability::{Metrics, MetricsReporter};
use homevalue::interfaces::http::{AppState, run_server};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("Property Valuation Service {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: samples={}, trees={}, seed={}, lazy_training={}",
        config.model.training_samples,
        config.model.n_trees,
        config.model.seed,
        config.model.lazy_training
    );

    let metrics = Metrics::new()?;
    let service = Arc::new(ValuationService::new(config.model.clone()));

    if config.model.train_on_startup {
        info!("Training initial model...");
        let started = Instant::now();
        let trainer = Arc::clone(&service);
        let report = tokio::task::spawn_blocking(move || trainer.train(TrainingTrigger::Startup))
            .await
            .context("Startup training task panicked")?
            .context("Startup training failed")?;
        metrics.record_training(
            TrainingTrigger::Startup.as_str(),
            "success",
            started.elapsed().as_secs_f64(),
            Some(report.training_r2),
        );
        info!("Model trained with R² score: {:.3}", report.training_r2);
    } else {
        info!("Startup training disabled; model will train on /train or first valuation");
    }

    if config.observability.enabled {
        let reporter = MetricsReporter::new(
            Arc::clone(&service),
            metrics.clone(),
            config.observability.interval_seconds,
        );
        tokio::spawn(async move {
            reporter.run().await;
        });
        info!(
            "Metrics reporter started (interval: {}s)",
            config.observability.interval_seconds
        );
    } else {
        info!("Metrics reporting disabled.");
    }

    let state = Arc::new(AppState::new(service, metrics));
    info!("Valuation service ready!");
    run_server(config.server, state).await
}
