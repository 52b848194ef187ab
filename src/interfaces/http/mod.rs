//! REST interface of the valuation service.
//!
//! `GET /health`, `GET /metrics`, `POST /train`, `POST /valuate`, `POST /market-analysis`.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::AppState;

use crate::config::ServerConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Serve until ctrl+c
pub async fn run_server(config: ServerConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let start_time = state.started_at;
    let app = create_router(state, &config);

    let addr: SocketAddr = config.bind_address().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        address = %addr,
        pid = std::process::id(),
        cors_origin = ?config.cors_origin,
        "Valuation API listening"
    );

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install CTRL+C signal handler: {}", e);
            std::future::pending::<()>().await;
        }
        let uptime = chrono::Utc::now().signed_duration_since(start_time);
        info!(
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}
