//! Configuration module for the valuation service.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Server, Model, and Observability.

mod model_config;
mod observability_config;
mod server_config;

pub use model_config::ModelConfig;
pub use observability_config::ObservabilityEnvConfig;
pub use server_config::{ServerConfig, parse_cors_origin};

use anyhow::{Context, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let server = ServerConfig::from_env().context("Failed to load server config")?;
        let model = ModelConfig::from_env().context("Failed to load model config")?;
        let observability = ObservabilityEnvConfig::from_env();

        Ok(Self {
            server,
            model,
            observability,
        })
    }
}
