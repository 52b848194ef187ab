//! HTTP server configuration parsing from environment variables.

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::env;

/// Server environment configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Single allowed origin; `None` allows every origin.
    pub cors_origin: Option<HeaderValue>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            cors_origin: None,
        }
    }
}

/// `*` or an empty string means any origin.
pub fn parse_cors_origin(raw: &str) -> Result<Option<HeaderValue>> {
    match raw.trim() {
        "" | "*" => Ok(None),
        origin => origin
            .parse::<HeaderValue>()
            .map(Some)
            .with_context(|| format!("Failed to parse CORS_ORIGIN: {:?}", origin)),
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5001".to_string())
            .parse::<u16>()
            .context("Failed to parse PORT")?;
        let cors_origin =
            parse_cors_origin(&env::var("CORS_ORIGIN").unwrap_or_else(|_| "*".to_string()))?;

        Ok(Self {
            host,
            port,
            cors_origin,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8081,
            cors_origin: None,
        };
        assert_eq!(config.bind_address(), "127.0.0.1:8081");
    }

    #[test]
    fn test_parse_cors_origin() {
        assert!(parse_cors_origin("*").unwrap().is_none());
        assert!(parse_cors_origin("").unwrap().is_none());
        assert_eq!(
            parse_cors_origin("https://app.example.com").unwrap(),
            Some(HeaderValue::from_static("https://app.example.com"))
        );
        assert!(parse_cors_origin("bad\u{7f}origin").is_err());
    }
}
