//! API server configuration.
//!
//! Configuration is loaded from environment variables (after `.env`, when
//! present) with fallback to defaults.

use axum::http::{header, HeaderValue, Method};
use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use tower_http::cors::CorsLayer;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, for local runs
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidValue("LOG_FORMAT".to_string())),
        }
    }
}

/// API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Bind address
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Pool size
    pub database_max_connections: u32,

    /// Host the web front end is served from
    pub frontend_uri: String,

    /// Port the web front end is served from
    pub frontend_port: u16,

    pub log_format: LogFormat,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = ApiConfig {
            host: var("BACKEND_HOST", "0.0.0.0"),

            port: var("BACKEND_PORT", "8000")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BACKEND_PORT".to_string()))?,

            database_path: var("DATABASE_PATH", "ventas.db"),

            database_max_connections: var("DATABASE_MAX_CONNECTIONS", "5")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".to_string()))?,

            frontend_uri: var("FRONTEND_URI", "localhost"),

            frontend_port: var("FRONTEND_PORT", "5173")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("FRONTEND_PORT".to_string()))?,

            log_format: var("LOG_FORMAT", "pretty").parse()?,
        };

        if config.database_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("DATABASE_PATH".to_string()));
        }

        if config.database_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "DATABASE_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Address the server binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("BACKEND_HOST".to_string()))
    }

    /// Origin of the web front end.
    pub fn frontend_origin(&self) -> String {
        format!("http://{}:{}", self.frontend_uri, self.frontend_port)
    }

    /// CORS policy admitting the web front end, with credentials.
    pub fn cors_layer(&self) -> Result<CorsLayer, ConfigError> {
        let origin = HeaderValue::from_str(&self.frontend_origin())
            .map_err(|_| ConfigError::InvalidValue("FRONTEND_URI".to_string()))?;

        Ok(CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
