//! Service configuration
//!
//! Layered defaults overridden by `WEATHER_*` environment variables.

use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

const ENV_PREFIX: &str = "WEATHER";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// Process configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Listen address
    pub host: String,
    pub port: u16,

    /// sqlx SQLite connection string
    pub database_url: String,

    /// Open-Meteo base URL (without path)
    pub provider_base_url: String,
    /// Bound on the outbound provider request
    pub provider_timeout_secs: u64,

    /// HTML-to-PDF engine executable
    pub pdf_engine: String,
    /// Engine arguments, whitespace separated
    pub pdf_engine_args: String,

    pub log_format: LogFormat,
    /// Expose Prometheus metrics on `/metrics`
    pub metrics_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            database_url: "sqlite://weather.sqlite3".to_string(),
            provider_base_url: weather_client::DEFAULT_BASE_URL.to_string(),
            provider_timeout_secs: 30,
            pdf_engine: "wkhtmltopdf".to_string(),
            pdf_engine_args: "--quiet - -".to_string(),
            log_format: LogFormat::Text,
            metrics_enabled: true,
        }
    }
}

impl Settings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    /// Load settings from an explicit variable map (keys like `WEATHER_PORT`)
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::load(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(Some(vars)),
        )
    }

    fn load(environment: Environment) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("database_url", defaults.database_url)?
            .set_default("provider_base_url", defaults.provider_base_url)?
            .set_default("provider_timeout_secs", defaults.provider_timeout_secs)?
            .set_default("pdf_engine", defaults.pdf_engine)?
            .set_default("pdf_engine_args", defaults.pdf_engine_args)?
            .set_default("log_format", "text")?
            .set_default("metrics_enabled", defaults.metrics_enabled)?
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}
