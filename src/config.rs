// src/config.rs

use std::{env, fmt, net::SocketAddr};

use dotenvy::dotenv;
use url::Url;

/// Database backends reachable through the `Any` driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Sqlite,
}

impl Backend {
    /// Picks the backend from the scheme of a connection string.
    pub fn from_url(database_url: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(database_url).map_err(|e| ConfigError::Invalid {
            key: "DATABASE_URL",
            message: e.to_string(),
        })?;

        match url.scheme() {
            "postgres" | "postgresql" => Ok(Backend::Postgres),
            "sqlite" => Ok(Backend::Sqlite),
            other => Err(ConfigError::Invalid {
                key: "DATABASE_URL",
                message: format!("unsupported scheme '{}'", other),
            }),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, message } => write!(f, "{} is invalid: {}", key, message),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    /// Connection string for the survey database. Treated as a secret.
    pub database_url: String,
    pub rust_log: String,
    pub addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        Backend::from_url(&database_url)?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let addr = env::var("APP_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "APP_ADDR",
                message: e.to_string(),
            })?;

        Ok(Self {
            database_url,
            rust_log,
            addr,
        })
    }
}
