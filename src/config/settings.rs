//! Application settings loaded from environment variables.

use std::env;
use std::time::Duration;

use super::constants::{
    DEFAULT_CACHE_OP_TIMEOUT_MS, DEFAULT_POSTGRES_DB, DEFAULT_POSTGRES_HOST,
    DEFAULT_POSTGRES_PASSWORD, DEFAULT_POSTGRES_PORT, DEFAULT_POSTGRES_USER, DEFAULT_REDIS_URL,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_TX_TIMEOUT_MS,
};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    /// Run without Redis when false
    pub cache_enabled: bool,
    pub cache_op_timeout_ms: u64,
    /// Per-transaction deadline, 0 disables
    pub tx_timeout_ms: u64,
    pub server_host: String,
    pub server_port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("cache_enabled", &self.cache_enabled)
            .field("cache_op_timeout_ms", &self.cache_op_timeout_ms)
            .field("tx_timeout_ms", &self.tx_timeout_ms)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is read first if present. When `DATABASE_URL` is not
    /// set, the URL is composed from the `POSTGRES_*` variables.
    pub fn from_env() -> Self {
        if dotenvy::dotenv().is_err() {
            tracing::debug!(".env file not found, using environment variables");
        }

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| postgres_url_from_env()),
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            cache_enabled: env::var("CACHE_ENABLED")
                .ok()
                .and_then(|v| parse_bool(&v))
                .unwrap_or(true),
            cache_op_timeout_ms: env::var("CACHE_OP_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CACHE_OP_TIMEOUT_MS),
            tx_timeout_ms: env::var("TX_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TX_TIMEOUT_MS),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
        }
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Transaction deadline, `None` when disabled.
    pub fn tx_timeout(&self) -> Option<Duration> {
        (self.tx_timeout_ms > 0).then(|| Duration::from_millis(self.tx_timeout_ms))
    }

    pub fn cache_op_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_op_timeout_ms)
    }
}

fn postgres_url_from_env() -> String {
    let host = env::var("POSTGRES_HOST").unwrap_or_else(|_| DEFAULT_POSTGRES_HOST.to_string());
    let db = env::var("POSTGRES_DB").unwrap_or_else(|_| DEFAULT_POSTGRES_DB.to_string());
    let user = env::var("POSTGRES_USER").unwrap_or_else(|_| DEFAULT_POSTGRES_USER.to_string());
    let password =
        env::var("POSTGRES_PASSWORD").unwrap_or_else(|_| DEFAULT_POSTGRES_PASSWORD.to_string());

    format!(
        "postgres://{}:{}@{}:{}/{}?sslmode=disable",
        user, password, host, DEFAULT_POSTGRES_PORT, db
    )
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
