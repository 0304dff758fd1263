//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use secrecy::SecretString;
use trip_core::env::parse_secs;

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Webhook server bind address.
    pub addr: SocketAddr,
    /// HMAC key shared with the core service.
    pub shared_secret: SecretString,
    /// Base URL of the core service.
    pub core_base_url: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `SHARED_SECRET` | HMAC key shared with core | (required) |
    /// | `GATEWAY_ADDR` | Webhook bind address | `127.0.0.1:8081` |
    /// | `CORE_BASE_URL` | Core service URL | `http://localhost:8080` |
    /// | `HTTP_CONNECT_TIMEOUT_SECS` | Connect timeout | `5` |
    /// | `HTTP_READ_TIMEOUT_SECS` | Read timeout | `10` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = lookup("GATEWAY_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8081".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("GATEWAY_ADDR"))?;

        let shared_secret = lookup("SHARED_SECRET")
            .filter(|secret| !secret.trim().is_empty())
            .map(SecretString::from)
            .ok_or(ConfigError::MissingSharedSecret)?;

        let core_base_url = lookup("CORE_BASE_URL").unwrap_or_else(|| "http://localhost:8080".to_string());

        Ok(Self {
            addr,
            shared_secret,
            core_base_url,
            connect_timeout: seconds(&lookup, "HTTP_CONNECT_TIMEOUT_SECS", 5)?,
            read_timeout: seconds(&lookup, "HTTP_READ_TIMEOUT_SECS", 10)?,
        })
    }
}

fn seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    match lookup(key) {
        None => Ok(Duration::from_secs(default)),
        Some(value) => parse_secs(&value).ok_or(ConfigError::Invalid(key)),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SHARED_SECRET environment variable is required")]
    MissingSharedSecret,

    #[error("Invalid {0} value")]
    Invalid(&'static str),
}
