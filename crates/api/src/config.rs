//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use secrecy::SecretString;
use trip_core::env::{parse_bool, parse_secs, parse_threshold};

/// Core service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// HMAC key shared with the bot gateway.
    pub shared_secret: SecretString,
    /// Base URL of the bot gateway.
    pub gateway_base_url: String,
    /// SQLite database URL.
    pub database_url: String,
    /// Routing API key; empty selects stub routes.
    pub routing_api_key: Option<SecretString>,
    /// Force stub routes even when a key is set.
    pub routing_stub_enabled: bool,
    /// Outbound HTTP connect timeout.
    pub connect_timeout: Duration,
    /// Outbound HTTP read timeout.
    pub read_timeout: Duration,
    /// Default deviation threshold for new trips.
    pub deviation_threshold_meters: f64,
    /// How often pending SOS alerts are retried.
    pub sos_sweep_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `SHARED_SECRET` | HMAC key shared with the gateway | (required) |
    /// | `CORE_ADDR` | Server bind address | `127.0.0.1:8080` |
    /// | `GATEWAY_BASE_URL` | Bot gateway URL | `http://localhost:8081` |
    /// | `DB_URL` | SQLite database URL | `sqlite:safewalk.db?mode=rwc` |
    /// | `ROUTING_API_KEY` | TomTom API key | (none) |
    /// | `ROUTING_STUB_ENABLED` | Use stub routes | `true` |
    /// | `HTTP_CONNECT_TIMEOUT_SECS` | Outbound connect timeout | `5` |
    /// | `HTTP_READ_TIMEOUT_SECS` | Outbound read timeout | `10` |
    /// | `DEVIATION_THRESHOLD_METERS` | Default deviation threshold | `30` |
    /// | `SOS_SWEEP_INTERVAL_SECS` | SOS retry sweep interval | `15` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let addr = var("CORE_ADDR", "127.0.0.1:8080")
            .parse()
            .map_err(|_| ConfigError::Invalid("CORE_ADDR"))?;

        let shared_secret = lookup("SHARED_SECRET")
            .filter(|secret| !secret.trim().is_empty())
            .map(SecretString::from)
            .ok_or(ConfigError::MissingSharedSecret)?;

        let routing_api_key = lookup("ROUTING_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .map(SecretString::from);

        let routing_stub_enabled = parse_bool(&var("ROUTING_STUB_ENABLED", "true"))
            .ok_or(ConfigError::Invalid("ROUTING_STUB_ENABLED"))?;

        let deviation_threshold_meters = parse_threshold(&var("DEVIATION_THRESHOLD_METERS", "30"))
            .ok_or(ConfigError::Invalid("DEVIATION_THRESHOLD_METERS"))?;

        Ok(Self {
            addr,
            shared_secret,
            gateway_base_url: var("GATEWAY_BASE_URL", "http://localhost:8081"),
            database_url: var("DB_URL", "sqlite:safewalk.db?mode=rwc"),
            routing_api_key,
            routing_stub_enabled,
            connect_timeout: seconds(&lookup, "HTTP_CONNECT_TIMEOUT_SECS", 5)?,
            read_timeout: seconds(&lookup, "HTTP_READ_TIMEOUT_SECS", 10)?,
            deviation_threshold_meters,
            sos_sweep_interval: seconds(&lookup, "SOS_SWEEP_INTERVAL_SECS", 15)?,
        })
    }

    /// Builder method to replace the port of the bind address.
    pub fn with_port(mut self, port: u16) -> Self {
        self.addr.set_port(port);
        self
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
