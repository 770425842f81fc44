//! Process configuration, read once at startup.
//!
//! Supported environment variables:
//! - `OPENAI_API_KEY`: provider credential; absent or blank forces mock mode
//! - `USE_MOCK_MODE`: force mock mode as the default (`1`, `true`, `yes`)
//! - `PORT`: listening port (default 3001)
//! - `GLYCORISK_BIND`: listening address (default `0.0.0.0`)
//! - `OPENAI_MODEL`: provider model (default `gpt-4.1-mini`)
//! - `OPENAI_BASE_URL`: provider API root (default `https://api.openai.com/v1`)
//! - `GLYCORISK_PROVIDER_TIMEOUT_SECS`: provider call budget (default 30)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use zeroize::Zeroizing;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// Immutable process-wide configuration.
#[derive(Clone)]
pub struct AppConfig {
    pub openai_api_key: Option<Zeroizing<String>>,
    pub force_mock: bool,
    pub bind: IpAddr,
    pub port: u16,
    pub openai_model: String,
    pub openai_base_url: String,
    pub provider_timeout: Duration,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("force_mock", &self.force_mock)
            .field("bind", &self.bind)
            .field("port", &self.port)
            .field("openai_model", &self.openai_model)
            .field("openai_base_url", &self.openai_base_url)
            .field("provider_timeout", &self.provider_timeout)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            force_mock: false,
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            openai_model: DEFAULT_MODEL.to_string(),
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }
}

fn is_truthy(v: &str) -> bool {
    matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

fn parse<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue { name, value })
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `ConfigError` if a numeric or address variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns `ConfigError` if a numeric or address variable does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        cfg.openai_api_key = lookup("OPENAI_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .map(Zeroizing::new);
        cfg.force_mock = lookup("USE_MOCK_MODE").is_some_and(|v| is_truthy(&v));

        if let Some(v) = lookup("PORT") {
            cfg.port = parse("PORT", v)?;
        }
        if let Some(v) = lookup("GLYCORISK_BIND") {
            cfg.bind = parse("GLYCORISK_BIND", v)?;
        }
        if let Some(v) = lookup("OPENAI_MODEL").filter(|v| !v.trim().is_empty()) {
            cfg.openai_model = v.trim().to_string();
        }
        if let Some(v) = lookup("OPENAI_BASE_URL").filter(|v| !v.trim().is_empty()) {
            cfg.openai_base_url = v.trim().to_string();
        }
        if let Some(v) = lookup("GLYCORISK_PROVIDER_TIMEOUT_SECS") {
            let secs: u64 = parse("GLYCORISK_PROVIDER_TIMEOUT_SECS", v.clone())?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    name: "GLYCORISK_PROVIDER_TIMEOUT_SECS",
                    value: v,
                });
            }
            cfg.provider_timeout = Duration::from_secs(secs);
        }

        Ok(cfg)
    }

    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.openai_api_key.is_some()
    }

    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}
