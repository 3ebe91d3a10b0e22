//! Process configuration assembled from the environment at startup.

use std::path::Path;

use crate::api::{ApiConfig, ApiError};
use crate::gate::{GateConfig, GateConfigError};
use crate::session::{CookieSettings, DEFAULT_TOKEN_COOKIE_NAME};

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT: {0}")]
    InvalidPort(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Gate(#[from] GateConfigError),
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub api: ApiConfig,
    pub cookies: CookieSettings,
    pub gate: GateConfig,
}

impl GatewayConfig {
    /// Build the full configuration from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `AUTH_TOKEN_COOKIE_NAME`: default `auth_token`
    /// - `COOKIE_SECURE`: default false
    /// - `ACCESS_RULES_PATH`: YAML rule file; built-in rules when unset
    /// - everything [`ApiConfig::from_env`] reads
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is not a port number, the API base URL is
    /// invalid, or the rule file cannot be loaded.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_port(std::env::var("PORT").ok().as_deref())?;
        let api = ApiConfig::from_env()?;
        let cookies = CookieSettings {
            token_cookie_name: token_cookie_name(std::env::var("AUTH_TOKEN_COOKIE_NAME").ok().as_deref()),
            secure: env_bool("COOKIE_SECURE").unwrap_or(false),
        };
        let gate = match std::env::var("ACCESS_RULES_PATH") {
            Ok(path) if !path.trim().is_empty() => {
                tracing::info!(%path, "loading access rules");
                GateConfig::load(Path::new(path.trim()))?
            }
            _ => GateConfig::default(),
        };
        Ok(Self { port, api, cookies, gate })
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api: ApiConfig::default(),
            cookies: CookieSettings::default(),
            gate: GateConfig::default(),
        }
    }
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

fn parse_port(raw: Option<&str>) -> Result<u16, ConfigError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(DEFAULT_PORT),
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidPort(raw.to_owned())),
    }
}

fn token_cookie_name(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_TOKEN_COOKIE_NAME)
        .to_owned()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
