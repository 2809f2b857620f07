//! Relay configuration and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (including those loaded from `.env`)
//! 3. Built-in defaults
//!
//! The destination URL has no default: without it the relay refuses to start.

use std::fmt;

use reqwest::Url;
use thiserror::Error;

use crate::constants::{DEFAULT_HOST, DEFAULT_PORT, ENV_HOST, ENV_PORT, ENV_WEBHOOK_URL};
use crate::env::Env;

/// Errors during config loading. All of them are fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("set DISCORD_WEBHOOK (in the environment or .env) or pass --webhook-url")]
    MissingWebhookUrl,

    #[error("invalid webhook URL: {0}")]
    InvalidWebhookUrl(String),

    #[error("invalid PORT value: {0}")]
    InvalidPort(String),
}

/// Values supplied on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub webhook_url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Immutable process configuration, built once at startup and handed to
/// the server.
#[derive(Clone)]
pub struct RelayConfig {
    /// Destination webhook every submission is forwarded to.
    pub webhook_url: Url,
    /// Address the HTTP listener binds to.
    pub host: String,
    /// Port the HTTP listener binds to.
    pub port: u16,
}

// Webhook URLs embed their secret token in the path.
impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("webhook_url", &redact_url(&self.webhook_url))
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

impl RelayConfig {
    /// Resolve configuration from CLI overrides and the environment.
    pub fn load(overrides: ConfigOverrides, env: &Env) -> Result<Self, ConfigError> {
        let raw_url = overrides
            .webhook_url
            .filter(|url| !url.trim().is_empty())
            .or_else(|| env.get(ENV_WEBHOOK_URL))
            .ok_or(ConfigError::MissingWebhookUrl)?;
        let webhook_url = parse_webhook_url(raw_url.trim())?;

        let port = match overrides.port {
            Some(port) => port,
            None => match env.get(ENV_PORT) {
                Some(val) => val
                    .trim()
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidPort(val))?,
                None => DEFAULT_PORT,
            },
        };

        let host = overrides
            .host
            .or_else(|| env.get(ENV_HOST))
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        Ok(Self {
            webhook_url,
            host,
            port,
        })
    }

    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

fn parse_webhook_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidWebhookUrl(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidWebhookUrl(format!(
            "unsupported scheme `{other}`"
        ))),
    }
}

/// Scheme and host only, for logs.
pub fn redact_url(url: &Url) -> String {
    match url.host_str() {
        Some(host) => format!("{}://{host}/[REDACTED]", url.scheme()),
        None => "[REDACTED]".to_string(),
    }
}
