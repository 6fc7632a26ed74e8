//! Back-office configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string
//! - `ADMIN_API_TOKEN` - Opaque token every admin request must present
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `REMOVEBG_API_KEYS` - Comma-separated background-removal keys (up to 4)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// At most this many background-removal keys are kept; extras are ignored.
pub const MAX_REMOVEBG_KEYS: usize = 4;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// An environment variable has an invalid value.
    #[error("invalid value for {name}: {reason}")]
    Invalid {
        name: &'static str,
        reason: String,
    },
}

/// Back-office configuration.
#[derive(Clone)]
pub struct AdminConfig {
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    /// The opaque session token admin requests authenticate with.
    pub api_token: SecretString,
    /// Background-removal keys, tried in order.
    pub removebg_api_keys: Vec<SecretString>,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = optional("ADMIN_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_owned())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "ADMIN_HOST",
                reason: e.to_string(),
            })?;

        let port = optional("ADMIN_PORT")
            .unwrap_or_else(|| "3001".to_owned())
            .parse()
            .map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                name: "ADMIN_PORT",
                reason: e.to_string(),
            })?;

        let removebg_api_keys = optional("REMOVEBG_API_KEYS")
            .map(|raw| parse_keys(&raw))
            .unwrap_or_default();

        Ok(Self {
            database_url: required("ADMIN_DATABASE_URL")?.into(),
            host,
            port,
            api_token: required("ADMIN_API_TOKEN")?.into(),
            removebg_api_keys,
            sentry_dsn: optional("SENTRY_DSN"),
            sentry_environment: optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// The address the server binds to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_keys(raw: &str) -> Vec<SecretString> {
    raw.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .take(MAX_REMOVEBG_KEYS)
        .map(Into::into)
        .collect()
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn optional(name: &'static str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_list_caps_at_four() {
        let keys = parse_keys("a, b,c,, d ,e");
        assert_eq!(keys.len(), 4);
    }

    #[test]
    fn test_blank_key_list_is_empty() {
        assert!(parse_keys("  ,").is_empty());
    }
}
