//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `PAYSTACK_SECRET_KEY` - Paystack secret key (server-side verification)
//! - `PAYSTACK_PUBLIC_KEY` - Paystack public key (handed to the widget)
//! - `RESEND_API_KEY` - Resend API key for transactional email
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `ORDER_EMAIL_FROM` - From address (default: `Maison Lagos Orders <onboarding@resend.dev>`)
//! - `ORDER_EMAIL_REPLY_TO` - Reply-to address (default: `orders@maisonlagos.co`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

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

/// Paystack gateway configuration.
#[derive(Clone)]
pub struct PaystackConfig {
    /// Secret key used for server-side transaction verification.
    pub secret_key: SecretString,
    /// Public key handed to the inline payment widget.
    pub public_key: String,
}

/// Resend transactional email configuration.
#[derive(Clone)]
pub struct ResendConfig {
    pub api_key: SecretString,
    pub from_address: String,
    pub reply_to: String,
}

/// Storefront configuration.
#[derive(Clone)]
pub struct StorefrontConfig {
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub paystack: PaystackConfig,
    pub resend: ResendConfig,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = required("STOREFRONT_DATABASE_URL")?.into();

        let base_url = required("STOREFRONT_BASE_URL")?;
        Url::parse(&base_url).map_err(|e| ConfigError::Invalid {
            name: "STOREFRONT_BASE_URL",
            reason: e.to_string(),
        })?;

        let host = optional("STOREFRONT_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_owned())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "STOREFRONT_HOST",
                reason: e.to_string(),
            })?;

        let port = optional("STOREFRONT_PORT")
            .unwrap_or_else(|| "3000".to_owned())
            .parse()
            .map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                name: "STOREFRONT_PORT",
                reason: e.to_string(),
            })?;

        let paystack = PaystackConfig {
            secret_key: required("PAYSTACK_SECRET_KEY")?.into(),
            public_key: required("PAYSTACK_PUBLIC_KEY")?,
        };

        let resend = ResendConfig {
            api_key: required("RESEND_API_KEY")?.into(),
            from_address: optional("ORDER_EMAIL_FROM")
                .unwrap_or_else(|| "Maison Lagos Orders <onboarding@resend.dev>".to_owned()),
            reply_to: optional("ORDER_EMAIL_REPLY_TO")
                .unwrap_or_else(|| "orders@maisonlagos.co".to_owned()),
        };

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            paystack,
            resend,
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

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn optional(name: &'static str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
