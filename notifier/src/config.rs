//! Configuration module for the notifier's mail transport.
//!
//! This module handles parsing configuration from environment variables.
//!
//! # Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `HUC_SENDGRID_API_KEY` | Yes | - | SendGrid API key used as bearer token |
//! | `HUC_MAIL_FROM` | Yes | - | Sender address of the digest mail |
//! | `HUC_SENDGRID_URL` | No | `https://api.sendgrid.com` | SendGrid API base URL |
//! | `HUC_MAIL_SUBJECT` | No | `Episode updates` | Subject line of the digest mail |
//! | `HUC_REQUEST_TIMEOUT_SECS` | No | 30 | HTTP request timeout |
//!
//! # Example
//!
//! ```no_run
//! use huc_notifier::config::MailConfig;
//!
//! let config = MailConfig::from_env().expect("Failed to load configuration");
//! println!("Sending as: {}", config.from_address);
//! ```

use std::env;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Default SendGrid API base URL.
pub const DEFAULT_SENDGRID_URL: &str = "https://api.sendgrid.com";

/// Default subject line of the digest mail.
pub const DEFAULT_SUBJECT: &str = "Episode updates";

/// Default HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors that can occur during configuration parsing.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Environment variable has an invalid value.
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Configuration for delivering digest mails through SendGrid.
#[derive(Clone)]
pub struct MailConfig {
    /// SendGrid API key.
    pub api_key: String,

    /// Sender address.
    pub from_address: String,

    /// SendGrid API base URL, without trailing slash.
    pub base_url: String,

    /// Subject line of every digest mail.
    pub subject: String,

    /// Timeout applied to each HTTP request.
    pub request_timeout: Duration,
}

// The API key never ends up in logs.
impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("api_key", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .field("base_url", &self.base_url)
            .field("subject", &self.subject)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl MailConfig {
    /// Creates a configuration with default URL, subject and timeout.
    #[must_use]
    pub fn new(api_key: String, from_address: String) -> Self {
        Self {
            api_key,
            from_address,
            base_url: DEFAULT_SENDGRID_URL.to_string(),
            subject: DEFAULT_SUBJECT.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Overrides the API base URL (used to point at a mock server in tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Creates a new `MailConfig` by parsing environment variables.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if:
    /// - `HUC_SENDGRID_API_KEY` or `HUC_MAIL_FROM` is not set
    /// - `HUC_REQUEST_TIMEOUT_SECS` is set but is not a positive integer
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = required("HUC_SENDGRID_API_KEY")?;
        let from_address = required("HUC_MAIL_FROM")?;

        let base_url = env::var("HUC_SENDGRID_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_SENDGRID_URL.to_string());

        let subject = env::var("HUC_MAIL_SUBJECT").unwrap_or_else(|_| DEFAULT_SUBJECT.to_string());

        // Optional: HUC_REQUEST_TIMEOUT_SECS (default: 30, must be > 0)
        let timeout_secs = match env::var("HUC_REQUEST_TIMEOUT_SECS") {
            Ok(val) => {
                let secs = val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                    key: "HUC_REQUEST_TIMEOUT_SECS".to_string(),
                    message: format!("expected positive integer, got '{val}'"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: "HUC_REQUEST_TIMEOUT_SECS".to_string(),
                        message: "timeout must be at least 1 second".to_string(),
                    });
                }
                secs
            }
            Err(_) => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            from_address,
            base_url,
            subject,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Reads a required, non-empty environment variable.
fn required(key: &str) -> Result<String, ConfigError> {
    env::var(key)
        .ok()
        .filter(|val| !val.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}
