//! SendGrid mail transport.
//!
//! Delivers digest mails through the SendGrid v3 `mail/send` endpoint with:
//!
//! - Connection pooling via reqwest
//! - Bearer authentication with the configured API key
//! - A single attempt per call (a failed flush is retried by the next flush)
//!
//! # Example
//!
//! ```no_run
//! use huc_notifier::config::MailConfig;
//! use huc_notifier::transport::{MailTransport, SendGridTransport};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = MailConfig::from_env().unwrap();
//!     let transport = SendGridTransport::new(config).unwrap();
//!
//!     transport
//!         .send("viewer@example.com", "<h1>Episode updates</h1>")
//!         .await
//!         .unwrap();
//! }
//! ```

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::{MailTransport, TransportError};
use crate::config::MailConfig;

/// Path of the SendGrid v3 send endpoint.
const SEND_PATH: &str = "/v3/mail/send";

/// Request body for the SendGrid v3 API.
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

/// Mail transport backed by the SendGrid HTTP API.
pub struct SendGridTransport {
    config: MailConfig,
    client: Client,
}

impl SendGridTransport {
    /// Creates a new transport from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Client` if the HTTP client cannot be built.
    pub fn new(config: MailConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(2)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Returns the configuration this transport sends with.
    #[must_use]
    pub fn config(&self) -> &MailConfig {
        &self.config
    }

    fn headers(&self) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.config.api_key))?,
        );
        Ok(headers)
    }

    fn request_body(&self, recipient: &str, html_body: &str) -> Result<String, TransportError> {
        let request = SendRequest {
            personalizations: [Personalization {
                to: [Address { email: recipient }],
            }],
            from: Address {
                email: &self.config.from_address,
            },
            subject: &self.config.subject,
            content: [Content {
                content_type: "text/html",
                value: html_body,
            }],
        };
        Ok(serde_json::to_string(&request)?)
    }
}

impl MailTransport for SendGridTransport {
    async fn send(&self, recipient: &str, html_body: &str) -> Result<(), TransportError> {
        let url = format!("{}{SEND_PATH}", self.config.base_url);
        let headers = self.headers()?;
        let body = self.request_body(recipient, html_body)?;

        debug!(
            url = %url,
            recipient = %recipient,
            bytes = html_body.len(),
            "Sending digest mail"
        );

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(recipient = %recipient, "Digest mail accepted");
            return Ok(());
        }

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                error!(status = status.as_u16(), "Mail provider rejected API key");
                Err(TransportError::AuthFailed)
            }
            _ => {
                let message = response.text().await.unwrap_or_default();
                warn!(
                    status = status.as_u16(),
                    message = %message,
                    "Mail provider rejected digest"
                );
                Err(TransportError::Rejected {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}
