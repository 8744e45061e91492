//! Mail transport abstraction.
//!
//! The aggregator only needs one capability from the outside world: hand a
//! rendered HTML document to someone who delivers it. [`MailTransport`] is that
//! seam; [`SendGridTransport`] is the production implementation.

pub mod sendgrid;

use std::future::Future;

use thiserror::Error;

pub use sendgrid::SendGridTransport;

/// Errors that can occur while delivering a digest mail.
#[derive(Error, Debug)]
pub enum TransportError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The mail provider rejected the API key (401/403).
    #[error("authentication failed: invalid or unauthorized API key")]
    AuthFailed,

    /// The mail provider answered with a non-success status.
    #[error("mail rejected: {status} - {message}")]
    Rejected { status: u16, message: String },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid header value (API key contains invalid characters).
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Delivers a rendered digest document to a recipient.
///
/// A call either fully succeeds or returns an error; the caller relies on the
/// `Result` to decide whether pending notifications may be cleared.
pub trait MailTransport: Send + Sync {
    /// Sends `html_body` to `recipient`.
    fn send(
        &self,
        recipient: &str,
        html_body: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}
