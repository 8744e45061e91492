//! Error types for the notifier.
//!
//! This module defines the top-level error type returned by notification
//! aggregation, with clear, human-readable messages.

use thiserror::Error;

use crate::config::ConfigError;
use crate::transport::TransportError;

/// Errors that can occur during notifier operations.
///
/// # Examples
///
/// ```
/// use huc_notifier::error::NotifierError;
///
/// let err = NotifierError::UnknownSubscription {
///     email: "viewer@example.com".to_string(),
///     url: "https://a.example/show".to_string(),
/// };
/// assert_eq!(
///     err.to_string(),
///     "viewer@example.com is not subscribed to https://a.example/show"
/// );
/// ```
#[derive(Error, Debug)]
pub enum NotifierError {
    /// Unsubscribing a homepage URL that was never subscribed.
    #[error("{email} is not subscribed to {url}")]
    UnknownSubscription { email: String, url: String },

    /// Mail delivery failed. Pending notifications are kept for the next flush.
    #[error("mail transport error: {0}")]
    Transport(#[from] TransportError),

    /// Configuration-related error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// A specialized `Result` type for notifier operations.
pub type Result<T> = std::result::Result<T, NotifierError>;
