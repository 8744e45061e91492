//! html-update-checker notifier - per-user episode digests.
//!
//! This crate tracks subscribers who watch a set of homepages for new
//! episodes, accumulates pending notifications per subscriber, and flushes
//! them as a single HTML email.
//!
//! # Overview
//!
//! Homepages push discovered episodes to their registered observers. A
//! [`User`] buffers those episodes keyed by homepage URL. When the embedding
//! scheduler calls [`User::send_updates`], the buffer is rendered into one
//! digest, handed to a [`MailTransport`], and cleared only if delivery
//! succeeded. A failed delivery leaves everything in place for the next try.
//!
//! # Modules
//!
//! - [`types`]: Episode data type
//! - [`homepage`]: Homepage and observer traits, in-memory homepage
//! - [`user`]: The notification aggregator
//! - [`digest`]: HTML digest rendering
//! - [`activity`]: Injected observability hooks
//! - [`transport`]: Mail transport trait and SendGrid implementation
//! - [`config`]: Mail configuration from environment variables
//! - [`error`]: Error types for notifier operations
//! - [`logging`]: `tracing` subscriber setup

pub mod activity;
pub mod config;
pub mod digest;
pub mod error;
pub mod homepage;
pub mod logging;
pub mod transport;
pub mod types;
pub mod user;

pub use activity::{ActivityLog, TracingActivityLog};
pub use config::{ConfigError, MailConfig};
pub use digest::render_digest;
pub use error::{NotifierError, Result};
pub use homepage::{Homepage, UpdateObserver, WatchedHomepage};
pub use logging::init_logging;
pub use transport::{MailTransport, SendGridTransport, TransportError};
pub use types::Episode;
pub use user::User;
