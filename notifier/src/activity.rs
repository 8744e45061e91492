//! Observability hooks for notification aggregation.
//!
//! The aggregator reports what it does through an [`ActivityLog`] it holds a
//! reference to, instead of calling into process-wide logging directly. The
//! default [`TracingActivityLog`] forwards everything to `tracing`.

use tracing::info;

use crate::types::Episode;

/// Receives activity events from a [`User`](crate::user::User).
pub trait ActivityLog: Send + Sync {
    /// An episode was appended to `recipient`'s pending notifications.
    fn episode_added(&self, recipient: &str, homepage_url: &str, episode: &Episode);

    /// A digest containing `episode_count` episodes was delivered to `recipient`.
    fn digest_sent(&self, recipient: &str, episode_count: usize);
}

/// Activity log that emits structured `tracing` events at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingActivityLog;

impl ActivityLog for TracingActivityLog {
    fn episode_added(&self, recipient: &str, homepage_url: &str, episode: &Episode) {
        info!(
            recipient = %recipient,
            url = %homepage_url,
            episode = %episode,
            "Added update notification"
        );
    }

    fn digest_sent(&self, recipient: &str, episode_count: usize) {
        info!(
            recipient = %recipient,
            episodes = episode_count,
            "Update digest sent"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_activity_log_is_usable_as_trait_object() {
        let log: Box<dyn ActivityLog> = Box::new(TracingActivityLog);
        let episode = Episode::new(1, "https://a.example/show/1", "Pilot");

        // No subscriber installed: both calls must be no-ops.
        log.episode_added("viewer@example.com", "https://a.example/show", &episode);
        log.digest_sent("viewer@example.com", 1);
    }
}
