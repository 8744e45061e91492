//! Per-user notification aggregation.
//!
//! A [`User`] observes homepages, buffers the episodes they announce keyed by
//! homepage URL, and on request flushes the buffer as one HTML digest mail.
//!
//! # Flush semantics
//!
//! - Nothing pending: no mail is sent and state is untouched.
//! - Transport failure: the error is returned and pending state is left
//!   exactly as it was, so the next flush resubmits the full backlog.
//! - Transport success: the episodes that went into the digest are removed.
//!
//! Flushes are serialized. A flush renders a snapshot of the pending map and
//! on success removes only the episodes contained in that snapshot, so
//! notifications arriving while the mail is in flight are kept for the next
//! flush.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use huc_notifier::config::MailConfig;
//! use huc_notifier::homepage::WatchedHomepage;
//! use huc_notifier::transport::SendGridTransport;
//! use huc_notifier::types::Episode;
//! use huc_notifier::user::User;
//!
//! #[tokio::main]
//! async fn main() -> huc_notifier::Result<()> {
//!     let transport = SendGridTransport::new(MailConfig::from_env()?)?;
//!     let homepage = Arc::new(WatchedHomepage::new("https://a.example/show"));
//!     let user = Arc::new(User::new("viewer@example.com"));
//!
//!     user.add_homepage_notifications(homepage.clone());
//!     homepage.announce(&[Episode::new(1, "https://a.example/show/1", "Pilot")]);
//!
//!     user.send_updates(&transport).await?;
//!     Ok(())
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, warn};

use crate::activity::{ActivityLog, TracingActivityLog};
use crate::digest::render_digest;
use crate::error::{NotifierError, Result};
use crate::homepage::{Homepage, UpdateObserver};
use crate::transport::MailTransport;
use crate::types::Episode;

/// Pending notifications keyed by homepage URL, in URL order.
type PendingMap = BTreeMap<String, Vec<Episode>>;

/// A subscriber that aggregates episode notifications into digest mails.
pub struct User {
    email: String,
    homepages: Mutex<HashMap<String, Arc<dyn Homepage>>>,
    pending: Mutex<PendingMap>,
    flush_lock: tokio::sync::Mutex<()>,
    activity: Arc<dyn ActivityLog>,
}

impl User {
    /// Creates a user that reports activity through `tracing`.
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self::with_activity_log(email, Arc::new(TracingActivityLog))
    }

    /// Creates a user that reports activity to `activity`.
    #[must_use]
    pub fn with_activity_log(email: impl Into<String>, activity: Arc<dyn ActivityLog>) -> Self {
        Self {
            email: email.into(),
            homepages: Mutex::new(HashMap::new()),
            pending: Mutex::new(BTreeMap::new()),
            flush_lock: tokio::sync::Mutex::new(()),
            activity,
        }
    }

    /// Email address identifying this user.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Subscribes to `homepage`.
    ///
    /// The homepage is recorded under its URL and asked to report future
    /// episodes to this user. Subscribing to an already subscribed URL
    /// replaces the stored homepage.
    pub fn add_homepage_notifications(self: &Arc<Self>, homepage: Arc<dyn Homepage>) {
        let url = homepage.url().to_string();
        let observer: Weak<dyn UpdateObserver> = Arc::downgrade(self) as Weak<dyn UpdateObserver>;
        homepage.register_for_updates(observer);

        let replaced = self.lock_homepages().insert(url.clone(), homepage).is_some();
        debug!(recipient = %self.email, url = %url, replaced, "Subscribed to homepage");
    }

    /// Subscribes to every homepage in order. An empty sequence is a no-op.
    pub fn add_homepage_notifications_all<I>(self: &Arc<Self>, homepages: I)
    where
        I: IntoIterator<Item = Arc<dyn Homepage>>,
    {
        for homepage in homepages {
            self.add_homepage_notifications(homepage);
        }
    }

    /// Unsubscribes from `homepage`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError::UnknownSubscription`] if the homepage URL is
    /// not subscribed; the subscription map is left unchanged.
    pub fn remove_homepage_notifications(&self, homepage: &dyn Homepage) -> Result<()> {
        let url = homepage.url();
        match self.lock_homepages().remove(url) {
            Some(_) => {
                debug!(recipient = %self.email, url = %url, "Unsubscribed from homepage");
                Ok(())
            }
            None => Err(NotifierError::UnknownSubscription {
                email: self.email.clone(),
                url: url.to_string(),
            }),
        }
    }

    /// Unsubscribes from every homepage in order.
    ///
    /// # Errors
    ///
    /// Stops at the first homepage that is not subscribed and returns
    /// [`NotifierError::UnknownSubscription`]. Homepages before it stay
    /// unsubscribed.
    pub fn remove_homepage_notifications_all(&self, homepages: &[Arc<dyn Homepage>]) -> Result<()> {
        for homepage in homepages {
            self.remove_homepage_notifications(homepage.as_ref())?;
        }
        Ok(())
    }

    /// Returns true if `url` is currently subscribed.
    #[must_use]
    pub fn is_subscribed(&self, url: &str) -> bool {
        self.lock_homepages().contains_key(url)
    }

    /// Returns the subscribed homepage URLs, sorted.
    #[must_use]
    pub fn subscribed_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.lock_homepages().keys().cloned().collect();
        urls.sort();
        urls
    }

    /// Records one pending notification for `homepage_url`.
    pub fn add_update_notification(&self, homepage_url: &str, episode: Episode) {
        self.add_update_notifications(homepage_url, [episode]);
    }

    /// Records pending notifications for `homepage_url`, preserving order.
    ///
    /// Never triggers a send. Activity events are reported after the pending
    /// map is unlocked, so an [`ActivityLog`] may query this user.
    pub fn add_update_notifications<I>(&self, homepage_url: &str, episodes: I)
    where
        I: IntoIterator<Item = Episode>,
    {
        let added: Vec<Episode> = episodes.into_iter().collect();
        if added.is_empty() {
            return;
        }

        self.lock_pending()
            .entry(homepage_url.to_string())
            .or_default()
            .extend(added.iter().cloned());

        for episode in &added {
            self.activity.episode_added(&self.email, homepage_url, episode);
        }
    }

    /// Total number of pending episodes across all homepages.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.lock_pending().values().map(Vec::len).sum()
    }

    /// Returns true if at least one episode is pending.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending_count() > 0
    }

    /// Pending episodes for `homepage_url`, in arrival order.
    #[must_use]
    pub fn pending_for(&self, homepage_url: &str) -> Vec<Episode> {
        self.lock_pending()
            .get(homepage_url)
            .cloned()
            .unwrap_or_default()
    }

    /// Copy of the whole pending map.
    #[must_use]
    pub fn pending_snapshot(&self) -> BTreeMap<String, Vec<Episode>> {
        self.lock_pending().clone()
    }

    /// Renders pending notifications and delivers them through `transport`.
    ///
    /// Returns `Ok(true)` if a digest was sent and `Ok(false)` if there was
    /// nothing to send.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError::Transport`] if delivery fails. Pending state
    /// is not modified in that case.
    pub async fn send_updates<T>(&self, transport: &T) -> Result<bool>
    where
        T: MailTransport,
    {
        let _flush = self.flush_lock.lock().await;

        let snapshot = self.pending_snapshot();
        let Some(html_body) = render_digest(&snapshot) else {
            debug!(recipient = %self.email, "No pending updates to send");
            return Ok(false);
        };

        if let Err(e) = transport.send(&self.email, &html_body).await {
            warn!(
                recipient = %self.email,
                error = %e,
                "Failed to send update digest, keeping pending notifications"
            );
            return Err(e.into());
        }

        let sent = self.remove_sent(&snapshot);
        self.activity.digest_sent(&self.email, sent);
        Ok(true)
    }

    /// Removes the episodes contained in `sent` from the pending map.
    fn remove_sent(&self, sent: &PendingMap) -> usize {
        let mut pending = self.lock_pending();
        let mut removed = 0;
        for (url, episodes) in sent {
            let Some(list) = pending.get_mut(url) else {
                continue;
            };
            let count = episodes.len().min(list.len());
            list.drain(..count);
            removed += count;
            if list.is_empty() {
                pending.remove(url);
            }
        }
        removed
    }

    fn lock_homepages(&self) -> MutexGuard<'_, HashMap<String, Arc<dyn Homepage>>> {
        self.homepages.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_pending(&self) -> MutexGuard<'_, PendingMap> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl UpdateObserver for User {
    fn add_update_notifications(&self, homepage_url: &str, episodes: &[Episode]) {
        User::add_update_notifications(self, homepage_url, episodes.iter().cloned());
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("email", &self.email)
            .field("homepages", &self.subscribed_urls())
            .field("pending", &self.pending_count())
            .finish_non_exhaustive()
    }
}
