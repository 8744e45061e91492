//! Homepage observer registry.
//!
//! A homepage is a monitored web resource identified by its URL. Whatever
//! scrapes it reports newly discovered episodes to the homepage, which fans
//! them out to every registered [`UpdateObserver`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use huc_notifier::homepage::{Homepage, WatchedHomepage};
//! use huc_notifier::types::Episode;
//! use huc_notifier::user::User;
//!
//! let homepage: Arc<WatchedHomepage> = Arc::new(WatchedHomepage::new("https://a.example/show"));
//! let user = Arc::new(User::new("viewer@example.com"));
//!
//! user.add_homepage_notifications(homepage.clone());
//! homepage.announce(&[Episode::new(1, "https://a.example/show/1", "Pilot")]);
//!
//! assert_eq!(user.pending_count(), 1);
//! assert_eq!(homepage.url(), "https://a.example/show");
//! ```

use std::sync::{Mutex, PoisonError, Weak};

use tracing::{debug, trace};

use crate::types::Episode;

/// Receives episode notifications from homepages.
pub trait UpdateObserver: Send + Sync {
    /// Called by a homepage when new episodes were discovered on it.
    fn add_update_notifications(&self, homepage_url: &str, episodes: &[Episode]);
}

/// A monitored web resource that emits episode-discovery events.
pub trait Homepage: Send + Sync {
    /// URL identifying this homepage.
    fn url(&self) -> &str;

    /// Registers `observer` to be notified of future episodes.
    ///
    /// Registering the same observer twice must not make it receive each
    /// announcement twice.
    ///
    /// Homepages hold observers weakly so that an observer holding the
    /// homepage does not keep itself alive.
    fn register_for_updates(&self, observer: Weak<dyn UpdateObserver>);
}

/// In-memory [`Homepage`] that forwards announced episodes to its observers.
pub struct WatchedHomepage {
    url: String,
    observers: Mutex<Vec<Weak<dyn UpdateObserver>>>,
}

impl WatchedHomepage {
    /// Creates a homepage with no observers.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Notifies every live observer of `episodes`, in registration order.
    ///
    /// Observers that have been dropped are pruned. Returns the number of
    /// observers that were notified. An empty slice notifies nobody.
    pub fn announce(&self, episodes: &[Episode]) -> usize {
        if episodes.is_empty() {
            return 0;
        }

        // Upgrade under the lock, call out without it so observers may
        // re-enter this homepage.
        let live: Vec<_> = {
            let mut observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
            observers.retain(|observer| observer.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };

        for observer in &live {
            observer.add_update_notifications(&self.url, episodes);
        }

        debug!(
            url = %self.url,
            episodes = episodes.len(),
            observers = live.len(),
            "Announced episodes"
        );
        live.len()
    }

    /// Returns the number of observers that are still alive.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|observer| observer.strong_count() > 0)
            .count()
    }
}

impl Homepage for WatchedHomepage {
    fn url(&self) -> &str {
        &self.url
    }

    fn register_for_updates(&self, observer: Weak<dyn UpdateObserver>) {
        let mut observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
        observers.retain(|existing| existing.strong_count() > 0);
        if observers.iter().any(|existing| Weak::ptr_eq(existing, &observer)) {
            trace!(url = %self.url, "Observer already registered");
            return;
        }
        observers.push(observer);
        trace!(url = %self.url, observers = observers.len(), "Observer registered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        received: Mutex<Vec<(String, Vec<Episode>)>>,
    }

    impl UpdateObserver for Recorder {
        fn add_update_notifications(&self, homepage_url: &str, episodes: &[Episode]) {
            self.received
                .lock()
                .unwrap()
                .push((homepage_url.to_string(), episodes.to_vec()));
        }
    }

    fn register(homepage: &WatchedHomepage, recorder: &Arc<Recorder>) {
        let observer: Weak<dyn UpdateObserver> = Arc::downgrade(recorder) as Weak<dyn UpdateObserver>;
        homepage.register_for_updates(observer);
    }

    #[test]
    fn announce_reaches_every_observer() {
        let homepage = WatchedHomepage::new("https://a.example/show");
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        register(&homepage, &first);
        register(&homepage, &second);

        let episodes = vec![Episode::new(1, "https://a.example/show/1", "Pilot")];
        assert_eq!(homepage.announce(&episodes), 2);

        for recorder in [&first, &second] {
            let received = recorder.received.lock().unwrap();
            assert_eq!(received.len(), 1);
            assert_eq!(received[0].0, "https://a.example/show");
            assert_eq!(received[0].1, episodes);
        }
    }

    #[test]
    fn dropped_observers_are_pruned() {
        let homepage = WatchedHomepage::new("https://a.example/show");
        let kept = Arc::new(Recorder::default());
        let dropped = Arc::new(Recorder::default());
        register(&homepage, &kept);
        register(&homepage, &dropped);
        assert_eq!(homepage.observer_count(), 2);

        drop(dropped);
        assert_eq!(homepage.observer_count(), 1);

        let notified = homepage.announce(&[Episode::new(1, "https://a.example/show/1", "Pilot")]);
        assert_eq!(notified, 1);
    }

    #[test]
    fn registering_same_observer_twice_keeps_one_entry() {
        let homepage = WatchedHomepage::new("https://a.example/show");
        let recorder = Arc::new(Recorder::default());
        register(&homepage, &recorder);
        register(&homepage, &recorder);

        assert_eq!(homepage.observer_count(), 1);
        assert_eq!(homepage.announce(&[Episode::new(1, "https://a.example/show/1", "Pilot")]), 1);
        assert_eq!(recorder.received.lock().unwrap().len(), 1);
    }

    #[test]
    fn empty_announcement_notifies_nobody() {
        let homepage = WatchedHomepage::new("https://a.example/show");
        let recorder = Arc::new(Recorder::default());
        register(&homepage, &recorder);

        assert_eq!(homepage.announce(&[]), 0);
        assert!(recorder.received.lock().unwrap().is_empty());
    }
}
