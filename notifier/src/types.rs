//! Shared data types for episode notifications.
//!
//! An [`Episode`] is produced by whatever discovers new content on a homepage
//! and is treated as read-only by the notifier. All types serialize to
//! camelCase JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A discrete unit of new content discovered on a homepage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    /// Number of the episode as published by the homepage.
    pub episode_number: u32,

    /// Link to the episode itself.
    pub url: String,

    /// Human-readable episode title.
    pub name: String,
}

impl Episode {
    /// Creates a new episode.
    ///
    /// # Examples
    ///
    /// ```
    /// use huc_notifier::types::Episode;
    ///
    /// let episode = Episode::new(1, "https://a.example/show/1", "Pilot");
    /// assert_eq!(episode.episode_number, 1);
    /// assert_eq!(episode.to_string(), "[1] Pilot (https://a.example/show/1)");
    /// ```
    #[must_use]
    pub fn new(episode_number: u32, url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            episode_number,
            url: url.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.episode_number, self.name, self.url)
    }
}
