//! HTML digest rendering.
//!
//! Turns a user's pending notifications into the body of one update mail:
//!
//! ```text
//! <h1>Episode updates</h1><br/>
//! <p><h2>{homepage url}</h2>[{number}] <a href="{episode url}">{name}</a><br/>...</p>
//! ...
//! ```
//!
//! Homepages are rendered in the iteration order of the map passed in (the
//! aggregator keeps a URL-sorted map). Homepages without episodes produce no
//! section, and a digest without any section is not rendered at all.

use std::collections::BTreeMap;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::types::Episode;

/// Heading that wraps every non-empty digest.
pub const DIGEST_HEADING: &str = "<h1>Episode updates</h1><br/>";

/// Renders the full digest document, or `None` if there is nothing to report.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use huc_notifier::digest::render_digest;
/// use huc_notifier::types::Episode;
///
/// let mut pending = BTreeMap::new();
/// pending.insert(
///     "https://a.example/show".to_string(),
///     vec![Episode::new(1, "https://a.example/show/1", "Pilot")],
/// );
///
/// let html = render_digest(&pending).unwrap();
/// assert!(html.starts_with("<h1>Episode updates</h1>"));
/// assert!(html.contains(r#"[1] <a href="https://a.example/show/1">Pilot</a>"#));
///
/// assert!(render_digest(&BTreeMap::new()).is_none());
/// ```
#[must_use]
pub fn render_digest(pending: &BTreeMap<String, Vec<Episode>>) -> Option<String> {
    let sections = render_sections(pending);
    if sections.is_empty() {
        return None;
    }
    Some(format!("{DIGEST_HEADING}{sections}"))
}

fn render_sections(pending: &BTreeMap<String, Vec<Episode>>) -> String {
    let mut html = String::new();
    for (homepage_url, episodes) in pending {
        if episodes.is_empty() {
            continue;
        }
        html.push_str(&format!("<p><h2>{}</h2>", encode_text(homepage_url)));
        for episode in episodes {
            html.push_str(&format!(
                r#"[{}] <a href="{}">{}</a><br/>"#,
                episode.episode_number,
                encode_double_quoted_attribute(&episode.url),
                encode_text(&episode.name),
            ));
        }
        html.push_str("</p>");
    }
    html
}
