//! Navigation links and active-link resolution.
//!
//! Every generated page renders the same navigation bar. Which entry is shown
//! as "active" depends on the page's own URL path, which the generator passes
//! in explicitly when it renders that page. Nothing here reads global routing
//! state.
//!
//! ## Match Modes
//!
//! - [`MatchMode::Exact`]: the current path must equal the link target.
//!   Used for the home link, otherwise `/` would be active everywhere.
//! - [`MatchMode::Prefix`] (default): the current path must start with the
//!   link target. This is a plain string prefix with no notion of path
//!   segments, so `/about-me` counts as being under `/about`.
//!
//! ## Where Links Come From
//!
//! An explicit `[[nav]]` list in `config.toml` wins. Without one, the bar is
//! derived from the scanned pages: `Home` (exact) followed by every numbered
//! page in number order. See [`build_nav`].

use crate::types::{Page, PageBody};
use serde::{Deserialize, Serialize};

/// How a link's target is compared against the current page path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    Exact,
    #[default]
    Prefix,
}

/// Returns true when a link to `target_path` should be marked active while
/// viewing `current_path`.
pub fn is_active(current_path: &str, target_path: &str, mode: MatchMode) -> bool {
    match mode {
        MatchMode::Exact => current_path == target_path,
        MatchMode::Prefix => current_path.starts_with(target_path),
    }
}

/// A single entry in the navigation bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavLink {
    pub href: String,
    pub label: String,
    #[serde(default)]
    pub match_mode: MatchMode,
    /// External links open in a new tab and are never active.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub external: bool,
}

impl NavLink {
    pub fn new(href: impl Into<String>, label: impl Into<String>, match_mode: MatchMode) -> Self {
        Self {
            href: href.into(),
            label: label.into(),
            match_mode,
            external: false,
        }
    }

    pub fn external(href: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            external: true,
            ..Self::new(href, label, MatchMode::Exact)
        }
    }

    pub fn is_active(&self, current_path: &str) -> bool {
        !self.external && is_active(current_path, &self.href, self.match_mode)
    }
}

/// A `[[nav]]` entry as written in `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavEntryConfig {
    pub href: String,
    pub label: String,
    #[serde(default)]
    pub exact: bool,
}

impl From<&NavEntryConfig> for NavLink {
    fn from(entry: &NavEntryConfig) -> Self {
        let mode = if entry.exact {
            MatchMode::Exact
        } else {
            MatchMode::Prefix
        };
        let is_external = entry.href.starts_with("http://") || entry.href.starts_with("https://");
        if is_external {
            NavLink::external(&entry.href, &entry.label)
        } else {
            NavLink::new(&entry.href, &entry.label, mode)
        }
    }
}

/// Build the navigation bar from explicit config entries, or derive it from
/// the numbered pages when none are configured.
pub fn build_nav(configured: &[NavEntryConfig], pages: &[Page]) -> Vec<NavLink> {
    if !configured.is_empty() {
        return configured.iter().map(NavLink::from).collect();
    }

    let mut links = vec![NavLink::new("/", "Home", MatchMode::Exact)];
    let mut numbered: Vec<&Page> = pages
        .iter()
        .filter(|p| p.in_nav && !p.is_home())
        .collect();
    numbered.sort_by_key(|p| p.sort_key);

    for page in numbered {
        match &page.body {
            PageBody::Link { url } => links.push(NavLink::external(url, &page.link_title)),
            _ => links.push(NavLink::new(page.url_path(), &page.link_title, MatchMode::Prefix)),
        }
    }
    links
}
