//! Shared types carried in the scan manifest.
//!
//! The scan stage serializes these to `manifest.json`; the generate stage
//! reads them back. Both sides must agree on the shape.

use serde::{Deserialize, Serialize};

/// One page of the site.
///
/// Pages follow the `NNN-name` convention: numbered pages appear in the
/// derived navigation sorted by number, unnumbered pages are generated but
/// stay out of the nav. The home page has an empty slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Heading shown on the page.
    pub title: String,
    /// Nav label (filename with number stripped and dashes → spaces).
    pub link_title: String,
    /// URL slug. Empty for the home page.
    pub slug: String,
    pub in_nav: bool,
    /// Number prefix, `u32::MAX` for unnumbered pages.
    pub sort_key: u32,
    /// Source path relative to the content root.
    pub source: String,
    #[serde(default)]
    pub meta: PageMeta,
    pub body: PageBody,
}

impl Page {
    pub fn is_home(&self) -> bool {
        self.slug.is_empty()
    }

    /// URL path this page is served at, e.g. `/about` or `/`.
    pub fn url_path(&self) -> String {
        format!("/{}", self.slug)
    }

    /// Link pages only contribute a nav entry; nothing is rendered for them.
    pub fn is_link(&self) -> bool {
        matches!(self.body, PageBody::Link { .. })
    }

    /// Where a file belonging to this page lands, relative to the output
    /// root: `<slug>/<filename>`, or just `<filename>` for the home page.
    pub fn output_path(&self, filename: &str) -> String {
        if self.is_home() {
            filename.to_string()
        } else {
            format!("{}/{filename}", self.slug)
        }
    }

    /// The page's HTML file: `index.html` for home, `<slug>/index.html` otherwise.
    pub fn output_file(&self) -> String {
        self.output_path("index.html")
    }
}

/// What a page renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PageBody {
    Markdown {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        intro: Option<String>,
        markdown: String,
    },
    Projects {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        intro: Option<String>,
        projects: Vec<Project>,
    },
    Uses {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        intro: Option<String>,
        sections: Vec<ToolSection>,
    },
    Photos {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        intro: Option<String>,
        photos: Vec<Photo>,
    },
    Link {
        url: String,
    },
}

impl PageBody {
    pub fn intro(&self) -> Option<&str> {
        match self {
            PageBody::Markdown { intro, .. }
            | PageBody::Projects { intro, .. }
            | PageBody::Uses { intro, .. }
            | PageBody::Photos { intro, .. } => intro.as_deref(),
            PageBody::Link { .. } => None,
        }
    }
}

/// Per-page SEO overrides. Anything left unset falls back to the site
/// defaults in `[seo]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_description: Option<String>,
    pub noindex: bool,
    pub nofollow: bool,
}

/// A card on the projects page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub link: ProjectLink,
    /// Asset path of the logo, e.g. `/logos/hyzerbase.png`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectLink {
    pub href: String,
    pub label: String,
}

/// A titled group of tools on the uses page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolSection {
    pub title: String,
    #[serde(default)]
    pub tools: Vec<Tool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tool {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    pub description: String,
}

/// An image in a photo gallery page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    /// `NNN` prefix; unnumbered photos sort after all numbered ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    /// Path relative to the content root.
    pub source_path: String,
    pub filename: String,
    pub alt: String,
    pub width: u32,
    pub height: u32,
}
