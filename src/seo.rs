//! SEO metadata: site-wide defaults, per-page overrides, and `<head>` tags.
//!
//! The `[seo]` section of `config.toml` holds defaults for every page. A
//! page's front matter `[meta]` table ([`PageMeta`]) overrides individual
//! fields. [`resolve`] combines the two into a [`SeoMeta`] for one URL path,
//! and [`render_meta`] turns that into tags.
//!
//! ## Resolution Rules
//!
//! | Field | First available wins |
//! |-------|----------------------|
//! | title | `meta.title` → `"{page heading} - {seo.title}"` → `seo.title` |
//! | description | `meta.description` → `seo.description` |
//! | og:title | `meta.og_title` → resolved title |
//! | og:description | `meta.og_description` → resolved description |
//! | canonical, og:url | `site.base_url` + path (`/` gives the bare origin) |
//! | robots | `index,follow` unless `noindex` / `nofollow` are set |

use crate::config::SiteInfo;
use crate::types::PageMeta;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

/// Site-wide SEO defaults from `[seo]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeoDefaults {
    pub title: String,
    pub description: String,
    pub open_graph: OpenGraphDefaults,
    pub twitter: TwitterConfig,
}

impl Default for SeoDefaults {
    fn default() -> Self {
        Self {
            title: "My Site".to_string(),
            description: String::new(),
            open_graph: OpenGraphDefaults::default(),
            twitter: TwitterConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpenGraphDefaults {
    #[serde(rename = "type")]
    pub og_type: String,
    pub locale: String,
    pub images: Vec<OgImage>,
}

impl Default for OpenGraphDefaults {
    fn default() -> Self {
        Self {
            og_type: "website".to_string(),
            locale: "en_US".to_string(),
            images: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OgImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TwitterConfig {
    /// Author handle, emitted as `twitter:creator`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    pub card_type: String,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            handle: None,
            site: None,
            card_type: "summary_large_image".to_string(),
        }
    }
}

/// Fully resolved metadata for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct SeoMeta {
    pub title: String,
    pub description: String,
    pub canonical: String,
    pub robots: String,
    pub og_type: String,
    pub og_locale: String,
    pub og_title: String,
    pub og_description: String,
    pub og_site_name: String,
    pub og_images: Vec<OgImage>,
    pub twitter: TwitterConfig,
}

impl SeoMeta {
    pub fn is_indexable(&self) -> bool {
        !self.robots.starts_with("noindex")
    }
}

/// Absolute URL of a path on the site.
pub fn canonical_url(base_url: &str, path: &str) -> String {
    if path == "/" || path.is_empty() {
        base_url.to_string()
    } else {
        format!("{base_url}{path}")
    }
}

/// Combine site defaults with a page's overrides for the given URL path.
///
/// `heading` is the page's visible title; pass `None` for the home page so
/// it gets the bare site title.
pub fn resolve(
    defaults: &SeoDefaults,
    site: &SiteInfo,
    meta: &PageMeta,
    heading: Option<&str>,
    path: &str,
) -> SeoMeta {
    let title = meta.title.clone().unwrap_or_else(|| match heading {
        Some(h) if !h.is_empty() && h != defaults.title => format!("{h} - {}", defaults.title),
        _ => defaults.title.clone(),
    });
    let description = meta
        .description
        .clone()
        .unwrap_or_else(|| defaults.description.clone());
    let robots = format!(
        "{},{}",
        if meta.noindex { "noindex" } else { "index" },
        if meta.nofollow { "nofollow" } else { "follow" }
    );

    SeoMeta {
        og_title: meta.og_title.clone().unwrap_or_else(|| title.clone()),
        og_description: meta
            .og_description
            .clone()
            .unwrap_or_else(|| description.clone()),
        title,
        description,
        canonical: canonical_url(&site.base_url, path),
        robots,
        og_type: defaults.open_graph.og_type.clone(),
        og_locale: defaults.open_graph.locale.clone(),
        og_site_name: site.name.clone(),
        og_images: defaults.open_graph.images.clone(),
        twitter: defaults.twitter.clone(),
    }
}

/// Render `<title>` plus description, canonical, robots, Open Graph and
/// Twitter tags.
pub fn render_meta(meta: &SeoMeta) -> Markup {
    html! {
        title { (meta.title) }
        @if !meta.description.is_empty() {
            meta name="description" content=(meta.description);
        }
        link rel="canonical" href=(meta.canonical);
        meta name="robots" content=(meta.robots);
        meta property="og:type" content=(meta.og_type);
        meta property="og:locale" content=(meta.og_locale);
        meta property="og:url" content=(meta.canonical);
        meta property="og:site_name" content=(meta.og_site_name);
        meta property="og:title" content=(meta.og_title);
        @if !meta.og_description.is_empty() {
            meta property="og:description" content=(meta.og_description);
        }
        @for image in &meta.og_images {
            meta property="og:image" content=(image.url);
            @if let Some(alt) = &image.alt {
                meta property="og:image:alt" content=(alt);
            }
            @if let Some(width) = image.width {
                meta property="og:image:width" content=(width);
            }
            @if let Some(height) = image.height {
                meta property="og:image:height" content=(height);
            }
        }
        meta name="twitter:card" content=(meta.twitter.card_type);
        @if let Some(site) = &meta.twitter.site {
            meta name="twitter:site" content=(site);
        }
        @if let Some(handle) = &meta.twitter.handle {
            meta name="twitter:creator" content=(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteInfo {
        SiteInfo {
            name: "Patrick".into(),
            base_url: "https://pgvr.dev".into(),
            language: "en".into(),
            logo: None,
        }
    }

    fn defaults() -> SeoDefaults {
        SeoDefaults {
            title: "Patrick – Software Engineer".into(),
            description: "Software Engineer, disc golfer and space enthusiast".into(),
            open_graph: OpenGraphDefaults {
                og_type: "website".into(),
                locale: "en_DE".into(),
                images: vec![OgImage {
                    url: "https://pgvr.dev/banner.png".into(),
                    alt: Some("Banner".into()),
                    width: Some(1280),
                    height: Some(720),
                }],
            },
            twitter: TwitterConfig {
                handle: Some("@patrick_gvr".into()),
                site: Some("@patrick_gvr".into()),
                card_type: "summary_large_image".into(),
            },
        }
    }

    #[test]
    fn home_page_uses_site_defaults() {
        let meta = resolve(&defaults(), &site(), &PageMeta::default(), None, "/");
        assert_eq!(meta.title, "Patrick – Software Engineer");
        assert_eq!(meta.canonical, "https://pgvr.dev");
        assert_eq!(meta.robots, "index,follow");
        assert_eq!(meta.og_title, meta.title);
        assert_eq!(meta.og_description, meta.description);
    }

    #[test]
    fn page_heading_prefixes_site_title() {
        let meta = resolve(&defaults(), &site(), &PageMeta::default(), Some("Uses"), "/uses");
        assert_eq!(meta.title, "Uses - Patrick – Software Engineer");
        assert_eq!(meta.canonical, "https://pgvr.dev/uses");
    }

    #[test]
    fn page_overrides_win() {
        let page = PageMeta {
            title: Some("About - Patrick".into()),
            description: Some("I live in Munich.".into()),
            og_title: Some("About – Patrick".into()),
            og_description: None,
            noindex: false,
            nofollow: false,
        };
        let meta = resolve(&defaults(), &site(), &page, Some("About"), "/about");
        assert_eq!(meta.title, "About - Patrick");
        assert_eq!(meta.description, "I live in Munich.");
        assert_eq!(meta.og_title, "About – Patrick");
        assert_eq!(meta.og_description, "I live in Munich.");
    }

    #[test]
    fn noindex_nofollow_sets_robots() {
        let page = PageMeta {
            noindex: true,
            nofollow: true,
            ..PageMeta::default()
        };
        let meta = resolve(&defaults(), &site(), &page, Some("Wo"), "/wo");
        assert_eq!(meta.robots, "noindex,nofollow");
        assert!(!meta.is_indexable());
    }

    #[test]
    fn rendered_tags() {
        let meta = resolve(&defaults(), &site(), &PageMeta::default(), None, "/");
        let html = render_meta(&meta).into_string();
        assert!(html.contains("<title>Patrick – Software Engineer</title>"));
        assert!(html.contains(r#"<link rel="canonical" href="https://pgvr.dev">"#));
        assert!(html.contains(r#"property="og:locale" content="en_DE""#));
        assert!(html.contains(r#"property="og:image:width" content="1280""#));
        assert!(html.contains(r#"name="twitter:creator" content="@patrick_gvr""#));
    }

    #[test]
    fn empty_description_is_omitted() {
        let mut d = defaults();
        d.description.clear();
        let meta = resolve(&d, &site(), &PageMeta::default(), None, "/");
        let html = render_meta(&meta).into_string();
        assert!(!html.contains(r#"name="description""#));
        assert!(!html.contains("og:description"));
    }

    #[test]
    fn meta_content_is_escaped() {
        let page = PageMeta {
            description: Some(r#""><script>"#.into()),
            ..PageMeta::default()
        };
        let meta = resolve(&defaults(), &site(), &page, None, "/");
        let html = render_meta(&meta).into_string();
        assert!(!html.contains("<script>"));
    }
}
