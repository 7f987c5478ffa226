//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives in
//! the content root; every key is optional and is merged on top of the stock
//! defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! [site]
//! name = "Ravensburg Technologies"
//! base_url = "https://example.com"   # canonical origin, no trailing slash
//! language = "en"
//! logo = "/logo.svg"                 # optional, shown in the header
//!
//! [seo]
//! title = "Ravensburg Technologies"
//! description = "A small web development company."
//!
//! [seo.open_graph]
//! type = "website"
//! locale = "en_DE"
//!
//! [[seo.open_graph.images]]
//! url = "https://example.com/banner.png"
//! alt = "Banner"
//! width = 1280
//! height = 720
//!
//! [seo.twitter]
//! handle = "@someone"
//! site = "@someone"
//! card_type = "summary_large_image"
//!
//! [[nav]]                            # optional; derived from pages when absent
//! href = "/"
//! label = "Home"
//! exact = true
//!
//! [[redirects]]
//! source = "/blog/:path*"
//! destination = "/articles/:path*"
//! permanent = true
//!
//! [[rewrites]]
//! source = "/sb.js"
//! destination = "https://cdn.splitbee.io/sb.js"
//!
//! [colors.light]                     # 12-step scales → --gray-1..12, --primary-1..12
//! gray = ["#fcfcfc", ...]
//! primary = ["#fafefd", ...]
//!
//! [colors.dark]                      # applied under prefers-color-scheme: dark
//! gray = ["#111111", ...]
//! primary = ["#0d1514", ...]
//!
//! [theme]
//! font_family = "ui-monospace, monospace"
//! max_width = "48rem"
//!
//! [[fonts]]
//! family = "Berkeley Mono"
//! src = "/fonts/BerkeleyMono-Regular.woff2"
//! weight = 400
//! style = "normal"
//!
//! [icons]
//! favicon_svg = "/icons/favicon.svg"
//! manifest = "/icons/site.webmanifest"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::nav::NavEntryConfig;
use crate::routes::{Redirect, RouteError, RouteTable, Rewrite};
use crate::seo::SeoDefaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Invalid route: {0}")]
    Route(#[from] RouteError),
}

/// Number of steps in every colour scale.
pub const SCALE_STEPS: usize = 12;

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub site: SiteInfo,
    pub seo: SeoDefaults,
    /// Explicit navigation. Empty means derive it from numbered pages.
    pub nav: Vec<NavEntryConfig>,
    pub redirects: Vec<Redirect>,
    pub rewrites: Vec<Rewrite>,
    pub colors: ColorConfig,
    pub theme: ThemeConfig,
    pub fonts: Vec<FontFace>,
    pub icons: IconsConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = &self.site.base_url;
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "site.base_url must start with http:// or https://".into(),
            ));
        }
        if base.ends_with('/') {
            return Err(ConfigError::Validation(
                "site.base_url must not end with '/'".into(),
            ));
        }
        for (mode, scheme) in [("light", &self.colors.light), ("dark", &self.colors.dark)] {
            for (name, scale) in [("gray", &scheme.gray), ("primary", &scheme.primary)] {
                if scale.len() != SCALE_STEPS {
                    return Err(ConfigError::Validation(format!(
                        "colors.{mode}.{name} must have {SCALE_STEPS} entries, found {}",
                        scale.len()
                    )));
                }
            }
        }
        if let Some(entry) = self.nav.iter().find(|e| e.href.is_empty()) {
            return Err(ConfigError::Validation(format!(
                "nav entry '{}' has an empty href",
                entry.label
            )));
        }
        self.route_table()?;
        Ok(())
    }

    /// Compile the configured redirects and rewrites.
    pub fn route_table(&self) -> Result<RouteTable, RouteError> {
        RouteTable::new(&self.redirects, &self.rewrites)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    /// Shown in the header and used as the fallback page title.
    pub name: String,
    /// Canonical origin, e.g. `https://pgvr.dev`.
    pub base_url: String,
    /// Value of `<html lang>`.
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: "My Site".to_string(),
            base_url: "https://example.com".to_string(),
            language: "en".to_string(),
            logo: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    pub font_family: String,
    /// Width of the centred page column (CSS value).
    pub max_width: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            font_family: "ui-monospace, SFMono-Regular, Menlo, monospace".to_string(),
            max_width: "48rem".to_string(),
        }
    }
}

/// A self-hosted font face, emitted as an `@font-face` rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FontFace {
    pub family: String,
    /// URL of the font file, usually under `/fonts/` in `assets/`.
    pub src: String,
    #[serde(default = "default_font_weight")]
    pub weight: u16,
    #[serde(default = "default_font_style")]
    pub style: String,
}

fn default_font_weight() -> u16 {
    400
}

fn default_font_style() -> String {
    "normal".to_string()
}

/// Favicon and web-manifest links for `<head>`. Only set entries are emitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IconsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon_png: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon_svg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon_ico: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apple_touch_icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_title: Option<String>,
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Two 12-step scales. Steps 1-2 are backgrounds, 11-12 are text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub gray: Vec<String>,
    pub primary: Vec<String>,
}

fn scale(values: [&str; SCALE_STEPS]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            gray: scale([
                "#fcfcfc", "#f9f9f9", "#f0f0f0", "#e8e8e8", "#e0e0e0", "#d9d9d9", "#cecece",
                "#bbbbbb", "#8d8d8d", "#838383", "#646464", "#202020",
            ]),
            primary: scale([
                "#fafefd", "#f3fbf9", "#e0f8f3", "#ccf3ea", "#b8eae0", "#a1ded2", "#83cdc1",
                "#53b9ab", "#12a594", "#0d9b8a", "#008573", "#0d3d38",
            ]),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            gray: scale([
                "#111111", "#191919", "#222222", "#2a2a2a", "#313131", "#3a3a3a", "#484848",
                "#606060", "#6e6e6e", "#7b7b7b", "#b4b4b4", "#eeeeee",
            ]),
            primary: scale([
                "#0d1514", "#111c1b", "#0d2d2a", "#023b37", "#084843", "#145750", "#1c6961",
                "#207e73", "#12a594", "#0eb39e", "#0bd8b6", "#adf0dd",
            ]),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key. Everything else, arrays included, is replaced
/// wholesale by the overlay.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(root)?)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# folio configuration
# ===================
# All settings are optional. Values shown are the defaults unless marked
# as an example. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
# Shown in the header and used as the fallback page title.
name = "My Site"
# Canonical origin for canonical links, og:url and the sitemap. No trailing slash.
base_url = "https://example.com"
# <html lang="...">
language = "en"
# Header logo, served from assets/ (example).
# logo = "/logo.svg"

# ---------------------------------------------------------------------------
# SEO defaults (pages override title/description in their front matter)
# ---------------------------------------------------------------------------
[seo]
title = "My Site"
description = ""

[seo.open_graph]
type = "website"
locale = "en_US"

# Share images (example).
# [[seo.open_graph.images]]
# url = "https://example.com/banner.png"
# alt = "My Site"
# width = 1280
# height = 720

[seo.twitter]
card_type = "summary_large_image"
# handle = "@someone"
# site = "@someone"

# ---------------------------------------------------------------------------
# Navigation (example). Without [[nav]] the menu is Home + numbered pages.
# exact = true marks a link active only on its own path; otherwise any path
# starting with href counts.
# ---------------------------------------------------------------------------
# [[nav]]
# href = "/"
# label = "Home"
# exact = true
#
# [[nav]]
# href = "/about"
# label = "About"

# ---------------------------------------------------------------------------
# Redirects and rewrites (examples), written to _redirects for the host.
# :name binds one segment, :name* binds the rest of the path.
# ---------------------------------------------------------------------------
# [[redirects]]
# source = "/blog/:path*"
# destination = "/articles/:path*"
# permanent = true
#
# [[rewrites]]
# source = "/sb-api/:slug"
# destination = "https://hive.splitbee.io/:slug"

# ---------------------------------------------------------------------------
# Colors: 12-step scales exposed as --gray-1..12 and --primary-1..12.
# Steps 1-2 are backgrounds, 6-8 borders, 11-12 text.
# ---------------------------------------------------------------------------
[colors.light]
gray = ["#fcfcfc", "#f9f9f9", "#f0f0f0", "#e8e8e8", "#e0e0e0", "#d9d9d9", "#cecece", "#bbbbbb", "#8d8d8d", "#838383", "#646464", "#202020"]
primary = ["#fafefd", "#f3fbf9", "#e0f8f3", "#ccf3ea", "#b8eae0", "#a1ded2", "#83cdc1", "#53b9ab", "#12a594", "#0d9b8a", "#008573", "#0d3d38"]

# Applied under @media (prefers-color-scheme: dark).
[colors.dark]
gray = ["#111111", "#191919", "#222222", "#2a2a2a", "#313131", "#3a3a3a", "#484848", "#606060", "#6e6e6e", "#7b7b7b", "#b4b4b4", "#eeeeee"]
primary = ["#0d1514", "#111c1b", "#0d2d2a", "#023b37", "#084843", "#145750", "#1c6961", "#207e73", "#12a594", "#0eb39e", "#0bd8b6", "#adf0dd"]

# ---------------------------------------------------------------------------
# Theme
# ---------------------------------------------------------------------------
[theme]
font_family = "ui-monospace, SFMono-Regular, Menlo, monospace"
max_width = "48rem"

# Self-hosted fonts (example), emitted as @font-face rules.
# [[fonts]]
# family = "Berkeley Mono"
# src = "/fonts/BerkeleyMono-Regular.woff2"
# weight = 400
# style = "normal"

# ---------------------------------------------------------------------------
# Icons (examples). Only configured entries are linked from <head>.
# ---------------------------------------------------------------------------
[icons]
# favicon_png = "/icons/favicon-96x96.png"
# favicon_svg = "/icons/favicon.svg"
# favicon_ico = "/icons/favicon.ico"
# apple_touch_icon = "/icons/apple-touch-icon.png"
# manifest = "/icons/site.webmanifest"
# app_title = "My Site"
"##
}

fn scale_vars(prefix: &str, values: &[String], indent: &str) -> String {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{indent}--{prefix}-{}: {v};\n", i + 1))
        .collect()
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        ":root {{\n{}{}}}\n\n@media (prefers-color-scheme: dark) {{\n    :root {{\n{}{}    }}\n}}",
        scale_vars("gray", &colors.light.gray, "    "),
        scale_vars("primary", &colors.light.primary, "    "),
        scale_vars("gray", &colors.dark.gray, "        "),
        scale_vars("primary", &colors.dark.primary, "        "),
    )
}

/// Generate CSS custom properties from theme config.
pub fn generate_theme_css(theme: &ThemeConfig) -> String {
    format!(
        r#":root {{
    --font-family: {font_family};
    --max-width: {max_width};
}}"#,
        font_family = theme.font_family,
        max_width = theme.max_width,
    )
}

/// Generate `@font-face` rules for self-hosted fonts.
pub fn generate_font_css(fonts: &[FontFace]) -> String {
    fonts
        .iter()
        .map(|f| {
            format!(
                "@font-face {{\n    font-family: \"{}\";\n    src: url(\"{}\") format(\"{}\");\n    font-weight: {};\n    font-style: {};\n    font-display: swap;\n}}\n",
                f.family,
                f.src,
                font_format(&f.src),
                f.weight,
                f.style
            )
        })
        .collect()
}

fn font_format(src: &str) -> &'static str {
    match src.rsplit('.').next().map(str::to_ascii_lowercase).as_deref() {
        Some("woff") => "woff",
        Some("ttf") => "truetype",
        Some("otf") => "opentype",
        _ => "woff2",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_config_is_valid() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn default_scales_have_twelve_steps() {
        let colors = ColorConfig::default();
        assert_eq!(colors.light.gray.len(), SCALE_STEPS);
        assert_eq!(colors.light.primary.len(), SCALE_STEPS);
        assert_eq!(colors.dark.gray.len(), SCALE_STEPS);
        assert_eq!(colors.dark.primary.len(), SCALE_STEPS);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[site]
name = "Ravensburg Technologies"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.site.name, "Ravensburg Technologies");
        assert_eq!(config.site.base_url, "https://example.com");
        assert_eq!(config.theme.max_width, "48rem");
    }

    #[test]
    fn stock_config_matches_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.site.name, defaults.site.name);
        assert_eq!(config.colors.dark.primary, defaults.colors.dark.primary);
        assert_eq!(config.colors.light.gray, defaults.colors.light.gray);
        assert_eq!(config.theme.font_family, defaults.theme.font_family);
        assert_eq!(config.seo.open_graph.og_type, defaults.seo.open_graph.og_type);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site.name, "My Site");
        assert!(config.nav.is_empty());
    }

    #[test]
    fn load_config_reads_nav_and_routes() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[site]
base_url = "https://pgvr.dev"

[[nav]]
href = "/"
label = "Home"
exact = true

[[nav]]
href = "/about"
label = "About"

[[redirects]]
source = "/blog/:path*"
destination = "/articles/:path*"
permanent = true

[[rewrites]]
source = "/sb.js"
destination = "https://cdn.splitbee.io/sb.js"
"#,
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.nav.len(), 2);
        assert!(config.nav[0].exact);
        assert!(!config.nav[1].exact);
        assert_eq!(config.redirects.len(), 1);
        assert_eq!(config.rewrites.len(), 1);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn unknown_key_rejected() {
        let toml = r#"
[site]
nmae = "typo"
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let toml = r#"
[images]
quality = 90
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn validate_base_url_scheme() {
        let mut config = SiteConfig::default();
        config.site.base_url = "pgvr.dev".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_base_url_trailing_slash() {
        let mut config = SiteConfig::default();
        config.site.base_url = "https://pgvr.dev/".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_scale_length() {
        let mut config = SiteConfig::default();
        config.colors.dark.gray.pop();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("colors.dark.gray"), "{err}");
    }

    #[test]
    fn validate_empty_nav_href() {
        let mut config = SiteConfig::default();
        config.nav.push(NavEntryConfig {
            href: String::new(),
            label: "Broken".into(),
            exact: false,
        });
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_bad_route_pattern() {
        let mut config = SiteConfig::default();
        config.redirects.push(Redirect {
            source: "blog".into(),
            destination: "/articles".into(),
            permanent: true,
        });
        assert!(matches!(config.validate(), Err(ConfigError::Route(_))));
    }

    #[test]
    fn merge_toml_replaces_arrays() {
        let base: toml::Value = toml::from_str(r#"gray = ["a", "b"]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"gray = ["c"]"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("gray").unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn merge_toml_deep_nested() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str(
            r#"
[seo.twitter]
handle = "@patrick_gvr"
"#,
        )
        .unwrap();
        let config: SiteConfig = merge_toml(base, overlay).try_into().unwrap();
        assert_eq!(config.seo.twitter.handle.as_deref(), Some("@patrick_gvr"));
        assert_eq!(config.seo.twitter.card_type, "summary_large_image");
    }

    #[test]
    fn color_css_has_all_steps_and_dark_mode() {
        let css = generate_color_css(&ColorConfig::default());
        assert!(css.contains("--gray-1: #fcfcfc;"));
        assert!(css.contains("--primary-12: #0d3d38;"));
        assert!(css.contains("@media (prefers-color-scheme: dark)"));
        assert!(css.contains("--gray-12: #eeeeee;"));
    }

    #[test]
    fn theme_css_variables() {
        let css = generate_theme_css(&ThemeConfig::default());
        assert!(css.contains("--max-width: 48rem;"));
        assert!(css.contains("--font-family:"));
    }

    #[test]
    fn font_css_picks_format_from_extension() {
        let fonts = vec![
            FontFace {
                family: "Berkeley Mono".into(),
                src: "/fonts/BerkeleyMono-Bold.woff2".into(),
                weight: 700,
                style: "normal".into(),
            },
            FontFace {
                family: "Fallback".into(),
                src: "/fonts/f.ttf".into(),
                weight: 400,
                style: "italic".into(),
            },
        ];
        let css = generate_font_css(&fonts);
        assert!(css.contains("font-weight: 700;"));
        assert!(css.contains(r#"format("woff2")"#));
        assert!(css.contains(r#"format("truetype")"#));
        assert!(css.contains("font-style: italic;"));
    }

    #[test]
    fn font_weight_and_style_default() {
        let toml = r#"
[[fonts]]
family = "Berkeley Mono"
src = "/fonts/b.woff2"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.fonts[0].weight, 400);
        assert_eq!(config.fonts[0].style, "normal");
    }
}
