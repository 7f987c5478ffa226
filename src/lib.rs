//! # Folio
//!
//! A static site generator for small personal sites: an about page, a
//! projects grid, a "uses" list, a photo gallery, a contact page. Your
//! filesystem is the data source: numbered files become pages in the menu,
//! TOML files describe structured pages, and directories of images become
//! galleries.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Scan      content/  →  manifest.json    (filesystem → structured data)
//! 2. Generate  manifest  →  dist/            (final HTML site)
//! ```
//!
//! The manifest is human-readable JSON, so the decisions made during the scan
//! (page order, titles, navigation, photo sizes, resolved config) can be
//! inspected before anything is rendered.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: walks the content directory and produces the manifest |
//! | [`generate`] | Stage 2: renders HTML, CSS, sitemap and `_redirects` using Maud |
//! | [`nav`] | Navigation links and the active-link rule ([`nav::is_active`]) |
//! | [`routes`] | Redirect and rewrite patterns, request path lookup |
//! | [`seo`] | Site-wide SEO defaults, per-page overrides, `<head>` tags |
//! | [`config`] | `config.toml` loading, validation, and CSS generation |
//! | [`types`] | Page types serialized in the manifest |
//! | [`naming`] | `NNN-name` filename convention parser |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Active Links
//!
//! Every page renders the same navigation bar with its own URL path as the
//! current path. A link marked `exact` is active only on its own path; any
//! other link is active whenever the current path starts with its href. The
//! test is a plain string prefix, so `/about` is also active on `/about-me`.
//!
//! ## NNN-Prefix Ordering
//!
//! Files and directories use a numeric prefix (`010-`, `020-`, etc.) for
//! ordering. Entries without a prefix are still generated but stay out of the
//! derived menu: useful for pages like a newsletter thank-you that are only
//! reached by direct link. `index.md` is always the home page.
//!
//! ## Static Hosting Routes
//!
//! The output has no server component. Redirects and rewrites from
//! `config.toml` are written to a `_redirects` file in the format static
//! hosts understand; `folio route <path>` shows how a path will resolve.
//!
//! ## No JavaScript
//!
//! The generated site is HTML and one stylesheet. Colours, fonts and layout
//! width come from config and are emitted as CSS custom properties, with a
//! `prefers-color-scheme: dark` variant.

pub mod config;
pub mod generate;
pub mod naming;
pub mod nav;
pub mod output;
pub mod routes;
pub mod scan;
pub mod seo;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
