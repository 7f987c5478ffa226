//! CLI output formatting for all pipeline stages.
//!
//! Output is information-first: every page leads with its position and
//! title, and the file it came from or went to is an indented context line.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Pages
//! 001 Hi, I'm Patrick → /about
//!     Source: 010-about.md
//! 002 Photos → /photos (3 photos)
//!     Source: 030-photos/
//!
//! Hidden pages
//!     Thanks for subscribing. → /thank-you
//!
//! Navigation
//!     Home → / (exact)
//!     About → /about
//!
//! Routes
//!     /blog/:path* → /articles/:path* (permanent redirect)
//!
//! Config
//!     config.toml
//!     assets/
//! ```
//!
//! ## Generate
//!
//! ```text
//! / → index.html
//! /about → about/index.html
//!
//! Generated 8 pages, 3 photos, 4 assets → style.1a2b3c4d.css
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::config::SiteConfig;
use crate::generate::GenerateSummary;
use crate::nav::MatchMode;
use crate::routes::{Lookup, Resolution};
use crate::scan::Manifest;
use crate::types::{Page, PageBody};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Item count shown after a page header, e.g. `(3 photos)`.
fn body_detail(body: &PageBody) -> Option<String> {
    match body {
        PageBody::Projects { projects, .. } => Some(plural(projects.len(), "project")),
        PageBody::Uses { sections, .. } => {
            let tools: usize = sections.iter().map(|s| s.tools.len()).sum();
            Some(format!(
                "{}, {}",
                plural(sections.len(), "section"),
                plural(tools, "tool")
            ))
        }
        PageBody::Photos { photos, .. } => Some(plural(photos.len(), "photo")),
        PageBody::Markdown { .. } | PageBody::Link { .. } => None,
    }
}

fn page_header(index: usize, page: &Page) -> String {
    let target = match &page.body {
        PageBody::Link { url } => url.clone(),
        _ => page.url_path(),
    };
    match body_detail(&page.body) {
        Some(detail) => format!("{} {} → {} ({})", format_index(index), page.title, target, detail),
        None => format!("{} {} → {}", format_index(index), page.title, target),
    }
}

fn route_lines(config: &SiteConfig) -> Vec<String> {
    let mut lines = Vec::new();
    for r in &config.redirects {
        let kind = if r.permanent {
            "permanent redirect"
        } else {
            "redirect"
        };
        lines.push(format!("{}{} → {} ({kind})", indent(1), r.source, r.destination));
    }
    for r in &config.rewrites {
        lines.push(format!("{}{} → {} (rewrite)", indent(1), r.source, r.destination));
    }
    lines
}

// ============================================================================
// Stage 1: Scan output
// ============================================================================

/// Format scan stage output: pages, navigation, routes and config sources.
pub fn format_scan_output(manifest: &Manifest, source_root: &Path) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];

    let (listed, hidden): (Vec<&Page>, Vec<&Page>) = manifest
        .pages
        .iter()
        .partition(|p| p.in_nav || p.is_home());

    for (i, page) in listed.iter().enumerate() {
        lines.push(page_header(i + 1, page));
        if !page.source.is_empty() {
            lines.push(format!("{}Source: {}", indent(1), page.source));
        }
        if let Some(intro) = page.body.intro() {
            lines.push(format!("{}Intro: {}", indent(1), truncate_desc(intro, 60)));
        }
    }

    if !hidden.is_empty() {
        lines.push(String::new());
        lines.push("Hidden pages".to_string());
        for page in hidden {
            lines.push(format!("{}{} → {}", indent(1), page.title, page.url_path()));
        }
    }

    lines.push(String::new());
    lines.push("Navigation".to_string());
    for link in &manifest.navigation {
        let suffix = if link.external {
            " (external)"
        } else if link.match_mode == MatchMode::Exact {
            " (exact)"
        } else {
            ""
        };
        lines.push(format!("{}{} → {}{suffix}", indent(1), link.label, link.href));
    }

    let routes = route_lines(&manifest.config);
    if !routes.is_empty() {
        lines.push(String::new());
        lines.push("Routes".to_string());
        lines.extend(routes);
    }

    let has_config = source_root.join("config.toml").exists();
    if has_config || manifest.assets_dir.is_some() {
        lines.push(String::new());
        lines.push("Config".to_string());
        if has_config {
            lines.push(format!("{}config.toml", indent(1)));
        }
        if let Some(assets) = &manifest.assets_dir {
            lines.push(format!("{}{assets}/", indent(1)));
        }
    }

    lines
}

pub fn print_scan_output(manifest: &Manifest, source_root: &Path) {
    for line in format_scan_output(manifest, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Generate output
// ============================================================================

/// Format generate stage output: one line per page, then totals.
pub fn format_generate_output(summary: &GenerateSummary) -> Vec<String> {
    let mut lines: Vec<String> = summary
        .pages
        .iter()
        .map(|p| format!("{} → {}", p.url_path, p.file))
        .collect();

    lines.push(String::new());
    let mut totals = format!(
        "Generated {}, {}, {} → {}",
        plural(summary.pages.len(), "page"),
        plural(summary.photos_copied, "photo"),
        plural(summary.assets_copied, "asset"),
        summary.stylesheet
    );
    if summary.redirects_written {
        totals.push_str(", _redirects");
    }
    lines.push(totals);
    lines.push(format!(
        "Sitemap: {}",
        plural(summary.sitemap_entries, "URL")
    ));
    lines
}

pub fn print_generate_output(summary: &GenerateSummary) {
    for line in format_generate_output(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Route lookup
// ============================================================================

/// Format the result of `folio route <path>`.
pub fn format_lookup(path: &str, lookup: &Lookup) -> String {
    match lookup {
        Lookup::Route(Resolution::Redirect {
            destination,
            permanent: true,
        }) => format!("{path} → {destination} (permanent redirect, 308)"),
        Lookup::Route(Resolution::Redirect { destination, .. }) => {
            format!("{path} → {destination} (redirect, 307)")
        }
        Lookup::Route(Resolution::Rewrite { destination }) => {
            format!("{path} → {destination} (rewrite)")
        }
        Lookup::Page => format!("{path} → page"),
        Lookup::NotFound => format!("{path} → not found (404.html)"),
    }
}

pub fn print_lookup(path: &str, lookup: &Lookup) {
    println!("{}", format_lookup(path, lookup));
}
