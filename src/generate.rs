//! HTML site generation.
//!
//! Stage 2 of the build pipeline. Takes the scan manifest and writes the
//! final static site.
//!
//! ## Generated Files
//!
//! ```text
//! dist/
//! ├── index.html                 # Home page (/)
//! ├── about/index.html           # One directory per page → clean URL /about
//! ├── photos/
//! │   ├── index.html
//! │   └── 001-coast.jpg          # Gallery images, copied unchanged
//! ├── 404.html
//! ├── style.1a2b3c4d.css         # Generated CSS, content-hashed filename
//! ├── sitemap.xml                # Every page not marked noindex
//! ├── _redirects                 # Only when redirects/rewrites are configured
//! └── ...                        # Everything under content/assets/
//! ```
//!
//! ## Active Navigation
//!
//! Each page renders the navigation bar with its own URL path as the current
//! path, so the matching link gets `font-medium` and `aria-current="page"`.
//! See [`crate::nav::is_active`] for the matching rules.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! All interpolated content is escaped; only rendered markdown is inserted
//! pre-escaped.

use crate::config::{self, IconsConfig, SiteConfig};
use crate::nav::NavLink;
use crate::routes::{self, RouteError};
use crate::scan::Manifest;
use crate::seo::{self, SeoMeta};
use crate::types::{Page, PageBody, PageMeta, Photo, Project, ToolSection};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Options, Parser, html as md_html};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to walk assets: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid route: {0}")]
    Route(#[from] RouteError),
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const NOT_FOUND_PATH: &str = "/404";

/// One written HTML page.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPage {
    pub title: String,
    pub url_path: String,
    /// Output file relative to the output directory.
    pub file: String,
}

/// What a generate run produced, for CLI output.
#[derive(Debug, Default)]
pub struct GenerateSummary {
    pub pages: Vec<GeneratedPage>,
    pub stylesheet: String,
    pub photos_copied: usize,
    pub assets_copied: usize,
    pub sitemap_entries: usize,
    pub redirects_written: bool,
}

/// Read a manifest written by the scan stage and generate the site from it.
pub fn generate(
    manifest_path: &Path,
    source_root: &Path,
    output_dir: &Path,
) -> Result<GenerateSummary, GenerateError> {
    let manifest_content = fs::read_to_string(manifest_path)?;
    let manifest: Manifest = serde_json::from_str(&manifest_content)?;
    generate_site(&manifest, source_root, output_dir)
}

pub fn generate_site(
    manifest: &Manifest,
    source_root: &Path,
    output_dir: &Path,
) -> Result<GenerateSummary, GenerateError> {
    let config = &manifest.config;
    fs::create_dir_all(output_dir)?;

    let mut summary = GenerateSummary::default();

    if let Some(assets) = &manifest.assets_dir {
        summary.assets_copied = copy_assets(&source_root.join(assets), output_dir)?;
    }

    let css = build_css(config);
    summary.stylesheet = stylesheet_filename(&css);
    fs::write(output_dir.join(&summary.stylesheet), &css)?;
    let stylesheet_href = format!("/{}", summary.stylesheet);

    let ctx = RenderContext {
        config,
        navigation: &manifest.navigation,
        stylesheet_href: &stylesheet_href,
    };

    let mut sitemap_urls = Vec::new();
    for page in manifest.pages.iter().filter(|p| !p.is_link()) {
        let file = page.output_file();
        let target = output_dir.join(&file);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let seo = page_seo(config, page);
        if seo.is_indexable() {
            sitemap_urls.push(seo.canonical.clone());
        }
        fs::write(&target, render_page(&ctx, page, &seo).into_string())?;

        if let PageBody::Photos { photos, .. } = &page.body {
            summary.photos_copied += copy_photos(photos, source_root, &output_dir.join(&page.slug))?;
        }

        summary.pages.push(GeneratedPage {
            title: page.title.clone(),
            url_path: page.url_path(),
            file,
        });
    }

    fs::write(
        output_dir.join("404.html"),
        render_not_found(&ctx).into_string(),
    )?;

    summary.sitemap_entries = sitemap_urls.len();
    fs::write(
        output_dir.join("sitemap.xml"),
        render_sitemap(&sitemap_urls).into_string(),
    )?;

    let table = config.route_table()?;
    if !table.is_empty() {
        fs::write(
            output_dir.join("_redirects"),
            routes::render_redirects_file(&table),
        )?;
        summary.redirects_written = true;
    }

    Ok(summary)
}

fn page_seo(config: &SiteConfig, page: &Page) -> SeoMeta {
    let heading = (!page.is_home()).then_some(page.title.as_str());
    seo::resolve(&config.seo, &config.site, &page.meta, heading, &page.url_path())
}

/// Font faces, colour scales and theme variables, followed by the base stylesheet.
pub fn build_css(config: &SiteConfig) -> String {
    let mut parts = Vec::new();
    let fonts = config::generate_font_css(&config.fonts);
    if !fonts.is_empty() {
        parts.push(fonts);
    }
    parts.push(config::generate_color_css(&config.colors));
    parts.push(config::generate_theme_css(&config.theme));
    parts.push(CSS_STATIC.to_string());
    parts.join("\n\n")
}

/// `style.<hash>.css`, where `<hash>` is the first 8 hex chars of the CSS's SHA-256.
pub fn stylesheet_filename(css: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(css.as_bytes()));
    format!("style.{}.css", &digest[..8])
}

fn copy_photos(photos: &[Photo], source_root: &Path, dest_dir: &Path) -> std::io::Result<usize> {
    fs::create_dir_all(dest_dir)?;
    for photo in photos {
        fs::copy(
            source_root.join(&photo.source_path),
            dest_dir.join(&photo.filename),
        )?;
    }
    Ok(photos.len())
}

fn copy_assets(src: &Path, dst: &Path) -> Result<usize, GenerateError> {
    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

// ============================================================================
// HTML Components
// ============================================================================

struct RenderContext<'a> {
    config: &'a SiteConfig,
    navigation: &'a [NavLink],
    stylesheet_href: &'a str,
}

/// Renders the base HTML document structure
fn base_document(
    ctx: &RenderContext,
    seo: &SeoMeta,
    current_path: &str,
    content: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(ctx.config.site.language) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                (seo::render_meta(seo))
                (icon_links(&ctx.config.icons))
                link rel="stylesheet" href=(ctx.stylesheet_href);
            }
            body.antialiased {
                div.container {
                    (site_header(ctx, current_path))
                    main.page-content {
                        (content)
                    }
                }
            }
        }
    }
}

fn icon_links(icons: &IconsConfig) -> Markup {
    html! {
        @if let Some(href) = &icons.favicon_png {
            link rel="icon" type="image/png" href=(href) sizes="96x96";
        }
        @if let Some(href) = &icons.favicon_svg {
            link rel="icon" type="image/svg+xml" href=(href);
        }
        @if let Some(href) = &icons.favicon_ico {
            link rel="shortcut icon" href=(href);
        }
        @if let Some(href) = &icons.apple_touch_icon {
            link rel="apple-touch-icon" sizes="180x180" href=(href);
        }
        @if let Some(title) = &icons.app_title {
            meta name="apple-mobile-web-app-title" content=(title);
        }
        @if let Some(href) = &icons.manifest {
            link rel="manifest" href=(href);
        }
    }
}

/// Site name, optional logo, and the navigation bar.
fn site_header(ctx: &RenderContext, current_path: &str) -> Markup {
    let site = &ctx.config.site;
    html! {
        header.site-header {
            div.brand {
                a.site-name href="/" { (site.name) }
                @if let Some(logo) = &site.logo {
                    img.logo src=(logo) alt=(site.name);
                }
            }
            (render_nav(ctx.navigation, current_path))
        }
    }
}

/// Renders the navigation bar, marking the link active for `current_path`.
pub fn render_nav(links: &[NavLink], current_path: &str) -> Markup {
    html! {
        nav.site-nav {
            @for link in links {
                @let active = link.is_active(current_path);
                @let class = if active { "hover:underline font-medium" } else { "hover:underline" };
                @if link.external {
                    a class=(class) href=(link.href) target="_blank" rel="noreferrer" { (link.label) }
                } @else {
                    a class=(class) href=(link.href) aria-current=[active.then_some("page")] {
                        (link.label)
                    }
                }
            }
        }
    }
}

fn page_heading(title: &str, intro: Option<&str>) -> Markup {
    html! {
        header.page-header {
            h1 { (title) }
            @if let Some(intro) = intro {
                p.intro { (intro) }
            }
        }
    }
}

fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

// ============================================================================
// Page Renderers
// ============================================================================

fn render_page(ctx: &RenderContext, page: &Page, seo: &SeoMeta) -> Markup {
    let body = match &page.body {
        PageBody::Markdown { markdown, .. } => render_markdown_body(markdown),
        PageBody::Projects { projects, .. } => render_projects(projects),
        PageBody::Uses { sections, .. } => render_uses(sections),
        PageBody::Photos { photos, .. } => render_photos(page, photos),
        PageBody::Link { .. } => html! {},
    };
    let content = html! {
        (page_heading(&page.title, page.body.intro()))
        (body)
    };
    base_document(ctx, seo, &page.url_path(), content)
}

fn render_markdown_body(markdown: &str) -> Markup {
    html! {
        @if !markdown.is_empty() {
            article.prose {
                (PreEscaped(markdown_to_html(markdown)))
            }
        }
    }
}

fn render_projects(projects: &[Project]) -> Markup {
    html! {
        ul.project-grid role="list" {
            @for project in projects {
                li.card {
                    @if let Some(logo) = &project.logo {
                        div.card-logo {
                            img src=(logo) alt="" loading="lazy";
                        }
                    }
                    h2.card-title {
                        a href=(project.link.href) target="_blank" rel="noreferrer" {
                            (project.name)
                        }
                    }
                    p.card-description { (project.description) }
                    p.card-link { "↗ " (project.link.label) }
                }
            }
        }
    }
}

fn render_uses(sections: &[ToolSection]) -> Markup {
    html! {
        div.tool-sections {
            @for section in sections {
                section.tool-section {
                    h2.section-title { (section.title) }
                    ul.tool-list role="list" {
                        @for tool in &section.tools {
                            li.card {
                                h3.card-title {
                                    @if let Some(href) = &tool.href {
                                        a href=(href) target="_blank" rel="noreferrer" { (tool.title) }
                                    } @else {
                                        (tool.title)
                                    }
                                }
                                p.card-description { (tool.description) }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Photos are linked root-relative: pages are served without a trailing
/// slash, so a bare filename would resolve against the parent directory.
fn render_photos(page: &Page, photos: &[Photo]) -> Markup {
    html! {
        div.photo-grid {
            @for photo in photos {
                @let src = format!("/{}", page.output_path(&photo.filename));
                a.photo href=(src) {
                    img src=(src) alt=(photo.alt) width=(photo.width) height=(photo.height) loading="lazy";
                }
            }
        }
    }
}

fn render_not_found(ctx: &RenderContext) -> Markup {
    let meta = PageMeta {
        noindex: true,
        ..PageMeta::default()
    };
    let seo = seo::resolve(
        &ctx.config.seo,
        &ctx.config.site,
        &meta,
        Some("Page not found"),
        NOT_FOUND_PATH,
    );
    let content = html! {
        (page_heading("Page not found", Some("Sorry, there is nothing at this address.")))
        p { a class="hover:underline" href="/" { "Back home" } }
    };
    base_document(ctx, &seo, NOT_FOUND_PATH, content)
}

fn render_sitemap(urls: &[String]) -> Markup {
    html! {
        (PreEscaped(r#"<?xml version="1.0" encoding="UTF-8"?>"#))
        "\n"
        urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" {
            @for href in urls {
                url { loc { (href) } }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::MatchMode;
    use crate::test_helpers::*;
    use crate::types::{ProjectLink, Tool};

    fn nav() -> Vec<NavLink> {
        vec![
            NavLink::new("/", "Home", MatchMode::Exact),
            NavLink::new("/about", "About", MatchMode::Prefix),
            NavLink::new("/contact", "Contact", MatchMode::Prefix),
            NavLink::external("https://github.com/pgvr", "GitHub"),
        ]
    }

    fn active_labels(html: &str) -> Vec<String> {
        html.split("<a ")
            .filter(|a| a.contains("font-medium"))
            .filter_map(|a| a.split('>').nth(1))
            .map(|s| s.trim_end_matches("</a").to_string())
            .collect()
    }

    #[test]
    fn nav_marks_home_only_on_root() {
        let html = render_nav(&nav(), "/").into_string();
        assert_eq!(active_labels(&html), ["Home"]);
    }

    #[test]
    fn nav_marks_prefix_match() {
        let html = render_nav(&nav(), "/about/team").into_string();
        assert_eq!(active_labels(&html), ["About"]);
        assert!(html.contains(r#"aria-current="page""#));
    }

    #[test]
    fn nav_marks_nothing_on_unknown_path() {
        let html = render_nav(&nav(), "/uses").into_string();
        assert!(active_labels(&html).is_empty());
        assert!(!html.contains("aria-current"));
    }

    #[test]
    fn nav_prefix_quirk_is_preserved() {
        let html = render_nav(&nav(), "/about-me").into_string();
        assert_eq!(active_labels(&html), ["About"]);
    }

    #[test]
    fn nav_external_links_open_new_tab() {
        let html = render_nav(&nav(), "/").into_string();
        assert!(html.contains(r#"href="https://github.com/pgvr" target="_blank" rel="noreferrer""#));
    }

    #[test]
    fn nav_escapes_labels() {
        let links = vec![NavLink::new("/x", "<script>alert('xss')</script>", MatchMode::Prefix)];
        let html = render_nav(&links, "/").into_string();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    fn page(slug: &str, body: PageBody) -> Page {
        Page {
            title: slug.into(),
            link_title: slug.into(),
            slug: slug.into(),
            in_nav: true,
            sort_key: 1,
            source: String::new(),
            meta: PageMeta::default(),
            body,
        }
    }

    #[test]
    fn output_file_for_home_and_pages() {
        let markdown = || PageBody::Markdown {
            intro: None,
            markdown: String::new(),
        };
        assert_eq!(page("", markdown()).output_file(), "index.html");
        assert_eq!(page("about", markdown()).output_file(), "about/index.html");
    }

    #[test]
    fn markdown_supports_tables_and_strikethrough() {
        let html = markdown_to_html("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~old~~");
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>old</del>"));
    }

    #[test]
    fn projects_render_cards() {
        let projects = vec![Project {
            name: "hyzerbase".into(),
            description: "Experience disc golf at home.".into(),
            link: ProjectLink {
                href: "https://hyzerbase.com".into(),
                label: "hyzerbase.com".into(),
            },
            logo: Some("/logos/hyzerbase.png".into()),
        }];
        let html = render_projects(&projects).into_string();
        assert!(html.contains(r#"href="https://hyzerbase.com" target="_blank" rel="noreferrer""#));
        assert!(html.contains(r#"src="/logos/hyzerbase.png""#));
        assert!(html.contains("hyzerbase.com</p>"));
    }

    #[test]
    fn uses_render_sections_with_optional_links() {
        let sections = vec![ToolSection {
            title: "Development tools".into(),
            tools: vec![
                Tool {
                    title: "VS Code".into(),
                    href: Some("https://code.visualstudio.com".into()),
                    description: "Editor.".into(),
                },
                Tool {
                    title: "iTerm2".into(),
                    href: None,
                    description: "Terminal.".into(),
                },
            ],
        }];
        let html = render_uses(&sections).into_string();
        assert!(html.contains("<h2 class=\"section-title\">Development tools</h2>"));
        assert!(html.contains(r#"href="https://code.visualstudio.com""#));
        assert!(html.contains("<h3 class=\"card-title\">iTerm2</h3>"));
    }

    #[test]
    fn photos_render_dimensions() {
        let photos = vec![Photo {
            number: Some(1),
            source_path: "030-photos/001-coast.jpg".into(),
            filename: "001-coast.jpg".into(),
            alt: "coast".into(),
            width: 1600,
            height: 1200,
        }];
        let gallery = page(
            "photos",
            PageBody::Photos {
                intro: None,
                photos: photos.clone(),
            },
        );
        let html = render_photos(&gallery, &photos).into_string();
        assert!(html.contains(r#"<a class="photo" href="/photos/001-coast.jpg">"#));
        assert!(html.contains(
            r#"src="/photos/001-coast.jpg" alt="coast" width="1600" height="1200" loading="lazy""#
        ));
    }

    #[test]
    fn stylesheet_name_is_content_hashed() {
        let a = stylesheet_filename("body {}");
        let b = stylesheet_filename("body { color: red }");
        assert!(a.starts_with("style.") && a.ends_with(".css"));
        assert_eq!(a.len(), "style.".len() + 8 + ".css".len());
        assert_ne!(a, b);
        assert_eq!(a, stylesheet_filename("body {}"));
    }

    #[test]
    fn css_includes_generated_and_static_parts() {
        let css = build_css(&SiteConfig::default());
        assert!(css.contains("--gray-1:"));
        assert!(css.contains("--max-width:"));
        assert!(css.contains(".site-nav"));
        assert!(!css.contains("@font-face"));
    }

    #[test]
    fn sitemap_lists_urls() {
        let xml = render_sitemap(&["https://pgvr.dev".into(), "https://pgvr.dev/about".into()])
            .into_string();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<url><loc>https://pgvr.dev/about</loc></url>"));
    }

    // =========================================================================
    // Full site from fixtures
    // =========================================================================

    fn generate_fixtures() -> (tempfile::TempDir, tempfile::TempDir, GenerateSummary) {
        let content = setup_fixtures();
        let out = tempfile::TempDir::new().unwrap();
        let manifest = crate::scan::scan(content.path()).unwrap();
        let summary = generate_site(&manifest, content.path(), out.path()).unwrap();
        (content, out, summary)
    }

    fn read(dir: &Path, file: &str) -> String {
        fs::read_to_string(dir.join(file)).unwrap()
    }

    #[test]
    fn site_writes_page_per_non_link_page() {
        let (_content, out, summary) = generate_fixtures();
        let files: Vec<&str> = summary.pages.iter().map(|p| p.file.as_str()).collect();
        assert_eq!(
            files,
            [
                "index.html",
                "about/index.html",
                "projects/index.html",
                "photos/index.html",
                "uses/index.html",
                "contact/index.html",
                "thank-you/index.html",
                "wo/index.html",
            ]
        );
        assert!(!out.path().join("github").exists());
        assert!(out.path().join("404.html").is_file());
    }

    #[test]
    fn site_marks_current_page_in_nav() {
        let (_content, out, _) = generate_fixtures();
        assert_eq!(active_labels(&read(out.path(), "index.html")), ["Home"]);
        assert_eq!(active_labels(&read(out.path(), "about/index.html")), ["About"]);
        assert!(active_labels(&read(out.path(), "thank-you/index.html")).is_empty());
        assert!(active_labels(&read(out.path(), "404.html")).is_empty());
    }

    #[test]
    fn site_copies_photos_and_assets() {
        let (_content, out, summary) = generate_fixtures();
        assert_eq!(summary.photos_copied, 3);
        assert_eq!(summary.assets_copied, 1);
        assert!(out.path().join("photos/001-coast.png").is_file());
        assert!(out.path().join("logo.svg").is_file());

        // Every gallery src must name a file that exists in the output.
        let gallery = read(out.path(), "photos/index.html");
        let srcs: Vec<&str> = gallery
            .split(r#"<img src=""#)
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
            .collect();
        assert_eq!(srcs.len(), 3);
        for src in srcs {
            let file = src.strip_prefix('/').unwrap();
            assert!(out.path().join(file).is_file(), "{src} does not resolve");
        }
        assert!(out.path().join(&summary.stylesheet).is_file());
        assert!(read(out.path(), "about/index.html").contains(&format!("/{}", summary.stylesheet)));
    }

    #[test]
    fn site_head_uses_page_seo() {
        let (_content, out, _) = generate_fixtures();
        let about = read(out.path(), "about/index.html");
        assert!(about.contains("<title>About - Patrick Göler von Ravensburg</title>"));
        assert!(about.contains(r#"<link rel="canonical" href="https://pgvr.dev/about">"#));
        let uses = read(out.path(), "uses/index.html");
        assert!(uses.contains("<title>Uses - Patrick Göler von Ravensburg – Software Engineer</title>"));
        let wo = read(out.path(), "wo/index.html");
        assert!(wo.contains(r#"content="noindex,nofollow""#));
    }

    #[test]
    fn site_sitemap_skips_noindex() {
        let (_content, out, summary) = generate_fixtures();
        let xml = read(out.path(), "sitemap.xml");
        assert!(xml.contains("<loc>https://pgvr.dev</loc>"));
        assert!(xml.contains("<loc>https://pgvr.dev/uses</loc>"));
        assert!(!xml.contains("/wo<"));
        assert!(!xml.contains("/404"));
        assert_eq!(summary.sitemap_entries, 7);
    }

    #[test]
    fn site_writes_redirects_file() {
        let (_content, out, summary) = generate_fixtures();
        assert!(summary.redirects_written);
        let redirects = read(out.path(), "_redirects");
        assert!(redirects.contains("/blog/*  /articles/:splat  308!"));
        assert!(redirects.contains("/sb.js  https://cdn.splitbee.io/sb.js  200"));
    }

    #[test]
    fn site_without_routes_has_no_redirects_file() {
        let content = setup_fixtures();
        fs::remove_file(content.path().join("config.toml")).unwrap();
        let out = tempfile::TempDir::new().unwrap();
        let manifest = crate::scan::scan(content.path()).unwrap();
        let summary = generate_site(&manifest, content.path(), out.path()).unwrap();
        assert!(!summary.redirects_written);
        assert!(!out.path().join("_redirects").exists());
    }

    #[test]
    fn generate_reads_manifest_json() {
        let content = setup_fixtures();
        let out = tempfile::TempDir::new().unwrap();
        let manifest = crate::scan::scan(content.path()).unwrap();
        let manifest_path = out.path().join("manifest.json");
        fs::write(&manifest_path, serde_json::to_string_pretty(&manifest).unwrap()).unwrap();

        let site = out.path().join("dist");
        let summary = generate(&manifest_path, content.path(), &site).unwrap();
        assert_eq!(summary.pages.len(), 8);
        assert!(site.join("index.html").is_file());
    }
}
