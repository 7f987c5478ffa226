//! Content scanning and manifest generation.
//!
//! Stage 1 of the build pipeline. Reads the content root and produces a
//! [`Manifest`] that the generate stage consumes. Everything the site needs
//! is decided here: page order, titles, navigation, photo dimensions, config.
//!
//! ## Directory Structure
//!
//! ```text
//! content/
//! ├── config.toml            # Site configuration (optional)
//! ├── index.md               # Home page, served at /
//! ├── 010-about.md           # Markdown page (numbered = appears in nav)
//! ├── 020-projects.toml      # kind = "projects": card grid
//! ├── 030-photos/            # Photo gallery, images ordered by number
//! │   ├── page.toml          # Optional title / intro / [meta]
//! │   ├── 001-coast.jpg
//! │   └── 002-path.jpg
//! ├── 040-uses.toml          # kind = "uses": sections of tools
//! ├── 050-contact.md
//! ├── 060-github.md          # URL-only content: external nav link
//! ├── thank-you.md           # Unnumbered = generated, hidden from nav
//! └── assets/                # Copied verbatim to the output root
//! ```
//!
//! ## Markdown Front Matter
//!
//! A markdown page may open with a TOML block between `+++` lines:
//!
//! ```text
//! +++
//! title = "Hi, I'm Patrick"
//! nav_title = "About"
//! intro = "Software engineer in Munich."
//!
//! [meta]
//! description = "I live in Munich."
//! noindex = false
//! +++
//! Body in markdown...
//! ```
//!
//! ## Title Resolution
//!
//! First available wins: front matter `title` → first `# heading` (removed
//! from the body so it isn't rendered twice) → filename display title.
//!
//! ## Validation
//!
//! - Slugs are unique across all pages
//! - Photo numbers are unique within a gallery
//! - Every gallery has at least one image
//! - `.toml` pages declare a known `kind`

use crate::config::{self, SiteConfig};
use crate::nav::{self, NavLink};
use crate::naming::parse_entry_name;
use crate::types::{Page, PageBody, PageMeta, Photo, Project, ToolSection};
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid front matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Unterminated front matter (missing closing +++) in {0}")]
    UnterminatedFrontMatter(PathBuf),
    #[error("Invalid page file {path}: {source}")]
    PageToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Unknown page kind '{kind}' in {path} (expected \"projects\" or \"uses\")")]
    UnknownPageKind { kind: String, path: PathBuf },
    #[error("Duplicate page slug '{slug}': {first} and {second}")]
    DuplicateSlug {
        slug: String,
        first: String,
        second: String,
    },
    #[error("Duplicate photo number {0} in {1}")]
    DuplicatePhotoNumber(u32, PathBuf),
    #[error("Photo directory contains no images: {0}")]
    EmptyPhotoDirectory(PathBuf),
    #[error("Cannot read image dimensions of {path}: {source}")]
    ImageDimensions {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Asset {0} would be overwritten by a generated file")]
    AssetConflict(String),
    #[error("Failed to walk assets: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Manifest output from the scan stage.
#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    pub navigation: Vec<NavLink>,
    pub pages: Vec<Page>,
    /// `assets/` relative to the content root, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets_dir: Option<String>,
    pub config: SiteConfig,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];
const ASSETS_DIR: &str = "assets";
const PHOTO_PAGE_FILE: &str = "page.toml";
const FRONT_MATTER_DELIMITER: &str = "+++";

pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    let config = config::load_config(root)?;

    let mut pages = Vec::new();
    for entry in collect_entries(root)? {
        let Some(stem) = entry.file_stem().map(|s| s.to_string_lossy().to_string()) else {
            continue;
        };
        if entry.is_dir() {
            if stem != ASSETS_DIR {
                pages.push(parse_photo_page(root, &entry)?);
            }
            continue;
        }
        match extension_lower(&entry).as_str() {
            "md" => pages.push(parse_markdown_page(root, &entry, &stem)?),
            "toml" => pages.push(parse_toml_page(root, &entry, &stem)?),
            _ => {}
        }
    }

    if !pages.iter().any(Page::is_home) {
        pages.push(default_home(&config));
    }

    check_unique_slugs(&pages)?;
    pages.sort_by(|a, b| {
        (!a.is_home(), a.sort_key, &a.slug).cmp(&(!b.is_home(), b.sort_key, &b.slug))
    });

    let navigation = nav::build_nav(&config.nav, &pages);
    let assets_dir = root
        .join(ASSETS_DIR)
        .is_dir()
        .then(|| ASSETS_DIR.to_string());
    if assets_dir.is_some() {
        check_asset_conflicts(&root.join(ASSETS_DIR), &pages, &config)?;
    }

    Ok(Manifest {
        navigation,
        pages,
        assets_dir,
        config,
    })
}

fn collect_entries(path: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut entries: Vec<PathBuf> = fs::read_dir(path)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            let name = p
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            !name.starts_with('.') && name != "config.toml"
        })
        .collect();
    entries.sort();
    Ok(entries)
}

fn extension_lower(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}

/// Slug, nav flag and sort key for a file stem. `index` is the home page.
struct PageIdentity {
    slug: String,
    display_title: String,
    in_nav: bool,
    sort_key: u32,
}

fn identify(stem: &str) -> PageIdentity {
    if stem == "index" {
        return PageIdentity {
            slug: String::new(),
            display_title: String::new(),
            in_nav: false,
            sort_key: 0,
        };
    }
    let parsed = parse_entry_name(stem);
    PageIdentity {
        slug: parsed.name,
        display_title: parsed.display_title,
        in_nav: parsed.number.is_some(),
        sort_key: parsed.number.unwrap_or(u32::MAX),
    }
}

// ============================================================================
// Markdown pages
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FrontMatter {
    title: Option<String>,
    nav_title: Option<String>,
    intro: Option<String>,
    meta: PageMeta,
}

/// Split a leading `+++` TOML block from the body.
///
/// Returns `Ok(None)` front matter when the file doesn't open with `+++`.
fn split_front_matter<'a>(
    content: &'a str,
    path: &Path,
) -> Result<(Option<FrontMatter>, &'a str), ScanError> {
    let Some(after_open) = content
        .strip_prefix(FRONT_MATTER_DELIMITER)
        .and_then(|rest| rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')))
    else {
        return Ok((None, content));
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end() == FRONT_MATTER_DELIMITER {
            let raw = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            let front: FrontMatter =
                toml::from_str(raw).map_err(|source| ScanError::FrontMatter {
                    path: path.to_path_buf(),
                    source,
                })?;
            return Ok((Some(front), body));
        }
        offset += line.len();
    }
    Err(ScanError::UnterminatedFrontMatter(path.to_path_buf()))
}

/// Pull the first level-1 heading out of a markdown body.
///
/// Headings are found with the markdown parser, so a `# comment` inside a
/// fenced code block is left alone.
fn take_heading(body: &str) -> (Option<String>, String) {
    let mut events = Parser::new(body).into_offset_iter();
    let Some(range) = events.find_map(|(event, range)| match event {
        Event::Start(Tag::Heading {
            level: HeadingLevel::H1,
            ..
        }) => Some(range),
        _ => None,
    }) else {
        return (None, body.to_string());
    };

    let mut text = String::new();
    for (event, _) in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            _ => {}
        }
    }
    let rest = format!("{}{}", &body[..range.start], &body[range.end..]);
    (Some(text.trim().to_string()), rest)
}

fn is_url_only(content: &str) -> bool {
    let trimmed = content.trim();
    !trimmed.contains(char::is_whitespace)
        && (trimmed.starts_with("http://") || trimmed.starts_with("https://"))
}

fn parse_markdown_page(root: &Path, path: &Path, stem: &str) -> Result<Page, ScanError> {
    let id = identify(stem);
    let content = fs::read_to_string(path)?;
    let (front, body) = split_front_matter(&content, path)?;

    let link_title = front
        .as_ref()
        .and_then(|f| f.nav_title.clone())
        .unwrap_or_else(|| id.display_title.clone());

    if front.is_none() && is_url_only(body) {
        return Ok(Page {
            title: link_title.clone(),
            link_title,
            slug: id.slug,
            in_nav: id.in_nav,
            sort_key: id.sort_key,
            source: relative(root, path),
            meta: PageMeta::default(),
            body: PageBody::Link {
                url: body.trim().to_string(),
            },
        });
    }

    let front = front.unwrap_or_default();
    let (title, markdown) = match front.title {
        Some(title) => (title, body.to_string()),
        None => match take_heading(body) {
            (Some(heading), rest) => (heading, rest),
            (None, rest) => (id.display_title.clone(), rest),
        },
    };

    Ok(Page {
        title,
        link_title,
        slug: id.slug,
        in_nav: id.in_nav,
        sort_key: id.sort_key,
        source: relative(root, path),
        meta: front.meta,
        body: PageBody::Markdown {
            intro: front.intro,
            markdown: markdown.trim().to_string(),
        },
    })
}

// ============================================================================
// Structured (.toml) pages
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectsFile {
    title: Option<String>,
    nav_title: Option<String>,
    intro: Option<String>,
    #[serde(default)]
    meta: PageMeta,
    #[serde(default)]
    projects: Vec<Project>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UsesFile {
    title: Option<String>,
    nav_title: Option<String>,
    intro: Option<String>,
    #[serde(default)]
    meta: PageMeta,
    #[serde(default)]
    sections: Vec<ToolSection>,
}

fn parse_toml_page(root: &Path, path: &Path, stem: &str) -> Result<Page, ScanError> {
    let id = identify(stem);
    let content = fs::read_to_string(path)?;
    let toml_err = |source| ScanError::PageToml {
        path: path.to_path_buf(),
        source,
    };

    let mut table: toml::Table = toml::from_str(&content).map_err(toml_err)?;
    let kind = match table.remove("kind") {
        Some(toml::Value::String(kind)) => kind,
        other => {
            return Err(ScanError::UnknownPageKind {
                kind: other.map(|v| v.to_string()).unwrap_or_default(),
                path: path.to_path_buf(),
            });
        }
    };

    let (title, nav_title, meta, body) = match kind.as_str() {
        "projects" => {
            let file: ProjectsFile = toml::Value::Table(table).try_into().map_err(toml_err)?;
            let body = PageBody::Projects {
                intro: file.intro,
                projects: file.projects,
            };
            (file.title, file.nav_title, file.meta, body)
        }
        "uses" => {
            let file: UsesFile = toml::Value::Table(table).try_into().map_err(toml_err)?;
            let body = PageBody::Uses {
                intro: file.intro,
                sections: file.sections,
            };
            (file.title, file.nav_title, file.meta, body)
        }
        _ => {
            return Err(ScanError::UnknownPageKind {
                kind,
                path: path.to_path_buf(),
            });
        }
    };

    Ok(Page {
        title: title.unwrap_or_else(|| id.display_title.clone()),
        link_title: nav_title.unwrap_or_else(|| id.display_title.clone()),
        slug: id.slug,
        in_nav: id.in_nav,
        sort_key: id.sort_key,
        source: relative(root, path),
        meta,
        body,
    })
}

// ============================================================================
// Photo galleries
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PhotoPageFile {
    title: Option<String>,
    nav_title: Option<String>,
    intro: Option<String>,
    meta: PageMeta,
}

fn is_image(path: &Path) -> bool {
    path.is_file() && IMAGE_EXTENSIONS.contains(&extension_lower(path).as_str())
}

fn parse_photo_page(root: &Path, dir: &Path) -> Result<Page, ScanError> {
    let dir_name = dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let id = identify(&dir_name);

    let page_file = dir.join(PHOTO_PAGE_FILE);
    let settings: PhotoPageFile = if page_file.is_file() {
        toml::from_str(&fs::read_to_string(&page_file)?).map_err(|source| {
            ScanError::PageToml {
                path: page_file.clone(),
                source,
            }
        })?
    } else {
        PhotoPageFile::default()
    };
    let title = settings
        .title
        .unwrap_or_else(|| id.display_title.clone());

    // Unnumbered images sort after numbered ones, in filename order.
    let mut numbered: BTreeMap<u32, PathBuf> = BTreeMap::new();
    let mut unnumbered: Vec<PathBuf> = Vec::new();
    for image_path in collect_entries(dir)?.into_iter().filter(|p| is_image(p)) {
        let stem = image_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        match parse_entry_name(&stem).number {
            Some(num) => {
                if numbered.insert(num, image_path).is_some() {
                    return Err(ScanError::DuplicatePhotoNumber(num, dir.to_path_buf()));
                }
            }
            None => unnumbered.push(image_path),
        }
    }

    if numbered.is_empty() && unnumbered.is_empty() {
        return Err(ScanError::EmptyPhotoDirectory(dir.to_path_buf()));
    }

    let ordered = numbered
        .into_iter()
        .map(|(num, path)| (Some(num), path))
        .chain(unnumbered.into_iter().map(|path| (None, path)));

    let mut photos = Vec::new();
    for (position, (number, path)) in ordered.enumerate() {
        let (width, height) =
            image::image_dimensions(&path).map_err(|source| ScanError::ImageDimensions {
                path: path.clone(),
                source,
            })?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let parsed = parse_entry_name(&stem);
        let alt = if parsed.display_title.is_empty() {
            format!("{title} {}", position + 1)
        } else {
            parsed.display_title
        };
        photos.push(Photo {
            number,
            source_path: relative(root, &path),
            filename,
            alt,
            width,
            height,
        });
    }

    Ok(Page {
        link_title: settings
            .nav_title
            .unwrap_or_else(|| id.display_title.clone()),
        title,
        slug: id.slug,
        in_nav: id.in_nav,
        sort_key: id.sort_key,
        source: format!("{}/", relative(root, dir)),
        meta: settings.meta,
        body: PageBody::Photos {
            intro: settings.intro,
            photos,
        },
    })
}

// ============================================================================
// Whole-site checks
// ============================================================================

fn default_home(config: &SiteConfig) -> Page {
    Page {
        title: config.site.name.clone(),
        link_title: "Home".to_string(),
        slug: String::new(),
        in_nav: false,
        sort_key: 0,
        source: String::new(),
        meta: PageMeta::default(),
        body: PageBody::Markdown {
            intro: None,
            markdown: String::new(),
        },
    }
}

/// Files the generate stage writes itself, relative to the output root.
/// The hashed stylesheet is left out since its name depends on the CSS.
fn generated_files(pages: &[Page], config: &SiteConfig) -> HashSet<String> {
    let mut files: HashSet<String> = ["404.html", "sitemap.xml"]
        .into_iter()
        .map(String::from)
        .collect();
    if !config.redirects.is_empty() || !config.rewrites.is_empty() {
        files.insert("_redirects".to_string());
    }
    for page in pages.iter().filter(|p| !p.is_link()) {
        files.insert(page.output_file());
        if let PageBody::Photos { photos, .. } = &page.body {
            files.extend(photos.iter().map(|photo| page.output_path(&photo.filename)));
        }
    }
    files
}

/// Assets are copied to the output root, so none may share a path with a
/// generated file.
fn check_asset_conflicts(
    assets: &Path,
    pages: &[Page],
    config: &SiteConfig,
) -> Result<(), ScanError> {
    let generated = generated_files(pages, config);
    for entry in WalkDir::new(assets).min_depth(1) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(assets) else {
            continue;
        };
        let rel = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if generated.contains(&rel) {
            return Err(ScanError::AssetConflict(format!("{ASSETS_DIR}/{rel}")));
        }
    }
    Ok(())
}

fn check_unique_slugs(pages: &[Page]) -> Result<(), ScanError> {
    let mut seen: HashSet<&str> = HashSet::new();
    for page in pages {
        if !seen.insert(page.slug.as_str()) {
            let first = pages
                .iter()
                .find(|p| p.slug == page.slug)
                .map(|p| p.source.clone())
                .unwrap_or_default();
            return Err(ScanError::DuplicateSlug {
                slug: page.slug.clone(),
                first,
                second: page.source.clone(),
            });
        }
    }
    Ok(())
}
