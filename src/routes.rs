//! Redirects and rewrites.
//!
//! The generated site is static, so redirects and rewrites cannot run inside
//! it. They are declared in `config.toml`, validated at scan time, and
//! emitted as a `_redirects` file that static hosts (Netlify, Cloudflare
//! Pages) understand. The same table is evaluated locally by the `route`
//! command so you can see what a path will do before deploying.
//!
//! ## Pattern Syntax
//!
//! ```text
//! /sb.js              literal path
//! /sb-api/:slug       `:slug` binds exactly one non-empty segment
//! /blog/:path*        `:path*` binds the rest of the path (zero or more segments)
//! ```
//!
//! A catch-all is only allowed as the last segment. Destinations may be local
//! paths or absolute URLs and can only reference parameters the source binds:
//!
//! ```toml
//! [[redirects]]
//! source = "/blog/:path*"
//! destination = "/articles/:path*"
//! permanent = true
//!
//! [[rewrites]]
//! source = "/frogalytics/:path*"
//! destination = "https://www.frogalytics.com/:path*"
//! ```
//!
//! Within each list the first match in declaration order wins. A request is
//! resolved as: redirects, then generated pages, then rewrites. Redirects are
//! written with a `!` status suffix so the host applies them even when a file
//! exists at that path; rewrites only apply when nothing else answers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RouteError {
    #[error("route pattern must start with '/': {0}")]
    MissingLeadingSlash(String),
    #[error("empty parameter name in pattern: {0}")]
    EmptyParam(String),
    #[error("catch-all parameter must be the last segment: {0}")]
    CatchAllNotLast(String),
    #[error("destination {destination} uses :{param}, which {pattern} does not bind")]
    UnboundParam {
        pattern: String,
        destination: String,
        param: String,
    },
}

/// A `[[redirects]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Redirect {
    pub source: String,
    pub destination: String,
    #[serde(default)]
    pub permanent: bool,
}

/// A `[[rewrites]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rewrite {
    pub source: String,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Param(String),
    CatchAll(String),
}

/// Parameter bindings produced by a successful match.
pub type Params = BTreeMap<String, String>;

/// A parsed source pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        let Some(rest) = raw.strip_prefix('/') else {
            return Err(RouteError::MissingLeadingSlash(raw.to_string()));
        };

        let parts: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };

        let mut segments = Vec::with_capacity(parts.len());
        for (idx, part) in parts.iter().enumerate() {
            let segment = match part.strip_prefix(':') {
                Some(name) => match name.strip_suffix('*') {
                    Some(name) => {
                        if idx + 1 != parts.len() {
                            return Err(RouteError::CatchAllNotLast(raw.to_string()));
                        }
                        Segment::CatchAll(param_name(name, raw)?)
                    }
                    None => Segment::Param(param_name(name, raw)?),
                },
                None => Segment::Literal(part.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn binds(&self, name: &str) -> bool {
        self.segments.iter().any(|s| match s {
            Segment::Param(n) | Segment::CatchAll(n) => n == name,
            Segment::Literal(_) => false,
        })
    }

    /// Match a request path, returning the bound parameters on success.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let rest = path.strip_prefix('/')?;
        let parts: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };

        let mut params = Params::new();
        for (idx, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(lit) => {
                    if parts.get(idx) != Some(&lit.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(idx).filter(|v| !v.is_empty())?;
                    params.insert(name.clone(), value.to_string());
                }
                Segment::CatchAll(name) => {
                    let tail = parts.get(idx..).unwrap_or_default().join("/");
                    params.insert(name.clone(), tail);
                    return Some(params);
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }

    /// Netlify `_redirects` form: `:name*` becomes `*`.
    fn to_host_pattern(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            match segment {
                Segment::Literal(lit) => out.push_str(lit),
                Segment::Param(name) => {
                    out.push(':');
                    out.push_str(name);
                }
                Segment::CatchAll(_) => out.push('*'),
            }
        }
        if out.is_empty() {
            out.push('/');
        }
        out
    }

    fn catch_all_name(&self) -> Option<&str> {
        self.segments.iter().find_map(|s| match s {
            Segment::CatchAll(n) => Some(n.as_str()),
            _ => None,
        })
    }
}

fn param_name(name: &str, raw: &str) -> Result<String, RouteError> {
    if name.is_empty() {
        return Err(RouteError::EmptyParam(raw.to_string()));
    }
    Ok(name.to_string())
}

/// A piece of a destination string.
#[derive(Debug, PartialEq)]
enum DestPart<'a> {
    Text(&'a str),
    Param { name: &'a str, catch_all: bool },
}

/// Split a destination into literal text and `:name` / `:name*` references.
///
/// A `:` only starts a reference when followed by an ASCII letter or `_`, so
/// `https://` and `host:8080` stay literal.
fn parse_destination(dest: &str) -> Vec<DestPart<'_>> {
    let bytes = dest.as_bytes();
    let mut parts = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let starts_ref = bytes[i] == b':'
            && bytes
                .get(i + 1)
                .is_some_and(|b| b.is_ascii_alphabetic() || *b == b'_');
        if !starts_ref {
            i += 1;
            continue;
        }

        if text_start < i {
            parts.push(DestPart::Text(&dest[text_start..i]));
        }
        let name_start = i + 1;
        let mut end = name_start;
        while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
            end += 1;
        }
        let catch_all = bytes.get(end) == Some(&b'*');
        parts.push(DestPart::Param {
            name: &dest[name_start..end],
            catch_all,
        });
        i = if catch_all { end + 1 } else { end };
        text_start = i;
    }

    if text_start < bytes.len() {
        parts.push(DestPart::Text(&dest[text_start..]));
    }
    parts
}

/// Fill `:name` references in `destination` from `params`.
///
/// An empty catch-all swallows the slash in front of it, so `/blog` against
/// `/blog/:path*` → `/articles/:path*` yields `/articles`.
pub fn substitute(destination: &str, params: &Params) -> String {
    let mut out = String::with_capacity(destination.len());
    for part in parse_destination(destination) {
        match part {
            DestPart::Text(t) => out.push_str(t),
            DestPart::Param { name, catch_all } => {
                let value = params.get(name).map(String::as_str).unwrap_or_default();
                if catch_all && value.is_empty() && out.ends_with('/') && out.len() > 1 {
                    out.pop();
                }
                out.push_str(value);
            }
        }
    }
    out
}

/// What the route table does with a path.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Redirect { destination: String, permanent: bool },
    Rewrite { destination: String },
}

#[derive(Debug, Clone)]
struct CompiledRoute {
    pattern: RoutePattern,
    destination: String,
}

/// Validated redirects and rewrites, ready to match or emit.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    redirects: Vec<(CompiledRoute, bool)>,
    rewrites: Vec<CompiledRoute>,
}

fn compile(source: &str, destination: &str) -> Result<CompiledRoute, RouteError> {
    let pattern = RoutePattern::parse(source)?;
    for part in parse_destination(destination) {
        if let DestPart::Param { name, .. } = part
            && !pattern.binds(name)
        {
            return Err(RouteError::UnboundParam {
                pattern: source.to_string(),
                destination: destination.to_string(),
                param: name.to_string(),
            });
        }
    }
    Ok(CompiledRoute {
        pattern,
        destination: destination.to_string(),
    })
}

impl RouteTable {
    pub fn new(redirects: &[Redirect], rewrites: &[Rewrite]) -> Result<Self, RouteError> {
        let redirects = redirects
            .iter()
            .map(|r| Ok((compile(&r.source, &r.destination)?, r.permanent)))
            .collect::<Result<Vec<_>, RouteError>>()?;
        let rewrites = rewrites
            .iter()
            .map(|r| compile(&r.source, &r.destination))
            .collect::<Result<Vec<_>, RouteError>>()?;
        Ok(Self {
            redirects,
            rewrites,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.redirects.is_empty() && self.rewrites.is_empty()
    }

    /// Match `path` against redirects, then rewrites.
    pub fn resolve(&self, path: &str) -> Option<Resolution> {
        self.resolve_redirect(path)
            .or_else(|| self.resolve_rewrite(path))
    }

    fn resolve_redirect(&self, path: &str) -> Option<Resolution> {
        self.redirects.iter().find_map(|(route, permanent)| {
            route.pattern.matches(path).map(|params| Resolution::Redirect {
                destination: substitute(&route.destination, &params),
                permanent: *permanent,
            })
        })
    }

    fn resolve_rewrite(&self, path: &str) -> Option<Resolution> {
        self.rewrites.iter().find_map(|route| {
            route.pattern.matches(path).map(|params| Resolution::Rewrite {
                destination: substitute(&route.destination, &params),
            })
        })
    }
}

/// Where a request path ends up once the site is deployed.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Route(Resolution),
    Page,
    NotFound,
}

/// Resolve `path` against the route table and the set of generated page
/// paths: redirects first, then pages, then rewrites.
///
/// A trailing slash is ignored when matching pages, so `/about/` finds the
/// page served at `/about`.
pub fn lookup<'a>(
    table: &RouteTable,
    page_paths: impl IntoIterator<Item = &'a str>,
    path: &str,
) -> Lookup {
    if let Some(redirect) = table.resolve_redirect(path) {
        return Lookup::Route(redirect);
    }
    let normalized = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };
    if page_paths.into_iter().any(|p| p == normalized) {
        return Lookup::Page;
    }
    match table.resolve_rewrite(path) {
        Some(rewrite) => Lookup::Route(rewrite),
        None => Lookup::NotFound,
    }
}

/// Rewrite a destination for the `_redirects` file: the source's catch-all
/// becomes `:splat`.
fn host_destination(route: &CompiledRoute) -> String {
    let catch_all = route.pattern.catch_all_name();
    parse_destination(&route.destination)
        .into_iter()
        .map(|part| match part {
            DestPart::Text(t) => t.to_string(),
            DestPart::Param { name, .. } if Some(name) == catch_all => ":splat".to_string(),
            DestPart::Param { name, .. } => format!(":{name}"),
        })
        .collect()
}

/// Render the table as a Netlify-style `_redirects` file.
pub fn render_redirects_file(table: &RouteTable) -> String {
    let mut out = String::from("# Generated by folio. Edit [[redirects]] / [[rewrites]] in config.toml.\n");
    for (route, permanent) in &table.redirects {
        let status = if *permanent { "308!" } else { "307!" };
        out.push_str(&format!(
            "{}  {}  {}\n",
            route.pattern.to_host_pattern(),
            host_destination(route),
            status
        ));
    }
    for route in &table.rewrites {
        out.push_str(&format!(
            "{}  {}  200\n",
            route.pattern.to_host_pattern(),
            host_destination(route)
        ));
    }
    out
}
