//! Content scanning.
//!
//! First stage of the build. Walks the content directory, loads the site
//! config and turns every markdown file into a [`Page`].
//!
//! ## Directory Structure
//!
//! ```text
//! docs/                        # Content root
//! ├── config.toml              # Site configuration (optional)
//! ├── index.md                 # Home page → /
//! ├── uuid.md                  # → /uuid
//! ├── CHANGELOG.md             # → /CHANGELOG
//! ├── guide/
//! │   ├── index.md             # → /guide/
//! │   └── start.md             # → /guide/start
//! └── public/                  # Copied verbatim to the output root
//!     ├── favicon.ico
//!     └── logo.png
//! ```
//!
//! Hidden files and directories (leading `.`) are skipped.
//!
//! ## Validation
//!
//! Besides config validation, every root-relative link in the nav and the
//! sidebar must point at a scanned page or a file under `public/`. A dangling
//! link aborts the build with [`ScanError::BrokenLink`] instead of shipping a
//! 404. Two source files mapping to one route (possible after lossy decoding
//! of non-UTF-8 names) abort with [`ScanError::DuplicateRoute`].

use crate::config::{self, SiteConfig};
use crate::markdown;
use crate::types::Page;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Directory copied verbatim into the output root.
pub const PUBLIC_DIR: &str = "public";

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Content directory not found: {0}")]
    MissingSource(PathBuf),
    #[error("Link {link:?} in nav/sidebar does not match any page or public file")]
    BrokenLink { link: String },
    #[error("Route {route} is produced by both {first} and {second}")]
    DuplicateRoute {
        route: String,
        first: String,
        second: String,
    },
}

/// Manifest output from the scan stage.
#[derive(Debug, Serialize)]
pub struct Manifest {
    pub pages: Vec<Page>,
    pub config: SiteConfig,
    /// Whether the content root has a `public/` directory.
    pub has_public: bool,
}

impl Manifest {
    pub fn page(&self, route: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.route == route)
    }
}

/// Route for a markdown file, given its `/`-separated path below the root.
///
/// `index.md` → `/`, `uuid.md` → `/uuid`, `guide/index.md` → `/guide/`.
pub fn route_for(relative: &str) -> String {
    let stem = relative.strip_suffix(".md").unwrap_or(relative);
    if stem == "index" {
        "/".to_string()
    } else if let Some(dir) = stem.strip_suffix("/index") {
        format!("/{dir}/")
    } else {
        format!("/{stem}")
    }
}

/// Reduce a config link to the route it targets.
pub fn normalize_link(link: &str) -> String {
    let path = link.split(['#', '?']).next().unwrap_or(link);
    let path = path
        .strip_suffix(".html")
        .or_else(|| path.strip_suffix(".md"))
        .unwrap_or(path);
    match path.strip_suffix("index") {
        Some(dir) if dir.ends_with('/') => dir.to_string(),
        _ => path.to_string(),
    }
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn is_public_dir(entry: &walkdir::DirEntry) -> bool {
    entry.depth() == 1 && entry.file_type().is_dir() && entry.file_name() == PUBLIC_DIR
}

pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::MissingSource(root.to_path_buf()));
    }
    let config = config::load_config(root)?;
    let pages = scan_pages(root)?;
    check_routes(&pages)?;
    check_links(&config, &pages, &root.join(PUBLIC_DIR))?;

    Ok(Manifest {
        pages,
        config,
        has_public: root.join(PUBLIC_DIR).is_dir(),
    })
}

fn scan_pages(root: &Path) -> Result<Vec<Page>, ScanError> {
    let mut pages = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e) && !is_public_dir(e));

    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "md") {
            continue;
        }
        let relative = path
            .strip_prefix(root)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let body = fs::read_to_string(path)?;
        let updated = entry
            .metadata()?
            .modified()
            .ok()
            .map(DateTime::<Utc>::from);
        let route = route_for(&relative);
        let fallback = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        pages.push(Page {
            title: markdown::extract_title(&body).unwrap_or(fallback),
            components: markdown::find_components(&body),
            route,
            source: relative,
            body,
            updated,
        });
    }

    pages.sort_by(|a, b| a.route.cmp(&b.route));
    Ok(pages)
}

/// Reject two pages sharing a route. `pages` must be sorted by route.
fn check_routes(pages: &[Page]) -> Result<(), ScanError> {
    match pages.windows(2).find(|w| w[0].route == w[1].route) {
        Some(pair) => Err(ScanError::DuplicateRoute {
            route: pair[0].route.clone(),
            first: pair[0].source.clone(),
            second: pair[1].source.clone(),
        }),
        None => Ok(()),
    }
}

fn check_links(config: &SiteConfig, pages: &[Page], public: &Path) -> Result<(), ScanError> {
    let routes: BTreeSet<&str> = pages.iter().map(|p| p.route.as_str()).collect();
    for link in config.internal_links() {
        if routes.contains(normalize_link(link).as_str()) || is_public_file(public, link) {
            continue;
        }
        return Err(ScanError::BrokenLink {
            link: link.to_string(),
        });
    }
    Ok(())
}

/// Whether `link` names a file copied from `public/`.
fn is_public_file(public: &Path, link: &str) -> bool {
    let path = link.split(['#', '?']).next().unwrap_or(link);
    let relative = path.trim_start_matches('/');
    !relative.is_empty()
        && !relative.split('/').any(|seg| seg == "..")
        && public.join(relative).is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn route_for_maps_index_files() {
        assert_eq!(route_for("index.md"), "/");
        assert_eq!(route_for("uuid.md"), "/uuid");
        assert_eq!(route_for("guide/index.md"), "/guide/");
        assert_eq!(route_for("guide/start.md"), "/guide/start");
    }

    #[test]
    fn normalize_link_strips_suffixes_and_fragments() {
        assert_eq!(normalize_link("/uuid"), "/uuid");
        assert_eq!(normalize_link("/uuid.html#usage"), "/uuid");
        assert_eq!(normalize_link("/uuid.md"), "/uuid");
        assert_eq!(normalize_link("/guide/index"), "/guide/");
        assert_eq!(normalize_link("/"), "/");
        assert_eq!(normalize_link("/reindex"), "/reindex");
    }

    #[test]
    fn scan_fixture_site() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();
        assert!(routes(&manifest).contains(&"/"));
        assert!(routes(&manifest).contains(&"/uuid"));
        assert!(manifest.has_public);
        assert_eq!(manifest.config.title, "拼好具");
    }

    #[test]
    fn scan_extracts_title_and_components() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();
        let uuid = find_page(&manifest, "/uuid");
        assert_eq!(uuid.title, "UUID随机生成器");
        assert_eq!(uuid.source, "uuid.md");
        assert_eq!(uuid.components, vec!["UUIDGenerator", "ArticleMetadata"]);
    }

    #[test]
    fn scan_skips_public_and_hidden() {
        let tmp = setup_fixtures();
        fs::write(tmp.path().join("public/notes.md"), "# not a page").unwrap();
        fs::create_dir_all(tmp.path().join(".drafts")).unwrap();
        fs::write(tmp.path().join(".drafts/wip.md"), "# wip").unwrap();

        let manifest = scan(tmp.path()).unwrap();
        assert!(manifest.page("/public/notes").is_none());
        assert!(manifest.page("/.drafts/wip").is_none());
    }

    #[test]
    fn pages_sorted_by_route() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();
        let all = routes(&manifest);
        let mut sorted = all.clone();
        sorted.sort();
        assert_eq!(all, sorted);
    }

    #[test]
    fn title_falls_back_to_file_stem() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("notes.md"), "no heading here").unwrap();
        let manifest = scan(tmp.path()).unwrap();
        assert_eq!(manifest.pages[0].title, "notes");
    }

    #[test]
    fn broken_sidebar_link_is_rejected() {
        let tmp = setup_fixtures();
        fs::remove_file(tmp.path().join("qrcode.md")).unwrap();
        let err = scan(tmp.path()).unwrap_err();
        assert!(matches!(err, ScanError::BrokenLink { ref link } if link == "/qrcode"));
    }

    #[test]
    fn nav_link_to_public_file_is_accepted() {
        let tmp = setup_fixtures();
        let config = fs::read_to_string(tmp.path().join("config.toml"))
            .unwrap()
            .replace("link = \"/CHANGELOG\"", "link = \"/logo.svg\"");
        fs::write(tmp.path().join("config.toml"), config).unwrap();
        assert!(scan(tmp.path()).is_ok());
    }

    #[test]
    fn nav_link_to_missing_file_is_rejected() {
        let tmp = setup_fixtures();
        let config = fs::read_to_string(tmp.path().join("config.toml"))
            .unwrap()
            .replace("link = \"/CHANGELOG\"", "link = \"/missing.svg\"");
        fs::write(tmp.path().join("config.toml"), config).unwrap();
        let err = scan(tmp.path()).unwrap_err();
        assert!(matches!(err, ScanError::BrokenLink { ref link } if link == "/missing.svg"));
    }

    #[test]
    fn public_file_lookup_stays_inside_public() {
        let tmp = setup_fixtures();
        let public = tmp.path().join(PUBLIC_DIR);
        assert!(is_public_file(&public, "/logo.svg#top"));
        assert!(!is_public_file(&public, "/../config.toml"));
        assert!(!is_public_file(&public, "/"));
    }

    #[test]
    fn duplicate_routes_are_rejected() {
        let mut first = page("/uuid", "# A");
        first.source = "uuid.md".into();
        let mut second = page("/uuid", "# B");
        second.source = "uu\u{FFFD}id.md".into();
        let err = check_routes(&[first, second]).unwrap_err();
        assert!(matches!(
            err,
            ScanError::DuplicateRoute { ref route, ref first, .. } if route == "/uuid" && first == "uuid.md"
        ));
        assert!(check_routes(&[page("/", "# 首页"), page("/uuid", "# UUID")]).is_ok());
    }

    #[test]
    fn scan_records_modification_time() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();
        assert!(manifest.pages.iter().all(|p| p.updated.is_some()));
    }

    #[test]
    fn invalid_config_aborts_scan() {
        let tmp = setup_fixtures();
        fs::write(tmp.path().join("config.toml"), "title = \"\"").unwrap();
        assert!(matches!(scan(tmp.path()), Err(ScanError::Config(_))));
    }

    #[test]
    fn missing_source_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = scan(&tmp.path().join("nope")).unwrap_err();
        assert!(matches!(err, ScanError::MissingSource(_)));
    }
}
