//! Shared test utilities for the pinhaoju test suite.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let manifest = scan(tmp.path()).unwrap();
//! let uuid = find_page(&manifest, "/uuid");
//! assert_eq!(uuid.components, vec!["UUIDGenerator", "ArticleMetadata"]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::generate::copy_dir_recursive;
use crate::scan::Manifest;
use crate::types::Page;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/docs/` to a temp directory and return it.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/docs");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

/// Build a page in memory; the source path is derived from the route.
pub fn page(route: &str, body: &str) -> Page {
    let trimmed = route.trim_start_matches('/');
    let source = if trimmed.is_empty() || trimmed.ends_with('/') {
        format!("{trimmed}index.md")
    } else {
        format!("{trimmed}.md")
    };
    Page {
        route: route.to_string(),
        source,
        title: crate::markdown::extract_title(body).unwrap_or_else(|| trimmed.to_string()),
        body: body.to_string(),
        components: crate::markdown::find_components(body),
        updated: None,
    }
}

// =========================================================================
// Manifest lookups: panic with a clear message on miss
// =========================================================================

/// Find a page by route. Panics if not found.
pub fn find_page<'a>(manifest: &'a Manifest, route: &str) -> &'a Page {
    manifest
        .pages
        .iter()
        .find(|p| p.route == route)
        .unwrap_or_else(|| {
            let routes: Vec<&str> = manifest.pages.iter().map(|p| p.route.as_str()).collect();
            panic!("page '{route}' not found. Available: {routes:?}")
        })
}

/// All routes in manifest order.
pub fn routes(manifest: &Manifest) -> Vec<&str> {
    manifest.pages.iter().map(|p| p.route.as_str()).collect()
}
