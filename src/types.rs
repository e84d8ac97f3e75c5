//! Shared types passed from the scan stage to the generate stage.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A content page generated from a markdown file.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// Route the page is served at (`/`, `/uuid`, `/guide/`).
    pub route: String,
    /// Source path relative to the content root, `/`-separated (`uuid.md`).
    pub source: String,
    /// Title from the first `# heading`, or the file stem as fallback.
    pub title: String,
    /// Raw markdown content.
    pub body: String,
    /// Component tags referenced by the body, in first-use order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<String>,
    /// Modification time of the source file, when the filesystem reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

impl Page {
    /// Output path relative to the output directory.
    ///
    /// `/` → `index.html`, `/uuid` → `uuid.html`, `/guide/` → `guide/index.html`.
    pub fn output_path(&self) -> String {
        let trimmed = self.route.trim_start_matches('/');
        if trimmed.is_empty() || trimmed.ends_with('/') {
            format!("{trimmed}index.html")
        } else {
            format!("{trimmed}.html")
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_helpers::page;

    #[test]
    fn output_path_uses_html_files_and_directory_indexes() {
        assert_eq!(page("/", "").output_path(), "index.html");
        assert_eq!(page("/uuid", "").output_path(), "uuid.html");
        assert_eq!(page("/guide/", "").output_path(), "guide/index.html");
        assert_eq!(page("/guide/start", "").output_path(), "guide/start.html");
    }
}
