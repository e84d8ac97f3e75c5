//! CLI output formatting for the build stages.
//!
//! Output is information-first: every page is shown by positional index and
//! title, with its route, source file and mounted components as indented
//! context lines.
//!
//! ## Scan
//!
//! ```text
//! Pages
//! 001 拼好具 → /
//!     Source: index.md
//! 002 UUID随机生成器 → /uuid
//!     Source: uuid.md
//!     Components: UUIDGenerator, ArticleMetadata
//!
//! Config
//!     3 nav entries, 4 sidebar groups
//!     public/
//! ```
//!
//! ## Generate
//!
//! ```text
//! 001 拼好具 → index.html
//!     home animation
//! 002 二维码生成器 → qrcode.html
//!     unresolved: QRcode
//!
//! Generated 2 pages, 1 unresolved component
//! ```
//!
//! Each `format_*` function is pure and returns lines for testability; the
//! `print_*` wrappers write them to stdout.

use crate::generate::GenerateReport;
use crate::registry::ComponentRegistry;
use crate::scan::{Manifest, PUBLIC_DIR};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `n` followed by the singular or plural form of a noun.
fn count(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

pub fn format_scan_output(manifest: &Manifest) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    for (i, page) in manifest.pages.iter().enumerate() {
        lines.push(format!("{} {} → {}", format_index(i + 1), page.title, page.route));
        lines.push(format!("{}Source: {}", indent(1), page.source));
        if !page.components.is_empty() {
            lines.push(format!(
                "{}Components: {}",
                indent(1),
                page.components.join(", ")
            ));
        }
    }

    let config = &manifest.config;
    let groups: usize = config.sidebar.values().map(Vec::len).sum();
    lines.push(String::new());
    lines.push("Config".to_string());
    lines.push(format!(
        "{}{}, {}",
        indent(1),
        count(config.nav.len(), "nav entry", "nav entries"),
        count(groups, "sidebar group", "sidebar groups")
    ));
    if manifest.has_public {
        lines.push(format!("{}{}/", indent(1), PUBLIC_DIR));
    }
    lines
}

pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, page) in report.pages.iter().enumerate() {
        lines.push(format!("{} {} → {}", format_index(i + 1), page.title, page.output));
        if page.animated {
            lines.push(format!("{}home animation", indent(1)));
        }
        for name in &page.unresolved {
            lines.push(format!("{}unresolved: {}", indent(1), name));
        }
    }
    if report.search_index {
        lines.push("search-index.json".to_string());
    }
    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}",
        count(report.pages.len(), "page", "pages"),
        count(
            report.unresolved_count(),
            "unresolved component",
            "unresolved components"
        )
    ));
    lines
}

/// Component references that the registry cannot satisfy, one line each.
pub fn format_check_output(manifest: &Manifest, registry: &ComponentRegistry) -> Vec<String> {
    let mut lines = Vec::new();
    let mut missing = 0;
    for page in &manifest.pages {
        for name in page.components.iter().filter(|n| !registry.contains(n)) {
            lines.push(format!("{} ({}): unresolved: {}", page.route, page.source, name));
            missing += 1;
        }
    }
    if missing == 0 {
        lines.push("==> Content is valid".to_string());
    } else {
        lines.push(format!(
            "==> {}",
            count(
                missing,
                "unresolved component reference",
                "unresolved component references"
            )
        ));
    }
    lines
}

pub fn format_components(registry: &ComponentRegistry) -> Vec<String> {
    registry
        .names()
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{} <{} />", format_index(i + 1), name))
        .collect()
}

pub fn print_scan_output(manifest: &Manifest) {
    for line in format_scan_output(manifest) {
        println!("{}", line);
    }
}

pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

pub fn print_check_output(manifest: &Manifest, registry: &ComponentRegistry) {
    for line in format_check_output(manifest, registry) {
        println!("{}", line);
    }
}

pub fn print_components(registry: &ComponentRegistry) {
    for line in format_components(registry) {
        println!("{}", line);
    }
}
