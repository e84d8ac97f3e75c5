//! HTML site generation.
//!
//! Second stage of the build. Takes the scan [`Manifest`] and a populated
//! [`ComponentRegistry`] and writes the final static site.
//!
//! ## Page Shell
//!
//! Every page shares the same chrome, driven entirely by [`SiteConfig`]:
//!
//! - **Top bar**: logo and title, search box, nav entries in config order,
//!   social links and the appearance toggle
//! - **Sidebar**: the groups whose route prefix best matches the page
//! - **Article**: the rendered markdown with component tags mounted
//! - **Footer**: edit link and previous/next links following sidebar order
//!
//! Pages are visited in route order and each visit is reported to the
//! [`LayoutComposer`], so the home animation style ends up in the head of the
//! root page only.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html               # /
//! ├── uuid.html                # /uuid (served as /uuid with clean URLs)
//! ├── guide/
//! │   └── index.html           # /guide/
//! ├── search-index.json        # When search.provider = "local"
//! ├── favicon.ico              # Copied from public/
//! └── logo.png
//! ```
//!
//! HTML is produced with [maud](https://maud.lambda.xyz/), so every value
//! taken from config or content is escaped unless it is explicitly rendered
//! as pre-escaped markup (the article body, widget scripts, inline SVG icons).

use crate::config::{self, SearchProvider, SidebarItem, SiteConfig, is_external};
use crate::layout::{HeadStyles, LayoutComposer, LayoutState};
use crate::markdown;
use crate::registry::{ComponentRegistry, RenderContext};
use crate::scan::{Manifest, PUBLIC_DIR, normalize_link};
use crate::types::Page;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const SITE_JS: &str = include_str!("../static/site.js");

/// Longest search snippet stored per page, in characters.
const SEARCH_TEXT_LIMIT: usize = 500;

/// What was written for one page.
#[derive(Debug, Clone)]
pub struct GeneratedPage {
    pub route: String,
    pub title: String,
    /// Output path relative to the output directory.
    pub output: String,
    /// Component tags with no registration, rendered as diagnostics.
    pub unresolved: Vec<String>,
    /// Whether the home animation was attached while rendering.
    pub animated: bool,
}

#[derive(Debug, Default)]
pub struct GenerateReport {
    pub pages: Vec<GeneratedPage>,
    pub search_index: bool,
    pub public_copied: bool,
}

impl GenerateReport {
    pub fn unresolved_count(&self) -> usize {
        self.pages.iter().map(|p| p.unresolved.len()).sum()
    }
}

#[derive(Debug, Serialize)]
pub struct SearchEntry {
    pub href: String,
    pub title: String,
    pub text: String,
}

pub fn generate(
    manifest: &Manifest,
    registry: &ComponentRegistry,
    source_root: &Path,
    output_dir: &Path,
) -> Result<GenerateReport, GenerateError> {
    let config = &manifest.config;
    let color_css = config::generate_color_css(&config.colors, config.appearance);
    let css = format!("{}\n\n{}", color_css, CSS_STATIC);

    fs::create_dir_all(output_dir)?;
    let mut report = GenerateReport::default();

    if manifest.has_public {
        copy_dir_recursive(&source_root.join(PUBLIC_DIR), output_dir)?;
        report.public_copied = true;
    }

    let mut composer = LayoutComposer::new(config);
    let mut head_styles = HeadStyles::new();

    for page in &manifest.pages {
        let state = composer.on_route_change(&page.route, &mut head_styles);
        let rendered = render_page(config, page, registry, &head_styles, &css);

        let output = page.output_path();
        let target = output_dir.join(&output);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, rendered.markup.into_string())?;
        tracing::debug!(route = %page.route, output = %output, "wrote page");

        report.pages.push(GeneratedPage {
            route: page.route.clone(),
            title: page.title.clone(),
            output,
            unresolved: rendered.unresolved,
            animated: state == LayoutState::AnimatedHome,
        });
    }

    if config.search.provider == SearchProvider::Local {
        let index = search_index(config, &manifest.pages);
        let json = serde_json::to_string(&index)?;
        fs::write(output_dir.join("search-index.json"), json)?;
        report.search_index = true;
    }

    Ok(report)
}

/// Copy the contents of `src` into `dst`, creating subdirectories as needed.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// One entry per page: resolved link, title and a plain-text snippet.
pub fn search_index(config: &SiteConfig, pages: &[Page]) -> Vec<SearchEntry> {
    pages
        .iter()
        .map(|page| SearchEntry {
            href: config.resolve_link(&page.route),
            title: page.title.clone(),
            text: markdown::plain_text(&page.body)
                .chars()
                .take(SEARCH_TEXT_LIMIT)
                .collect(),
        })
        .collect()
}

// ============================================================================
// Page rendering
// ============================================================================

pub struct RenderedPage {
    pub markup: Markup,
    pub unresolved: Vec<String>,
}

/// Render one page with its components mounted from `registry`.
pub fn render_page(
    config: &SiteConfig,
    page: &Page,
    registry: &ComponentRegistry,
    head_styles: &HeadStyles,
    css: &str,
) -> RenderedPage {
    let ctx = RenderContext { config, page };
    let mut unresolved: Vec<String> = Vec::new();
    let body_html = markdown::render_markdown(&page.body, config, &mut |name: &str| {
        if !registry.contains(name) && !unresolved.iter().any(|n| n == name) {
            unresolved.push(name.to_string());
        }
        registry.mount(name, &ctx).into_string()
    });

    let page_title = if page.title == config.title {
        config.title.clone()
    } else {
        format!("{} | {}", page.title, config.title)
    };

    let content = html! {
        (render_top_bar(config, &page.route))
        div.layout {
            (render_sidebar(config, &page.route))
            main.content {
                article {
                    (PreEscaped(body_html))
                }
                (render_page_meta(config, page))
                (render_doc_footer(config, &page.route))
            }
        }
    };

    let body_class = crate::layout::is_root(&page.route).then_some("home");
    let markup = base_document(config, &page_title, css, head_styles.render(), body_class, content);
    RenderedPage { markup, unresolved }
}

/// Edit link and last-updated timestamp under the article.
fn render_page_meta(config: &SiteConfig, page: &Page) -> Markup {
    let updated = page.updated.filter(|_| config.last_updated);
    html! {
        @if config.edit_link.is_some() || updated.is_some() {
            div.page-meta {
                @if let Some(edit) = &config.edit_link {
                    div.edit-link {
                        a href=(edit.url_for(&page.source)) target="_blank" rel="noopener" {
                            (edit.text)
                        }
                    }
                }
                @if let Some(ts) = updated {
                    p.last-updated {
                        (config.last_updated_text) ": "
                        time datetime=(ts.to_rfc3339()) {
                            (ts.format(&config.last_updated_format).to_string())
                        }
                    }
                }
            }
        }
    }
}

/// Renders the base HTML document structure
pub fn base_document(
    config: &SiteConfig,
    title: &str,
    css: &str,
    head_extra: Markup,
    body_class: Option<&str>,
    content: Markup,
) -> Markup {
    let appearance = match config.appearance {
        config::Appearance::Light => "light",
        config::Appearance::Dark => "dark",
        config::Appearance::Auto => "auto",
    };
    html! {
        (DOCTYPE)
        html lang=(config.lang) data-base=(config.base) data-appearance=(appearance) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                meta name="description" content=(config.description);
                @if let Some(favicon) = &config.favicon {
                    link rel="icon" href=(config.resolve_link(favicon));
                }
                style { (PreEscaped(css)) }
                (head_extra)
            }
            body class=[body_class] {
                (content)
                script { (PreEscaped(SITE_JS)) }
            }
        }
    }
}

/// Renders the top bar: title, search, nav entries, social links, toggle.
pub fn render_top_bar(config: &SiteConfig, current_route: &str) -> Markup {
    html! {
        header.top-bar {
            a.site-title href=(config.resolve_link("/")) {
                @if let Some(logo) = &config.logo {
                    img src=(config.resolve_link(logo)) alt="";
                }
                span { (config.title) }
            }
            @if config.search.provider == SearchProvider::Local {
                div.search {
                    input type="search" placeholder=(config.search.placeholder) aria-label=(config.search.placeholder);
                    ul.search-results {}
                }
            }
            nav.top-nav {
                @for entry in &config.nav {
                    @let external = is_external(&entry.link);
                    @let active = !external && normalize_link(&entry.link) == current_route;
                    a href=(config.resolve_link(&entry.link))
                        class=[active.then_some("active")]
                        target=[external.then_some("_blank")]
                        rel=[external.then_some("noopener")] {
                        (config.nav_label(entry))
                        @if external && !entry.no_icon { " ↗" }
                    }
                }
            }
            @if !config.social_links.is_empty() {
                div.social-links {
                    @for social in &config.social_links {
                        a href=(social.link) target="_blank" rel="noopener" aria-label=(social.icon) {
                            @if let Some(svg) = &social.svg {
                                (PreEscaped(svg))
                            } @else {
                                (social.icon)
                            }
                        }
                    }
                }
            }
            button.appearance-toggle type="button" { (config.dark_mode_switch_label) }
        }
    }
}

/// Renders the sidebar for `route`; empty when no prefix matches.
pub fn render_sidebar(config: &SiteConfig, route: &str) -> Markup {
    let groups = config.sidebar_for(route);
    html! {
        @if !groups.is_empty() {
            aside.sidebar {
                @for group in groups {
                    section.sidebar-group {
                        h2 { (group.text) }
                        ul {
                            @for item in &group.items {
                                @let active = normalize_link(&item.link) == route;
                                li class=[active.then_some("active")] {
                                    a href=(config.resolve_link(&item.link)) { (item.text) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Previous and next sidebar items around `route`, in sidebar order.
pub fn neighbours<'a>(
    config: &'a SiteConfig,
    route: &str,
) -> (Option<&'a SidebarItem>, Option<&'a SidebarItem>) {
    let items: Vec<&SidebarItem> = config
        .sidebar_for(route)
        .iter()
        .flat_map(|g| g.items.iter())
        .collect();
    match items.iter().position(|i| normalize_link(&i.link) == route) {
        Some(idx) => (
            idx.checked_sub(1).map(|p| items[p]),
            items.get(idx + 1).copied(),
        ),
        None => (None, None),
    }
}

fn render_doc_footer(config: &SiteConfig, route: &str) -> Markup {
    let (prev, next) = neighbours(config, route);
    html! {
        @if prev.is_some() || next.is_some() {
            nav.doc-footer {
                @if let Some(item) = prev {
                    a.prev href=(config.resolve_link(&item.link)) {
                        span { (config.doc_footer.prev) }
                        (item.text)
                    }
                }
                @if let Some(item) = next {
                    a.next href=(config.resolve_link(&item.link)) {
                        span { (config.doc_footer.next) }
                        (item.text)
                    }
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
