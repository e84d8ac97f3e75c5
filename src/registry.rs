//! Name-keyed registry of renderable components.
//!
//! Content pages mount a tool by writing its tag, e.g. `<UUIDGenerator />`.
//! The generator looks the tag name up here and splices the component's
//! markup into the page. The registry is an explicit value built once during
//! bootstrap (see [`crate::widgets::register_builtin`]) and passed to the
//! generator; there is no global state and no removal path.
//!
//! Registering a name twice is an authoring mistake and fails with
//! [`RegistryError::DuplicateRegistration`] instead of silently replacing the
//! first factory. A tag with no registration renders a visible
//! `unresolved: <Name>` marker so the gap shows up on the page.

use crate::config::SiteConfig;
use crate::types::Page;
use maud::{Markup, html};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("component {0:?} is already registered")]
    DuplicateRegistration(String),
    #[error("unresolved component reference: {0}")]
    UnresolvedComponentReference(String),
    #[error("invalid component name {0:?}: tags start with an ASCII capital, contain only letters and digits, and are not HTML element names")]
    InvalidName(String),
}

/// Everything a component may read while rendering into a page.
pub struct RenderContext<'a> {
    pub config: &'a SiteConfig,
    pub page: &'a Page,
}

/// A renderable unit mounted by tag name.
pub trait Component: Send + Sync {
    fn render(&self, ctx: &RenderContext<'_>) -> Markup;
}

impl<F> Component for F
where
    F: Fn(&RenderContext<'_>) -> Markup + Send + Sync,
{
    fn render(&self, ctx: &RenderContext<'_>) -> Markup {
        self(ctx)
    }
}

/// HTML element names. Tag names are case-insensitive in HTML, so `<BR>` or
/// `<A href>` must stay markup even though they start with a capital.
const HTML_ELEMENTS: &[&str] = &[
    "a", "abbr", "address", "area", "article", "aside", "audio", "b", "base", "bdi", "bdo",
    "blockquote", "body", "br", "button", "canvas", "caption", "cite", "code", "col",
    "colgroup", "data", "datalist", "dd", "del", "details", "dfn", "dialog", "div", "dl", "dt",
    "em", "embed", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4",
    "h5", "h6", "head", "header", "hgroup", "hr", "html", "i", "iframe", "img", "input", "ins",
    "kbd", "label", "legend", "li", "link", "main", "map", "mark", "menu", "meta", "meter",
    "nav", "noscript", "object", "ol", "optgroup", "option", "output", "p", "param", "picture",
    "pre", "progress", "q", "rp", "rt", "ruby", "s", "samp", "script", "search", "section",
    "select", "slot", "small", "source", "span", "strong", "style", "sub", "summary", "sup",
    "svg", "table", "tbody", "td", "template", "textarea", "tfoot", "th", "thead", "time",
    "title", "tr", "track", "u", "ul", "var", "video", "wbr",
];

/// Whether `name` is a standard HTML element, ignoring case.
pub fn is_html_element(name: &str) -> bool {
    HTML_ELEMENTS.iter().any(|el| el.eq_ignore_ascii_case(name))
}

/// Whether `name` can appear as a component tag in content markup.
///
/// Component names start with an ASCII capital, contain only letters and
/// digits, and never collide with an HTML element name.
pub fn is_component_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric())
        && !is_html_element(name)
}

#[derive(Default)]
pub struct ComponentRegistry {
    entries: BTreeMap<String, Arc<dyn Component>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `factory` under `name`. Never overwrites an existing entry.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: Arc<dyn Component>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if !is_component_name(&name) {
            return Err(RegistryError::InvalidName(name));
        }
        if self.entries.contains_key(&name) {
            return Err(RegistryError::DuplicateRegistration(name));
        }
        tracing::debug!(component = %name, "registered component");
        self.entries.insert(name, factory);
        Ok(())
    }

    /// The factory registered under `name`.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Component>, RegistryError> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnresolvedComponentReference(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render `name` into the page, or a visible marker when it is missing.
    pub fn mount(&self, name: &str, ctx: &RenderContext<'_>) -> Markup {
        match self.resolve(name) {
            Ok(component) => html! {
                div.tool-widget data-component=(name) {
                    (component.render(ctx))
                }
            },
            Err(err) => {
                tracing::warn!(component = %name, page = %ctx.page.route, "{err}");
                unresolved_marker(name)
            }
        }
    }
}

/// Placeholder rendered in place of an unregistered component.
pub fn unresolved_marker(name: &str) -> Markup {
    html! {
        div.unresolved-component role="alert" data-component=(name) {
            "unresolved: " (name)
        }
    }
}
