//! Home-page background animation, toggled by route changes.
//!
//! The generator walks the pages one route at a time and reports every
//! route change to a [`LayoutComposer`]. The composer is a two-state machine:
//!
//! ```text
//!            route == root
//! PlainPage ───────────────▶ AnimatedHome   (inject animation style)
//!           ◀───────────────                (release animation style)
//!            route != root
//! ```
//!
//! Notifications that keep the current state are no-ops, so the style is
//! injected at most once per visit to the root and released exactly once
//! when leaving it. The style lives in a [`StyleHost`]; the generator uses
//! [`HeadStyles`], whose contents are copied into each page's `<head>`.
//!
//! Failing to attach or detach the style is never fatal. The failure is
//! logged and the site is built without the decoration.

use crate::config::SiteConfig;
use maud::{Markup, PreEscaped, html};
use thiserror::Error;

/// Id of the animation style block.
pub const HOME_STYLE_ID: &str = "home-animation";

const HOME_CSS: &str = include_str!("../static/home.css");

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LayoutError {
    #[error("style {0:?} is already attached")]
    AlreadyAttached(String),
    #[error("style {0:?} is not attached")]
    NotAttached(String),
    #[error("style {0:?} has no content")]
    EmptyStyle(String),
}

/// Somewhere scoped style resources can be attached to and detached from.
pub trait StyleHost {
    fn inject(&mut self, id: &str, css: &str) -> Result<(), LayoutError>;
    fn release(&mut self, id: &str) -> Result<(), LayoutError>;
}

/// Ordered set of `<style>` blocks shared by every page head.
#[derive(Debug, Default)]
pub struct HeadStyles {
    styles: Vec<(String, String)>,
}

impl HeadStyles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.styles.iter().any(|(held, _)| held == id)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Render the attached styles for a document head.
    pub fn render(&self) -> Markup {
        html! {
            @for (id, css) in &self.styles {
                style data-style=(id) { (PreEscaped(css)) }
            }
        }
    }
}

impl StyleHost for HeadStyles {
    fn inject(&mut self, id: &str, css: &str) -> Result<(), LayoutError> {
        if css.trim().is_empty() {
            return Err(LayoutError::EmptyStyle(id.to_string()));
        }
        if self.contains(id) {
            return Err(LayoutError::AlreadyAttached(id.to_string()));
        }
        self.styles.push((id.to_string(), css.to_string()));
        Ok(())
    }

    fn release(&mut self, id: &str) -> Result<(), LayoutError> {
        let before = self.styles.len();
        self.styles.retain(|(held, _)| held != id);
        if self.styles.len() == before {
            return Err(LayoutError::NotAttached(id.to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutState {
    AnimatedHome,
    PlainPage,
}

/// Whether `path` is the site root, relative to the base path.
pub fn is_root(path: &str) -> bool {
    matches!(
        path.trim_start_matches('/'),
        "" | "index" | "index.html"
    )
}

pub struct LayoutComposer {
    state: LayoutState,
    enabled: bool,
    style_id: String,
    css: String,
}

impl LayoutComposer {
    /// Composer carrying the stock home animation.
    pub fn new(config: &SiteConfig) -> Self {
        Self::with_style(config.home.animation, HOME_STYLE_ID, HOME_CSS)
    }

    pub fn with_style(enabled: bool, style_id: &str, css: &str) -> Self {
        Self {
            state: LayoutState::PlainPage,
            enabled,
            style_id: style_id.to_string(),
            css: css.to_string(),
        }
    }

    pub fn state(&self) -> LayoutState {
        self.state
    }

    /// True while the animation style is attached to the host.
    pub fn is_held(&self) -> bool {
        self.state == LayoutState::AnimatedHome
    }

    /// React to the current route changing to `path`.
    pub fn on_route_change(&mut self, path: &str, host: &mut impl StyleHost) -> LayoutState {
        let target = if self.enabled && is_root(path) {
            LayoutState::AnimatedHome
        } else {
            LayoutState::PlainPage
        };
        if target == self.state {
            return self.state;
        }

        match target {
            LayoutState::AnimatedHome => match host.inject(&self.style_id, &self.css) {
                Ok(()) => self.state = LayoutState::AnimatedHome,
                Err(err) => {
                    tracing::warn!(route = %path, "home animation disabled: {err}");
                }
            },
            LayoutState::PlainPage => {
                if let Err(err) = host.release(&self.style_id) {
                    tracing::warn!(route = %path, "could not release home animation: {err}");
                }
                self.state = LayoutState::PlainPage;
            }
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts calls and fails injection on demand.
    #[derive(Default)]
    struct CountingHost {
        injected: usize,
        released: usize,
        held: usize,
        fail_inject: bool,
    }

    impl StyleHost for CountingHost {
        fn inject(&mut self, id: &str, _css: &str) -> Result<(), LayoutError> {
            if self.fail_inject {
                return Err(LayoutError::EmptyStyle(id.to_string()));
            }
            self.injected += 1;
            self.held += 1;
            Ok(())
        }

        fn release(&mut self, _id: &str) -> Result<(), LayoutError> {
            self.released += 1;
            self.held -= 1;
            Ok(())
        }
    }

    fn composer() -> LayoutComposer {
        LayoutComposer::with_style(true, HOME_STYLE_ID, "body { color: red }")
    }

    #[test]
    fn starts_plain() {
        let composer = composer();
        assert_eq!(composer.state(), LayoutState::PlainPage);
        assert!(!composer.is_held());
    }

    #[test]
    fn root_twice_holds_one_resource() {
        let mut composer = composer();
        let mut host = CountingHost::default();
        composer.on_route_change("/", &mut host);
        composer.on_route_change("/", &mut host);
        assert_eq!(host.injected, 1);
        assert_eq!(host.held, 1);
        assert!(composer.is_held());
    }

    #[test]
    fn leaving_root_releases_once() {
        let mut composer = composer();
        let mut host = CountingHost::default();
        composer.on_route_change("/", &mut host);
        composer.on_route_change("/uuid", &mut host);
        composer.on_route_change("/randomkey", &mut host);
        assert_eq!(host.released, 1);
        assert_eq!(host.held, 0);
        assert_eq!(composer.state(), LayoutState::PlainPage);
    }

    #[test]
    fn non_root_routes_never_touch_host() {
        let mut composer = composer();
        let mut host = CountingHost::default();
        for path in ["/uuid", "/qrcode", "/guide/"] {
            composer.on_route_change(path, &mut host);
        }
        assert_eq!(host.injected, 0);
        assert_eq!(host.released, 0);
    }

    #[test]
    fn returning_home_injects_again() {
        let mut composer = composer();
        let mut host = CountingHost::default();
        for path in ["/", "/uuid", "/index.html"] {
            composer.on_route_change(path, &mut host);
        }
        assert_eq!(host.injected, 2);
        assert_eq!(host.released, 1);
        assert_eq!(host.held, 1);
    }

    #[test]
    fn failed_injection_keeps_plain_page() {
        let mut composer = composer();
        let mut host = CountingHost {
            fail_inject: true,
            ..Default::default()
        };
        assert_eq!(composer.on_route_change("/", &mut host), LayoutState::PlainPage);
        // Leaving root must not release a style that was never attached.
        composer.on_route_change("/uuid", &mut host);
        assert_eq!(host.released, 0);
    }

    #[test]
    fn disabled_composer_stays_plain() {
        let mut composer = LayoutComposer::with_style(false, HOME_STYLE_ID, "x");
        let mut host = CountingHost::default();
        composer.on_route_change("/", &mut host);
        assert_eq!(host.injected, 0);
    }

    #[test]
    fn head_styles_attach_and_detach() {
        let mut head = HeadStyles::new();
        let mut composer = composer();
        composer.on_route_change("/", &mut head);
        assert!(head.contains(HOME_STYLE_ID));
        assert!(head.render().into_string().contains("data-style=\"home-animation\""));

        composer.on_route_change("/uuid", &mut head);
        assert!(head.is_empty());
    }

    #[test]
    fn head_styles_reject_double_inject_and_release() {
        let mut head = HeadStyles::new();
        head.inject("a", "p {}").unwrap();
        assert_eq!(
            head.inject("a", "p {}"),
            Err(LayoutError::AlreadyAttached("a".into()))
        );
        head.release("a").unwrap();
        assert_eq!(head.release("a"), Err(LayoutError::NotAttached("a".into())));
        assert_eq!(head.inject("b", "  "), Err(LayoutError::EmptyStyle("b".into())));
    }

    #[test]
    fn stock_home_css_is_not_empty() {
        let config = SiteConfig::default();
        let mut composer = LayoutComposer::new(&config);
        let mut head = HeadStyles::new();
        composer.on_route_change("/", &mut head);
        assert_eq!(head.len(), 1);
    }

    #[test]
    fn root_detection() {
        assert!(is_root("/"));
        assert!(is_root(""));
        assert!(is_root("/index.html"));
        assert!(!is_root("/uuid"));
        assert!(!is_root("/guide/"));
    }
}
