//! # 拼好具 (pinhaoju)
//!
//! A static site generator for a small collection of browser tools. Content
//! is a directory of markdown pages; a page mounts an interactive tool by
//! writing its component tag (`<UUIDGenerator />`) where the widget belongs.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Scan      docs/     →  Manifest   (config + pages + component references)
//! 2. Generate  Manifest  →  dist/      (HTML, CSS, search index, public assets)
//! ```
//!
//! The manifest is plain serializable data, so `pinhaoju check --json` can
//! show exactly what the generator will see.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `config.toml` loading, validation, link resolution and color CSS |
//! | [`scan`] | Stage 1: walks the content directory and validates nav/sidebar links |
//! | [`markdown`] | Component tag discovery and markdown → HTML rendering |
//! | [`registry`] | Name → component table; renders a visible marker for unknown names |
//! | [`layout`] | Home/plain layout state machine owning the home animation style |
//! | [`widgets`] | The built-in tools: generators, converters, article metadata |
//! | [`generate`] | Stage 2: renders every page with Maud and writes the site |
//! | [`types`] | Shared page type |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Registration Is Strict, Rendering Is Forgiving
//!
//! Registering the same component name twice is an error at startup, since
//! the second registration would silently shadow the first. A page that names
//! a component nobody registered still builds: the tag renders as a visible
//! `unresolved: Name` notice and the build report lists it.
//!
//! ## Home Styling Follows the Route
//!
//! The animated backdrop belongs to the home page only. [`layout`] models this
//! as two states and injects or releases the style as the route changes, so
//! the style exists exactly while the home page is current.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/): malformed markup
//! is a compile error and every interpolation is escaped. Widget scripts are
//! plain vanilla JavaScript embedded at compile time.

pub mod config;
pub mod generate;
pub mod layout;
pub mod markdown;
pub mod output;
pub mod registry;
pub mod scan;
pub mod types;
pub mod widgets;

#[cfg(test)]
pub(crate) mod test_helpers;
