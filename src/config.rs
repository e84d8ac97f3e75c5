//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives in
//! the content root and is layered on top of the stock defaults, so a site
//! only needs to spell out the values it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! title = "拼好具"
//! description = "拼合收集各种工具网站"
//! base = "/"                 # Prefix every internal link is resolved against
//! appearance = "dark"        # light | dark | auto
//! version = "0.3.0"          # Substituted for `{version}` in nav labels
//!
//! [edit_link]
//! pattern = "https://github.com/OFXIV/tool/edit/main/docs/:path"
//! text = "编辑此页面"
//!
//! [[nav]]
//! text = "工具"
//! link = "/uuid"
//!
//! [[sidebar."/"]]
//! text = "生成器"
//! items = [
//!     { text = "UUID随机生成器", link = "/uuid" },
//!     { text = "随机密码生成器", link = "/randomkey" },
//! ]
//! ```
//!
//! Navigation entries, sidebar groups and sidebar items keep the order they
//! are written in. Unknown keys are rejected to catch typos early, and a
//! config that fails validation aborts the build before any page is written.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// How the site picks its color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    Light,
    Dark,
    /// Follow `prefers-color-scheme`.
    #[default]
    Auto,
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site title, shown in the top bar and appended to every page title.
    pub title: String,
    /// Meta description for every page.
    pub description: String,
    /// Base path the site is served under. Must start and end with `/`.
    pub base: String,
    /// `lang` attribute of the generated documents.
    pub lang: String,
    /// Site version, substituted for `{version}` in nav labels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub appearance: Appearance,
    /// Favicon path (root-relative).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    /// Logo shown next to the title in the top bar (root-relative).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Emit `/uuid` style links instead of `/uuid.html`.
    pub clean_urls: bool,
    /// Label of the appearance toggle button.
    pub dark_mode_switch_label: String,
    /// Show when each page's source file was last modified.
    pub last_updated: bool,
    /// Label in front of the last-updated timestamp.
    pub last_updated_text: String,
    /// `chrono` format string for the last-updated timestamp (UTC).
    pub last_updated_format: String,
    pub markdown: MarkdownConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_link: Option<EditLink>,
    pub doc_footer: DocFooter,
    pub search: SearchConfig,
    pub home: HomeConfig,
    pub social_links: Vec<SocialLink>,
    /// Top navigation, rendered in exactly this order.
    pub nav: Vec<NavEntry>,
    /// Sidebar groups keyed by route prefix. The longest matching prefix wins.
    pub sidebar: BTreeMap<String, Vec<SidebarGroup>>,
    pub colors: ColorConfig,
    pub tools: ToolsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "拼好具".to_string(),
            description: "拼合收集各种工具网站".to_string(),
            base: "/".to_string(),
            lang: "zh-CN".to_string(),
            version: None,
            appearance: Appearance::default(),
            favicon: None,
            logo: None,
            clean_urls: true,
            dark_mode_switch_label: "深浅模式".to_string(),
            last_updated: true,
            last_updated_text: "最后更新于".to_string(),
            last_updated_format: "%Y年%m月%d日 %H:%M:%S".to_string(),
            markdown: MarkdownConfig::default(),
            edit_link: None,
            doc_footer: DocFooter::default(),
            search: SearchConfig::default(),
            home: HomeConfig::default(),
            social_links: Vec::new(),
            nav: Vec::new(),
            sidebar: BTreeMap::new(),
            colors: ColorConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

/// A top navigation entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavEntry {
    /// Label. `{version}` is replaced by [`SiteConfig::version`].
    pub text: String,
    /// Root-relative path or absolute `http(s)` URL.
    pub link: String,
    /// Suppress the external-link marker.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub no_icon: bool,
}

/// A titled block of sidebar links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SidebarGroup {
    /// Group heading.
    pub text: String,
    pub items: Vec<SidebarItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SidebarItem {
    pub text: String,
    /// Root-relative path of the target page.
    pub link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    /// Mark fenced code blocks for line-number rendering.
    pub line_numbers: bool,
    /// Add `loading="lazy"` to every image.
    pub lazy_images: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            line_numbers: true,
            lazy_images: true,
        }
    }
}

/// "Edit this page" link. `:path` expands to the page's source path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditLink {
    pub pattern: String,
    #[serde(default = "default_edit_text")]
    pub text: String,
}

fn default_edit_text() -> String {
    "编辑此页面".to_string()
}

impl EditLink {
    pub fn url_for(&self, source_path: &str) -> String {
        self.pattern.replace(":path", source_path)
    }
}

/// Labels for the previous/next links under each article.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocFooter {
    pub prev: String,
    pub next: String,
}

impl Default for DocFooter {
    fn default() -> Self {
        Self {
            prev: "上一页".to_string(),
            next: "下一页".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProvider {
    /// Client-side search over a generated `search-index.json`.
    #[default]
    Local,
    #[serde(rename = "none")]
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub provider: SearchProvider,
    pub placeholder: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: SearchProvider::Local,
            placeholder: "搜索文档".to_string(),
        }
    }
}

/// Home page decoration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HomeConfig {
    /// Animate the background while the root route is shown.
    pub animation: bool,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self { animation: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SocialLink {
    /// Well-known icon name (`github`, `twitter`, ...), used as the label.
    pub icon: String,
    pub link: String,
    /// Inline SVG markup replacing the named icon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg: Option<String>,
}

/// Settings consumed by the built-in tool widgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    /// Default length of generated passwords.
    pub password_length: usize,
    /// Script providing `QRCode.toCanvas`, loaded by the QR widget.
    pub qrcode_script: String,
    /// Exchange-rate endpoint; the base currency code is appended.
    pub currency_api: String,
    /// Currencies offered by the converter, in display order.
    pub currencies: Vec<String>,
    /// Reading speed used by `ArticleMetadata`, in words per minute.
    pub reading_speed: usize,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            password_length: 16,
            qrcode_script: "https://cdn.jsdelivr.net/npm/qrcode@1.5.3/build/qrcode.min.js"
                .to_string(),
            currency_api: "https://open.er-api.com/v6/latest/".to_string(),
            currencies: ["CNY", "USD", "EUR", "JPY", "GBP", "HKD"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            reading_speed: 300,
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    /// Sidebar and top bar background.
    pub background_soft: String,
    pub text: String,
    /// Sidebar headings, doc footer labels, metadata.
    pub text_muted: String,
    pub border: String,
    /// Links and buttons.
    pub brand: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            background_soft: "#f6f6f7".to_string(),
            text: "#213547".to_string(),
            text_muted: "#476582".to_string(),
            border: "#e2e2e3".to_string(),
            brand: "#3451b2".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#1b1b1f".to_string(),
            background_soft: "#202127".to_string(),
            text: "#dfdfd6".to_string(),
            text_muted: "#98989f".to_string(),
            border: "#3c3f44".to_string(),
            brand: "#a8b1ff".to_string(),
        }
    }

    fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("background", self.background.as_str()),
            ("background_soft", self.background_soft.as_str()),
            ("text", self.text.as_str()),
            ("text_muted", self.text_muted.as_str()),
            ("border", self.border.as_str()),
            ("brand", self.brand.as_str()),
        ]
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Link helpers
// =============================================================================

/// True for absolute `http(s)` URLs.
pub fn is_external(link: &str) -> bool {
    link.starts_with("http://") || link.starts_with("https://")
}

/// True for root-relative links (`/uuid`, `/guide/`).
pub fn is_internal(link: &str) -> bool {
    link.starts_with('/') && !link.starts_with("//")
}

impl SiteConfig {
    /// Validate the whole schema, naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.title.trim().is_empty() {
            return Err(ConfigError::Validation("title must not be empty".into()));
        }
        if !self.base.starts_with('/') || !self.base.ends_with('/') {
            return Err(ConfigError::Validation(format!(
                "base must start and end with '/', got {:?}",
                self.base
            )));
        }
        for (i, entry) in self.nav.iter().enumerate() {
            if entry.text.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "nav[{i}].text must not be empty"
                )));
            }
            if !is_internal(&entry.link) && !is_external(&entry.link) {
                return Err(ConfigError::Validation(format!(
                    "nav[{i}].link must be root-relative or an http(s) URL, got {:?}",
                    entry.link
                )));
            }
        }
        for (prefix, groups) in &self.sidebar {
            if !prefix.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "sidebar key {prefix:?} must start with '/'"
                )));
            }
            for (g, group) in groups.iter().enumerate() {
                if group.text.trim().is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "sidebar.{prefix:?}[{g}].text must not be empty"
                    )));
                }
                if group.items.is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "sidebar group {:?} must have at least one item",
                        group.text
                    )));
                }
                for item in &group.items {
                    if item.text.trim().is_empty() || !is_internal(&item.link) {
                        return Err(ConfigError::Validation(format!(
                            "sidebar item {:?} in group {:?} needs a label and a root-relative link",
                            item.text, group.text
                        )));
                    }
                }
            }
        }
        if let Some(edit) = &self.edit_link {
            if !edit.pattern.contains(":path") {
                return Err(ConfigError::Validation(
                    "edit_link.pattern must contain ':path'".into(),
                ));
            }
        }
        for link in &self.social_links {
            if !is_external(&link.link) {
                return Err(ConfigError::Validation(format!(
                    "social link {:?} must be an http(s) URL",
                    link.icon
                )));
            }
        }
        for (mode, scheme) in [("light", &self.colors.light), ("dark", &self.colors.dark)] {
            for (name, value) in scheme.fields() {
                if value.trim().is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "colors.{mode}.{name} must not be empty"
                    )));
                }
            }
        }
        if chrono::format::StrftimeItems::new(&self.last_updated_format)
            .any(|item| matches!(item, chrono::format::Item::Error))
        {
            return Err(ConfigError::Validation(format!(
                "last_updated_format {:?} is not a valid strftime format",
                self.last_updated_format
            )));
        }
        if !(4..=128).contains(&self.tools.password_length) {
            return Err(ConfigError::Validation(
                "tools.password_length must be 4-128".into(),
            ));
        }
        if self.tools.reading_speed == 0 {
            return Err(ConfigError::Validation(
                "tools.reading_speed must be non-zero".into(),
            ));
        }
        if self.tools.currencies.len() < 2 {
            return Err(ConfigError::Validation(
                "tools.currencies needs at least two entries".into(),
            ));
        }
        Ok(())
    }

    /// Sidebar groups for `route`, picked by the longest matching prefix.
    pub fn sidebar_for(&self, route: &str) -> &[SidebarGroup] {
        self.sidebar
            .iter()
            .filter(|(prefix, _)| route.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, groups)| groups.as_slice())
            .unwrap_or(&[])
    }

    /// Resolve a link from the config against `base` and the URL style.
    ///
    /// External links pass through untouched.
    pub fn resolve_link(&self, link: &str) -> String {
        if !is_internal(link) {
            return link.to_string();
        }
        let (path, fragment) = match link.find('#') {
            Some(i) => link.split_at(i),
            None => (link, ""),
        };
        let has_extension = path.rsplit('/').next().is_some_and(|seg| seg.contains('.'));
        let path = if self.clean_urls || path.ends_with('/') || has_extension {
            path.to_string()
        } else {
            format!("{path}.html")
        };
        format!("{}{}{}", self.base.trim_end_matches('/'), path, fragment)
    }

    /// Nav label with `{version}` substituted.
    pub fn nav_label(&self, entry: &NavEntry) -> String {
        match &self.version {
            Some(version) => entry.text.replace("{version}", version),
            None => entry.text.replace("{version}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Every internal link in nav and sidebar, in declaration order.
    pub fn internal_links(&self) -> Vec<&str> {
        let nav = self
            .nav
            .iter()
            .map(|e| e.link.as_str())
            .filter(|l| is_internal(l));
        let sidebar = self
            .sidebar
            .values()
            .flatten()
            .flat_map(|g| g.items.iter().map(|i| i.link.as_str()));
        nav.chain(sidebar).collect()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Arrays and scalars in overlay replace base values entirely, so a `nav`
///   list in the user config is never interleaved with the defaults.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the site config from `config.toml` in the content root.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# 拼好具 site configuration
# =======================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

title = "拼好具"
description = "拼合收集各种工具网站"

# Path the site is served under. Must start and end with '/'.
base = "/"
lang = "zh-CN"

# light | dark | auto (follows the visitor's system preference)
appearance = "auto"

# Emit /uuid style links. Set to false for hosts without clean URL support.
clean_urls = true

dark_mode_switch_label = "深浅模式"

# Show the source file's modification time under every article.
last_updated = true
last_updated_text = "最后更新于"
# chrono strftime format, rendered in UTC.
last_updated_format = "%Y年%m月%d日 %H:%M:%S"

# Substituted for {version} in nav labels. Defaults to the generator version.
# version = "1.0.0"

# favicon = "/favicon.ico"
# logo = "/logo.png"

# [edit_link]
# pattern = "https://github.com/OFXIV/tool/edit/main/docs/:path"
# text = "编辑此页面"

# [[social_links]]
# icon = "github"
# link = "https://github.com/OFXIV"

# Top navigation, rendered in this order.
# [[nav]]
# text = "工具"
# link = "/uuid"

# Sidebar groups keyed by route prefix; the longest matching prefix wins.
# [[sidebar."/"]]
# text = "生成器"
# items = [{ text = "UUID随机生成器", link = "/uuid" }]

[markdown]
line_numbers = true
lazy_images = true

[doc_footer]
prev = "上一页"
next = "下一页"

[search]
# local | none
provider = "local"
placeholder = "搜索文档"

[home]
# Animated background on the home page.
animation = true

[tools]
password_length = 16
qrcode_script = "https://cdn.jsdelivr.net/npm/qrcode@1.5.3/build/qrcode.min.js"
currency_api = "https://open.er-api.com/v6/latest/"
currencies = ["CNY", "USD", "EUR", "JPY", "GBP", "HKD"]
# Words per minute for the ArticleMetadata reading time.
reading_speed = 300

[colors.light]
background = "#ffffff"
background_soft = "#f6f6f7"
text = "#213547"
text_muted = "#476582"
border = "#e2e2e3"
brand = "#3451b2"

[colors.dark]
background = "#1b1b1f"
background_soft = "#202127"
text = "#dfdfd6"
text_muted = "#98989f"
border = "#3c3f44"
brand = "#a8b1ff"
"##
}

fn color_vars(scheme: &ColorScheme) -> String {
    format!(
        "--color-bg: {};\n    --color-bg-soft: {};\n    --color-text: {};\n    --color-text-muted: {};\n    --color-border: {};\n    --color-brand: {};",
        scheme.background,
        scheme.background_soft,
        scheme.text,
        scheme.text_muted,
        scheme.border,
        scheme.brand,
    )
}

/// Generate CSS custom properties for the configured appearance.
///
/// The appearance picks the scheme used on first paint. `html.dark` and
/// `html.light` always win so the toggle button can override it.
pub fn generate_color_css(colors: &ColorConfig, appearance: Appearance) -> String {
    let light = color_vars(&colors.light);
    let dark = color_vars(&colors.dark);
    let initial = match appearance {
        Appearance::Light | Appearance::Auto => format!(":root {{\n    {light}\n}}"),
        Appearance::Dark => format!(":root {{\n    {dark}\n}}"),
    };
    let media = match appearance {
        Appearance::Auto => format!(
            "\n\n@media (prefers-color-scheme: dark) {{\n    :root {{\n    {dark}\n    }}\n}}"
        ),
        _ => String::new(),
    };
    format!(
        "{initial}{media}\n\nhtml.light {{\n    {light}\n}}\n\nhtml.dark {{\n    {dark}\n}}"
    )
}
