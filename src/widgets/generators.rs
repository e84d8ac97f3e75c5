//! Generator widgets: UUIDs, random passwords, QR codes.
//!
//! Each widget is pre-filled with a value generated at build time so the page
//! is useful before any script runs; the browser regenerates on demand with
//! `crypto.randomUUID` / `crypto.getRandomValues`.

use crate::registry::{Component, RenderContext};
use maud::{Markup, PreEscaped, html};
use rand::Rng;

const UUID_JS: &str = include_str!("../../static/widgets/uuid.js");
const PASSWORD_JS: &str = include_str!("../../static/widgets/password.js");
const QRCODE_JS: &str = include_str!("../../static/widgets/qrcode.js");

pub struct UuidGenerator;

impl Component for UuidGenerator {
    fn render(&self, _ctx: &RenderContext<'_>) -> Markup {
        let seed = uuid::Uuid::new_v4().to_string();
        html! {
            div.uuid-generator {
                div.tool-options {
                    label { "数量" input type="number" name="count" value="1" min="1" max="100"; }
                    label { input type="checkbox" name="hyphens" checked; "连字符" }
                    label { input type="checkbox" name="uppercase"; "大写" }
                }
                div.tool-actions {
                    button type="button" data-action="generate" { "生成" }
                    button type="button" data-action="copy" { "复制" }
                }
                pre.tool-output { (seed) }
                script { (PreEscaped(UUID_JS)) }
            }
        }
    }
}

/// Character classes a password may draw from.
#[derive(Debug, Clone, Copy)]
pub struct Charset {
    pub lower: bool,
    pub upper: bool,
    pub digits: bool,
    pub symbols: bool,
}

impl Default for Charset {
    fn default() -> Self {
        Self {
            lower: true,
            upper: true,
            digits: true,
            symbols: false,
        }
    }
}

impl Charset {
    /// Concatenated alphabet; must stay in sync with `password.js`.
    pub fn alphabet(&self) -> Vec<char> {
        let mut chars = String::new();
        if self.lower {
            chars.push_str("abcdefghijklmnopqrstuvwxyz");
        }
        if self.upper {
            chars.push_str("ABCDEFGHIJKLMNOPQRSTUVWXYZ");
        }
        if self.digits {
            chars.push_str("0123456789");
        }
        if self.symbols {
            chars.push_str("!@#$%^&*()-_=+[]{};:,.?");
        }
        chars.chars().collect()
    }
}

/// Random password of `length` characters, or `None` for an empty charset.
pub fn generate_password(length: usize, charset: Charset, rng: &mut impl Rng) -> Option<String> {
    let alphabet = charset.alphabet();
    if alphabet.is_empty() {
        return None;
    }
    Some(
        (0..length)
            .map(|_| alphabet[rng.random_range(0..alphabet.len())])
            .collect(),
    )
}

pub struct RandomKey;

impl Component for RandomKey {
    fn render(&self, ctx: &RenderContext<'_>) -> Markup {
        let length = ctx.config.tools.password_length;
        let charset = Charset::default();
        let seed = generate_password(length, charset, &mut rand::rng()).unwrap_or_default();
        html! {
            div.random-key {
                div.tool-options {
                    label { "长度" input type="number" name="length" value=(length) min="4" max="128"; }
                    label { input type="checkbox" name="lower" checked[charset.lower]; "小写" }
                    label { input type="checkbox" name="upper" checked[charset.upper]; "大写" }
                    label { input type="checkbox" name="digits" checked[charset.digits]; "数字" }
                    label { input type="checkbox" name="symbols" checked[charset.symbols]; "符号" }
                }
                div.tool-actions {
                    button type="button" data-action="generate" { "生成" }
                    button type="button" data-action="copy" { "复制" }
                }
                pre.tool-output { (seed) }
                script { (PreEscaped(PASSWORD_JS)) }
            }
        }
    }
}

pub struct QrCode;

impl Component for QrCode {
    fn render(&self, ctx: &RenderContext<'_>) -> Markup {
        html! {
            div.qrcode-generator {
                div.tool-options {
                    label { "内容" input type="text" name="text" placeholder="https://"; }
                    label {
                        "尺寸"
                        select name="size" {
                            @for size in [128, 256, 512] {
                                option value=(size) selected[size == 256] { (size) "px" }
                            }
                        }
                    }
                }
                div.tool-actions {
                    button type="button" data-action="generate" { "生成" }
                    button type="button" data-action="download" { "下载" }
                }
                canvas width="256" height="256" {}
                p.tool-error {}
                script src=(ctx.config.tools.qrcode_script) {}
                script { (PreEscaped(QRCODE_JS)) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::test_helpers::page;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn password_has_requested_length_and_charset() {
        let mut rng = StdRng::seed_from_u64(7);
        let charset = Charset {
            lower: false,
            upper: false,
            digits: true,
            symbols: false,
        };
        let key = generate_password(32, charset, &mut rng).unwrap();
        assert_eq!(key.chars().count(), 32);
        assert!(key.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn password_with_empty_charset_is_none() {
        let mut rng = StdRng::seed_from_u64(7);
        let charset = Charset {
            lower: false,
            upper: false,
            digits: false,
            symbols: false,
        };
        assert!(generate_password(16, charset, &mut rng).is_none());
    }

    #[test]
    fn default_charset_excludes_symbols() {
        let alphabet = Charset::default().alphabet();
        assert_eq!(alphabet.len(), 62);
        assert!(!alphabet.contains(&'!'));
    }

    #[test]
    fn uuid_widget_is_seeded_with_v4() {
        let config = SiteConfig::default();
        let page = page("/uuid", "<UUIDGenerator />");
        let html = UuidGenerator
            .render(&RenderContext { config: &config, page: &page })
            .into_string();
        let marker = "<pre class=\"tool-output\">";
        let start = html.find(marker).unwrap() + marker.len();
        let seed = &html[start..start + 36];
        let parsed = uuid::Uuid::parse_str(seed).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn random_key_uses_configured_length() {
        let mut config = SiteConfig::default();
        config.tools.password_length = 24;
        let page = page("/randomkey", "");
        let html = RandomKey
            .render(&RenderContext { config: &config, page: &page })
            .into_string();
        assert!(html.contains(r#"name="length" value="24""#));
    }

    #[test]
    fn qrcode_loads_configured_script() {
        let mut config = SiteConfig::default();
        config.tools.qrcode_script = "/assets/qrcode.js".into();
        let page = page("/qrcode", "");
        let html = QrCode
            .render(&RenderContext { config: &config, page: &page })
            .into_string();
        assert!(html.contains(r#"<script src="/assets/qrcode.js">"#));
        assert!(html.contains("<canvas"));
    }
}
