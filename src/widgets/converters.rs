//! Converter widgets: currency, JSON formatting, Base64.

use crate::registry::{Component, RenderContext};
use maud::{Markup, PreEscaped, html};

const CURRENCY_JS: &str = include_str!("../../static/widgets/currency.js");
const JSON_JS: &str = include_str!("../../static/widgets/json.js");
const BASE64_JS: &str = include_str!("../../static/widgets/base64.js");

pub struct CurrencyConverter;

impl Component for CurrencyConverter {
    fn render(&self, ctx: &RenderContext<'_>) -> Markup {
        let tools = &ctx.config.tools;
        let from = tools.currencies.first().map(String::as_str).unwrap_or("CNY");
        let to = tools.currencies.get(1).map(String::as_str).unwrap_or("USD");
        html! {
            div.currency-converter data-api=(tools.currency_api) {
                div.tool-options {
                    label { "金额" input type="number" name="amount" value="100" step="any"; }
                    label {
                        "从"
                        select name="from" {
                            @for code in &tools.currencies {
                                option value=(code) selected[code == from] { (code) }
                            }
                        }
                    }
                    label {
                        "到"
                        select name="to" {
                            @for code in &tools.currencies {
                                option value=(code) selected[code == to] { (code) }
                            }
                        }
                    }
                }
                div.tool-actions {
                    button type="button" data-action="convert" { "换算" }
                }
                pre.tool-output {}
                p.tool-error {}
                script { (PreEscaped(CURRENCY_JS)) }
            }
        }
    }
}

/// Example document shown in the formatter before the visitor types anything.
fn json_sample(ctx: &RenderContext<'_>) -> String {
    let sample = serde_json::json!({
        "site": ctx.config.title,
        "page": ctx.page.route,
        "minified": true,
    });
    sample.to_string()
}

pub struct JsonFormatter;

impl Component for JsonFormatter {
    fn render(&self, ctx: &RenderContext<'_>) -> Markup {
        html! {
            div.json-formatter {
                textarea name="input" spellcheck="false" { (json_sample(ctx)) }
                div.tool-options {
                    label {
                        "缩进"
                        select name="indent" {
                            option value="2" selected { "2 空格" }
                            option value="4" { "4 空格" }
                            option value="tab" { "Tab" }
                        }
                    }
                }
                div.tool-actions {
                    button type="button" data-action="format" { "格式化" }
                    button type="button" data-action="minify" { "压缩" }
                }
                pre.tool-output {}
                p.tool-error {}
                script { (PreEscaped(JSON_JS)) }
            }
        }
    }
}

pub struct Base64Converter;

impl Component for Base64Converter {
    fn render(&self, _ctx: &RenderContext<'_>) -> Markup {
        html! {
            div.base64-converter {
                textarea name="input" spellcheck="false" placeholder="输入文本或 Base64" {}
                div.tool-actions {
                    button type="button" data-action="encode" { "编码" }
                    button type="button" data-action="decode" { "解码" }
                }
                pre.tool-output {}
                p.tool-error {}
                script { (PreEscaped(BASE64_JS)) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::test_helpers::page;

    #[test]
    fn currency_lists_configured_codes_in_order() {
        let mut config = SiteConfig::default();
        config.tools.currencies = vec!["EUR".into(), "JPY".into(), "CNY".into()];
        let page = page("/currencyconverter", "");
        let html = CurrencyConverter
            .render(&RenderContext { config: &config, page: &page })
            .into_string();

        let eur = html.find(r#"value="EUR""#).unwrap();
        let jpy = html.find(r#"value="JPY""#).unwrap();
        assert!(eur < jpy);
        assert!(html.contains(r#"<option value="EUR" selected>EUR</option>"#));
        assert!(html.contains("data-api=\"https://open.er-api.com/v6/latest/\""));
    }

    #[test]
    fn json_sample_is_valid_json() {
        let config = SiteConfig::default();
        let page = page("/jsonformatter", "");
        let ctx = RenderContext { config: &config, page: &page };
        let value: serde_json::Value = serde_json::from_str(&json_sample(&ctx)).unwrap();
        assert_eq!(value["page"], "/jsonformatter");
    }

    #[test]
    fn json_sample_is_escaped_in_textarea() {
        let config = SiteConfig::default();
        let page = page("/jsonformatter", "");
        let html = JsonFormatter
            .render(&RenderContext { config: &config, page: &page })
            .into_string();
        assert!(html.contains("&quot;site&quot;"));
    }

    #[test]
    fn base64_has_both_actions() {
        let config = SiteConfig::default();
        let page = page("/base64", "");
        let html = Base64Converter
            .render(&RenderContext { config: &config, page: &page })
            .into_string();
        assert!(html.contains(r#"data-action="encode""#));
        assert!(html.contains(r#"data-action="decode""#));
    }
}
