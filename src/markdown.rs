//! Markdown handling for content pages.
//!
//! Pages are CommonMark with tables, strikethrough and task lists. On top of
//! that, a page mounts a tool by writing its component tag as raw HTML:
//!
//! ```markdown
//! # UUID随机生成器
//!
//! <UUIDGenerator />
//! ```
//!
//! Tags are recognised in HTML blocks and inline HTML only, so a tag inside a
//! code span or fenced block stays literal. Component names start with an
//! ASCII capital and never reuse an HTML element name, so `<BR>` and
//! `<A href="...">` stay ordinary markup.
//! Accepted forms are `<Name />`, `<Name/>` and `<Name></Name>`.

use crate::config::{SiteConfig, is_internal};
use crate::registry::is_component_name;
use maud::html;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// A component tag found in an HTML fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpan {
    pub start: usize,
    pub end: usize,
    pub name: String,
    pub closing: bool,
}

/// Byte offset just past the `>` closing the tag opened at `start`.
///
/// `>` inside single- or double-quoted attribute values does not count.
fn tag_end(fragment: &str, start: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in fragment[start + 1..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(start + 1 + i + 1),
            (None, _) => {}
        }
    }
    None
}

/// Locate component tags (`<Name ...>`, `<Name />`, `</Name>`) in `fragment`.
///
/// Every tag is skipped as a whole, so a `<Name` inside a quoted attribute
/// value or an HTML comment is not a component.
pub fn component_tags(fragment: &str) -> Vec<TagSpan> {
    let mut spans = Vec::new();
    let mut pos = 0;
    while let Some(offset) = fragment[pos..].find('<') {
        let start = pos + offset;
        let rest = &fragment[start + 1..];
        if rest.starts_with("!--") {
            match rest.find("-->") {
                Some(close) => {
                    pos = start + 1 + close + 3;
                    continue;
                }
                None => break,
            }
        }
        let closing = rest.starts_with('/');
        let name_start = if closing { 1 } else { 0 };
        let name_len = rest[name_start..]
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len() - name_start);
        let name = &rest[name_start..name_start + name_len];
        if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            pos = start + 1;
            continue;
        }
        let Some(end) = tag_end(fragment, start) else {
            break;
        };
        if is_component_name(name) {
            spans.push(TagSpan {
                start,
                end,
                name: name.to_string(),
                closing,
            });
        }
        pos = end;
    }
    spans
}

/// Replace every opening component tag with `mount(name)` and drop closers.
fn replace_component_tags(fragment: &str, mount: &mut dyn FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut last = 0;
    for span in component_tags(fragment) {
        out.push_str(&fragment[last..span.start]);
        if !span.closing {
            out.push_str(&mount(&span.name));
        }
        last = span.end;
    }
    out.push_str(&fragment[last..]);
    out
}

/// Component names referenced by a page, in first-use order, without repeats.
pub fn find_components(body: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for event in Parser::new_ext(body, options()) {
        if let Event::Html(fragment) | Event::InlineHtml(fragment) = event {
            for span in component_tags(&fragment) {
                if !span.closing && !names.contains(&span.name) {
                    names.push(span.name);
                }
            }
        }
    }
    names
}

/// Text of the first level-1 heading.
pub fn extract_title(body: &str) -> Option<String> {
    let mut in_title = false;
    let mut title = String::new();
    for event in Parser::new_ext(body, options()) {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) => in_title = true,
            Event::End(TagEnd::Heading(HeadingLevel::H1)) if in_title => {
                let title = title.trim().to_string();
                return (!title.is_empty()).then_some(title);
            }
            Event::Text(text) | Event::Code(text) if in_title => title.push_str(&text),
            _ => {}
        }
    }
    None
}

/// Visible text of a page, for search and word counts.
pub fn plain_text(body: &str) -> String {
    let mut text = String::new();
    for event in Parser::new_ext(body, options()) {
        match event {
            Event::Text(t) | Event::Code(t) => {
                text.push_str(&t);
                text.push(' ');
            }
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{3040}'..='\u{30FF}'
        | '\u{AC00}'..='\u{D7AF}'
        | '\u{F900}'..='\u{FAFF}')
}

/// Word count where each CJK character counts as one word.
pub fn word_count(text: &str) -> usize {
    let mut count = 0;
    let mut in_word = false;
    for c in text.chars() {
        if is_cjk(c) {
            count += 1;
            in_word = false;
        } else if c.is_alphanumeric() {
            if !in_word {
                count += 1;
            }
            in_word = true;
        } else {
            in_word = false;
        }
    }
    count
}

/// Root-relative asset paths are prefixed with the site base.
fn asset_url(config: &SiteConfig, url: &str) -> String {
    if is_internal(url) {
        format!("{}{}", config.base.trim_end_matches('/'), url)
    } else {
        url.to_string()
    }
}

/// Render a page body to HTML.
///
/// Component tags are replaced by whatever `mount` returns for their name.
/// Root-relative links are resolved against the site base, and images and
/// code blocks follow the `[markdown]` settings.
pub fn render_markdown(
    body: &str,
    config: &SiteConfig,
    mount: &mut dyn FnMut(&str) -> String,
) -> String {
    let mut events: Vec<Event<'_>> = Vec::new();
    let mut image: Option<(String, String, String)> = None;

    for event in Parser::new_ext(body, options()) {
        if let Some((_, _, alt)) = image.as_mut() {
            match event {
                Event::End(TagEnd::Image) => {
                    let (src, title, alt) = image.take().unwrap_or_default();
                    let title = (!title.is_empty()).then_some(title);
                    let img = html! {
                        img src=(src) alt=(alt) title=[title] loading="lazy";
                    };
                    events.push(Event::InlineHtml(CowStr::from(img.into_string())));
                }
                Event::Text(text) | Event::Code(text) => alt.push_str(&text),
                _ => {}
            }
            continue;
        }

        match event {
            Event::Html(fragment) => {
                events.push(Event::Html(replace_component_tags(&fragment, mount).into()));
            }
            Event::InlineHtml(fragment) => {
                events.push(Event::InlineHtml(
                    replace_component_tags(&fragment, mount).into(),
                ));
            }
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) if is_internal(&dest_url) => {
                let target = dest_url.strip_suffix(".md").unwrap_or(&dest_url);
                events.push(Event::Start(Tag::Link {
                    link_type,
                    dest_url: config.resolve_link(target).into(),
                    title,
                    id,
                }));
            }
            Event::Start(Tag::Image {
                dest_url, title, ..
            }) if config.markdown.lazy_images => {
                image = Some((asset_url(config, &dest_url), title.to_string(), String::new()));
            }
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                events.push(Event::Start(Tag::Image {
                    link_type,
                    dest_url: asset_url(config, &dest_url).into(),
                    title,
                    id,
                }));
            }
            Event::Start(Tag::CodeBlock(kind)) if config.markdown.line_numbers => {
                let lang: String = match &kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .unwrap_or("")
                        .chars()
                        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'))
                        .collect(),
                    CodeBlockKind::Indented => String::new(),
                };
                let open = if lang.is_empty() {
                    "<pre class=\"line-numbers\"><code>".to_string()
                } else {
                    format!(
                        "<pre class=\"line-numbers\" data-lang=\"{lang}\"><code class=\"language-{lang}\">"
                    )
                };
                events.push(Event::Html(open.into()));
            }
            Event::End(TagEnd::CodeBlock) if config.markdown.line_numbers => {
                events.push(Event::Html("</code></pre>\n".into()));
            }
            other => events.push(other),
        }
    }

    let mut html_out = String::new();
    pulldown_cmark::html::push_html(&mut html_out, events.into_iter());
    html_out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo(name: &str) -> String {
        format!("[{name}]")
    }

    #[test]
    fn component_tags_found_in_all_forms() {
        let spans = component_tags("<UUIDGenerator /> <QRcode/> <RandomKey></RandomKey>");
        let names: Vec<(&str, bool)> = spans
            .iter()
            .map(|s| (s.name.as_str(), s.closing))
            .collect();
        assert_eq!(
            names,
            vec![
                ("UUIDGenerator", false),
                ("QRcode", false),
                ("RandomKey", false),
                ("RandomKey", true),
            ]
        );
    }

    #[test]
    fn lowercase_html_is_not_a_component() {
        assert!(component_tags("<div class=\"x\"><br/></div>").is_empty());
    }

    #[test]
    fn uppercase_html_is_not_a_component() {
        assert!(component_tags("<A href=\"/uuid\">uuid</A><BR><Div></Div>").is_empty());
    }

    #[test]
    fn tags_inside_attribute_values_are_skipped() {
        let fragment = "<div title=\"<A\" data-x='<QRcode />'><QRcode /></div>";
        let spans = component_tags(fragment);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].name, "QRcode");
        assert_eq!(&fragment[spans[0].start..spans[0].end], "<QRcode />");
    }

    #[test]
    fn stray_angle_bracket_does_not_hide_components() {
        let spans = component_tags("<p>1 <3 2</p><QRcode />");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].name, "QRcode");
    }

    #[test]
    fn tags_inside_comments_are_skipped() {
        let spans = component_tags("<!-- <QRcode /> --><RandomKey />");
        let names: Vec<&str> = spans.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["RandomKey"]);
    }

    #[test]
    fn render_keeps_attribute_text_intact() {
        let config = SiteConfig::default();
        let html = render_markdown("<div title=\"<A\"><QRcode /></div>\n", &config, &mut echo);
        assert!(html.contains(r#"<div title="<A">[QRcode]</div>"#));
    }

    #[test]
    fn find_components_dedupes_in_order() {
        let body = "# Tools\n\n<RandomKey />\n\nText <UUIDGenerator /> and <RandomKey />.\n";
        assert_eq!(find_components(body), vec!["RandomKey", "UUIDGenerator"]);
    }

    #[test]
    fn tags_in_code_are_ignored() {
        let body = "Use `<UUIDGenerator />` in markdown.\n\n```html\n<QRcode />\n```\n";
        assert!(find_components(body).is_empty());
    }

    #[test]
    fn extract_title_uses_first_h1() {
        assert_eq!(
            extract_title("intro\n\n# UUID随机生成器\n\n# Second"),
            Some("UUID随机生成器".to_string())
        );
        assert_eq!(extract_title("## only h2"), None);
    }

    #[test]
    fn plain_text_skips_markup() {
        let text = plain_text("# Title\n\nSome **bold** text.\n\n<QRcode />\n");
        assert_eq!(text, "Title Some bold text.");
    }

    #[test]
    fn word_count_counts_cjk_per_character() {
        assert_eq!(word_count("二维码 generator v2"), 5);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("hello, world"), 2);
    }

    #[test]
    fn render_mounts_block_components() {
        let config = SiteConfig::default();
        let html = render_markdown("# UUID\n\n<UUIDGenerator />\n", &config, &mut echo);
        assert!(html.contains("[UUIDGenerator]"));
        assert!(!html.contains("<UUIDGenerator"));
    }

    #[test]
    fn render_drops_closing_tags() {
        let config = SiteConfig::default();
        let html = render_markdown("<QRcode></QRcode>\n", &config, &mut echo);
        assert!(html.contains("[QRcode]"));
        assert!(!html.contains("</QRcode>"));
    }

    #[test]
    fn render_resolves_internal_links() {
        let mut config = SiteConfig::default();
        config.base = "/tool/".into();
        let html = render_markdown("[uuid](/uuid.md) [gh](https://github.com)", &config, &mut echo);
        assert!(html.contains(r#"href="/tool/uuid""#));
        assert!(html.contains(r#"href="https://github.com""#));
    }

    #[test]
    fn render_lazy_images() {
        let config = SiteConfig::default();
        let html = render_markdown("![logo *here*](/logo.png \"Logo\")", &config, &mut echo);
        assert!(html.contains(r#"<img src="/logo.png" alt="logo here" title="Logo" loading="lazy">"#));
    }

    #[test]
    fn image_paths_get_base_without_lazy_loading() {
        let mut config = SiteConfig::default();
        config.base = "/tool/".into();
        config.markdown.lazy_images = false;
        let html = render_markdown("![logo](/logo.png) ![cdn](https://cdn.example/x.png)", &config, &mut echo);
        assert!(html.contains(r#"src="/tool/logo.png""#));
        assert!(html.contains(r#"src="https://cdn.example/x.png""#));
        assert!(!html.contains("loading="));

        config.markdown.lazy_images = true;
        let html = render_markdown("![logo](/logo.png)", &config, &mut echo);
        assert!(html.contains(r#"src="/tool/logo.png""#));
    }

    #[test]
    fn render_code_blocks_with_line_numbers() {
        let config = SiteConfig::default();
        let html = render_markdown("```json\n{\"a\": \"<b>\"}\n```\n", &config, &mut echo);
        assert!(html.contains(r#"<pre class="line-numbers" data-lang="json"><code class="language-json">"#));
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("</code></pre>"));
    }

    #[test]
    fn render_plain_code_blocks_without_line_numbers() {
        let mut config = SiteConfig::default();
        config.markdown.line_numbers = false;
        let html = render_markdown("```rust\nfn main() {}\n```\n", &config, &mut echo);
        assert!(!html.contains("line-numbers"));
        assert!(html.contains("language-rust"));
    }
}
