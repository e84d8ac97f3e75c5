//! `ArticleMetadata`: word count and reading time for the current page.

use crate::markdown::{plain_text, word_count};
use crate::registry::{Component, RenderContext};
use maud::{Markup, html};

/// Minutes needed to read `words` at `speed` words per minute, at least one.
pub fn reading_minutes(words: usize, speed: usize) -> usize {
    words.div_ceil(speed.max(1)).max(1)
}

pub struct ArticleMetadata;

impl Component for ArticleMetadata {
    fn render(&self, ctx: &RenderContext<'_>) -> Markup {
        let words = word_count(&plain_text(&ctx.page.body));
        let minutes = reading_minutes(words, ctx.config.tools.reading_speed);
        html! {
            div.article-metadata {
                span.word-count { "字数: " (words) }
                span.reading-time { "预计阅读: " (minutes) " 分钟" }
                span.source { "来源: " (ctx.page.source) }
            }
        }
    }
}
