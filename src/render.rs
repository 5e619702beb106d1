// src/render.rs
//! HTML fragments for the highlight card, section cards and the empty state.

use std::borrow::Cow;

use crate::feed::{Highlight, Item, SourceLink};

/// Shown in the highlight container when the feed could not be loaded.
pub const EMPTY_STATE_HTML: &str = "<div class=\"highlight-card\"><h2>本日の更新はまだありません</h2><p>しばらくしてから再読み込みしてください。</p></div>";

pub const STAR_SLOTS: usize = 5;
const FILLED_STAR: char = '★';
const EMPTY_STAR: char = '☆';

/// Escape `&`, `<`, `>` and `"`. Everything else (backslash included) passes through.
pub fn escape(s: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(s)
}

/// Five-glyph rating. Out-of-range counts are clamped into `0..=5`.
pub fn star_rating(stars: i64) -> String {
    let filled = stars.clamp(0, STAR_SLOTS as i64) as usize;
    let mut out = String::with_capacity(STAR_SLOTS * FILLED_STAR.len_utf8());
    out.extend(std::iter::repeat(FILLED_STAR).take(filled));
    out.extend(std::iter::repeat(EMPTY_STAR).take(STAR_SLOTS - filled));
    out
}

fn source_anchor(url: &str, label: &str) -> String {
    format!(
        "<a class=\"source-link\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
        escape(url),
        label
    )
}

fn highlight_source(s: &SourceLink) -> String {
    let name = if s.name.is_empty() { "link" } else { &s.name };
    source_anchor(&s.url, &format!("出典: {}", escape(name)))
}

pub fn render_highlight(h: &Highlight) -> String {
    let sources: String = h.sources.iter().map(highlight_source).collect();
    format!(
        "<div class=\"highlight-card\">\n  <span class=\"category\">{}</span>\n  <span class=\"stars\">{}</span>\n  <h2>{}</h2>\n  <p>{}</p>\n  <div class=\"meta\">{}</div>\n</div>",
        escape(&h.category),
        star_rating(h.stars),
        escape(&h.title),
        escape(&h.summary),
        sources
    )
}

pub fn render_card(it: &Item) -> String {
    let date = if it.date.is_empty() {
        String::new()
    } else {
        format!("<span>{}</span>", escape(&it.date))
    };
    let link = match &it.source {
        Some(src) if !src.url.is_empty() => {
            let label = if src.name.is_empty() { "リンク" } else { "出典" };
            source_anchor(&src.url, label)
        }
        _ => String::new(),
    };
    format!(
        "<article class=\"card\">\n  <span class=\"category\">{}</span>\n  <span class=\"stars\">{}</span>\n  <h3>{}</h3>\n  <p>{}</p>\n  <div class=\"meta\">{}{}</div>\n</article>",
        escape(&it.category),
        star_rating(it.stars),
        escape(&it.title),
        escape(&it.blurb),
        date,
        link
    )
}

/// Cards for a slice, concatenated with no separator.
pub fn render_cards(items: &[Item]) -> String {
    items.iter().map(render_card).collect()
}
