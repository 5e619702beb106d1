// src/page.rs
//! Render target abstraction and the feed entry point.
//!
//! `PagePort` is the small set of containers the renderer writes into. Every
//! lookup is optional: a page without a footer simply has no footer updated.
//! `StaticPage` is the in-memory implementation used by the HTTP service,
//! the snapshot binary and the tests.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::feed::{Feed, SectionId};
use crate::footer::footer_text;
use crate::render::{escape, render_highlight, EMPTY_STATE_HTML};
use crate::section::SectionViewState;

pub const MORE_BUTTON_CLASS: &str = "more-btn";
pub const MORE_BUTTON_LABEL: &str = "もっと見る";

/// A container whose inner HTML the renderer replaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    inner_html: String,
}

impl Element {
    pub fn new(inner_html: impl Into<String>) -> Self {
        Self {
            inner_html: inner_html.into(),
        }
    }

    pub fn inner_html(&self) -> &str {
        &self.inner_html
    }

    pub fn set_inner_html(&mut self, html: impl Into<String>) {
        self.inner_html = html.into();
    }

    /// Replace contents with plain text (escaped on the way in).
    pub fn set_text_content(&mut self, text: &str) {
        self.inner_html = html_escape::encode_text(text).into_owned();
    }

    pub fn text_content(&self) -> String {
        html_escape::decode_html_entities(&self.inner_html).into_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoreButton {
    pub label: String,
    pub aria_label: String,
    pub hidden: bool,
}

impl MoreButton {
    pub fn for_section(id: SectionId) -> Self {
        Self {
            label: MORE_BUTTON_LABEL.to_string(),
            aria_label: format!("{id} をさらに表示"),
            hidden: false,
        }
    }

    fn to_html(&self, id: SectionId) -> String {
        let style = if self.hidden { " style=\"display:none\"" } else { "" };
        format!(
            "<button class=\"{MORE_BUTTON_CLASS}\" data-section=\"{id}\" aria-label=\"{}\"{style}>{}</button>",
            escape(&self.aria_label),
            escape(&self.label)
        )
    }
}

/// `#<id>` on the page: the card list plus an optional reveal button.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionContainer {
    pub card_list: Option<Element>,
    pub more_button: Option<MoreButton>,
}

impl SectionContainer {
    pub fn with_placeholder(html: impl Into<String>) -> Self {
        Self {
            card_list: Some(Element::new(html)),
            more_button: None,
        }
    }
}

pub trait PagePort {
    fn find_highlight_container(&mut self) -> Option<&mut Element>;
    fn find_section_container(&mut self, id: SectionId) -> Option<&mut SectionContainer>;
    fn find_footer(&mut self) -> Option<&mut Element>;

    fn find_section_list(&mut self, id: SectionId) -> Option<&mut Element> {
        self.find_section_container(id)
            .and_then(|c| c.card_list.as_mut())
    }
}

/// Paging state of every section that was rendered, kept for later clicks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedView {
    sections: Vec<SectionViewState>,
}

impl FeedView {
    pub fn sections(&self) -> &[SectionViewState] {
        &self.sections
    }

    pub fn section(&self, id: SectionId) -> Option<&SectionViewState> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Handle a click on a section's reveal button. Returns `false` when the
    /// click changed nothing (unknown section or already fully shown).
    pub fn reveal_more<P: PagePort + ?Sized>(&mut self, page: &mut P, id: SectionId) -> bool {
        let Some(slot) = self.sections.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        let next = slot.reveal_more();
        if next.shown() == slot.shown() {
            return false;
        }
        apply_section(page, &next);
        *slot = next;
        metrics::counter!("feed_reveal_total").increment(1);
        true
    }
}

fn sync_button(container: &mut SectionContainer, state: &SectionViewState) {
    if let Some(btn) = container.more_button.as_mut() {
        btn.hidden = !state.has_more();
    }
}

fn apply_section<P: PagePort + ?Sized>(page: &mut P, state: &SectionViewState) {
    if let Some(container) = page.find_section_container(state.id) {
        if let Some(list) = container.card_list.as_mut() {
            list.set_inner_html(state.render());
        }
        sync_button(container, state);
    }
}

/// Render a loaded feed (or the empty state when `feed` is `None`) into `page`.
pub fn init_feed<P: PagePort + ?Sized>(page: &mut P, feed: Option<&Feed>, page_size: usize) -> FeedView {
    let mut view = FeedView::default();

    let Some(feed) = feed else {
        if let Some(el) = page.find_highlight_container() {
            el.set_inner_html(EMPTY_STATE_HTML);
        }
        return view;
    };

    if let Some(h) = &feed.highlight {
        if let Some(el) = page.find_highlight_container() {
            el.set_inner_html(render_highlight(h));
        }
    }

    for id in SectionId::ALL {
        let Some(container) = page.find_section_container(id) else {
            continue;
        };
        let Some(list) = container.card_list.as_mut() else {
            continue;
        };
        // keep the static placeholder when the section has no items
        let Some(state) = SectionViewState::initial(id, feed.section(id).to_vec(), page_size) else {
            continue;
        };

        list.set_inner_html(state.render());
        if container.more_button.is_none() && state.wants_button() {
            container.more_button = Some(MoreButton::for_section(id));
        }
        sync_button(container, &state);

        debug!(
            target: "render",
            section = %id,
            shown = state.shown(),
            total = state.total(),
            "section rendered"
        );
        view.sections.push(state);
    }

    if let Some(raw) = feed.generated_at.as_deref() {
        if let Some(footer) = page.find_footer() {
            match footer_text(raw) {
                Some(text) => footer.set_text_content(&text),
                None => warn!(target: "render", generated_at = raw, "unreadable feed timestamp"),
            }
        }
    }

    view
}

/// In-memory page with the containers the renderer knows about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticPage {
    highlight: Option<Element>,
    sections: BTreeMap<SectionId, SectionContainer>,
    footer: Option<Element>,
}

pub const SECTION_PLACEHOLDER_HTML: &str =
    "<article class=\"card placeholder\"><p>ニュースを準備中です。</p></article>";

impl StaticPage {
    /// A page with no containers at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The site layout: highlight, the four sections with placeholders, footer.
    pub fn standard() -> Self {
        let mut page = Self::empty()
            .with_highlight(Element::default())
            .with_footer(Element::new("更新：-"));
        for id in SectionId::ALL {
            page = page.with_section(id, SectionContainer::with_placeholder(SECTION_PLACEHOLDER_HTML));
        }
        page
    }

    pub fn with_highlight(mut self, el: Element) -> Self {
        self.highlight = Some(el);
        self
    }

    pub fn with_section(mut self, id: SectionId, container: SectionContainer) -> Self {
        self.sections.insert(id, container);
        self
    }

    pub fn with_footer(mut self, el: Element) -> Self {
        self.footer = Some(el);
        self
    }

    pub fn highlight(&self) -> Option<&Element> {
        self.highlight.as_ref()
    }

    pub fn section(&self, id: SectionId) -> Option<&SectionContainer> {
        self.sections.get(&id)
    }

    pub fn footer(&self) -> Option<&Element> {
        self.footer.as_ref()
    }

    /// Serialize as a full HTML document.
    pub fn to_html(&self, title: &str) -> String {
        let mut body = String::new();
        if let Some(h) = &self.highlight {
            body.push_str(&format!(
                "<section class=\"highlight-section\">{}</section>\n",
                h.inner_html()
            ));
        }
        for (id, c) in &self.sections {
            body.push_str(&format!("<section id=\"{id}\">\n"));
            if let Some(list) = &c.card_list {
                body.push_str(&format!("<div class=\"card-list\">{}</div>\n", list.inner_html()));
            }
            if let Some(btn) = &c.more_button {
                body.push_str(&btn.to_html(*id));
                body.push('\n');
            }
            body.push_str("</section>\n");
        }
        if let Some(f) = &self.footer {
            body.push_str(&format!("<footer><p>{}</p></footer>\n", f.inner_html()));
        }
        format!(
            "<!DOCTYPE html>\n<html lang=\"ja\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
            escape(title),
            body
        )
    }
}

impl PagePort for StaticPage {
    fn find_highlight_container(&mut self) -> Option<&mut Element> {
        self.highlight.as_mut()
    }

    fn find_section_container(&mut self, id: SectionId) -> Option<&mut SectionContainer> {
        self.sections.get_mut(&id)
    }

    fn find_footer(&mut self) -> Option<&mut Element> {
        self.footer.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Item;

    fn feed_with(id: SectionId, n: usize) -> Feed {
        let mut f = Feed::default();
        f.sections.insert(
            id.as_str().to_string(),
            (0..n)
                .map(|i| Item {
                    title: format!("n{i}"),
                    ..Default::default()
                })
                .collect(),
        );
        f
    }

    #[test]
    fn existing_button_is_reused_and_hidden_when_not_needed() {
        let pre = SectionContainer {
            card_list: Some(Element::new("old")),
            more_button: Some(MoreButton::for_section(SectionId::Tools)),
        };
        let mut page = StaticPage::empty().with_section(SectionId::Tools, pre);
        init_feed(&mut page, Some(&feed_with(SectionId::Tools, 3)), 12);
        let c = page.section(SectionId::Tools).unwrap();
        assert!(c.more_button.as_ref().unwrap().hidden);
        assert_eq!(c.card_list.as_ref().unwrap().inner_html().matches("<article").count(), 3);
    }

    #[test]
    fn section_without_card_list_is_skipped() {
        let mut page = StaticPage::empty().with_section(SectionId::Business, SectionContainer::default());
        let view = init_feed(&mut page, Some(&feed_with(SectionId::Business, 30)), 12);
        assert!(view.sections().is_empty());
        assert_eq!(page.section(SectionId::Business), Some(&SectionContainer::default()));
    }

    #[test]
    fn text_content_is_escaped_in_markup() {
        let mut el = Element::default();
        el.set_text_content("a < b");
        assert_eq!(el.inner_html(), "a &lt; b");
        assert_eq!(el.text_content(), "a < b");
    }

    #[test]
    fn hidden_button_serializes_with_display_none() {
        let mut page = StaticPage::standard();
        let mut view = init_feed(&mut page, Some(&feed_with(SectionId::Sns, 13)), 12);
        let html = page.to_html("t");
        assert!(html.contains("aria-label=\"sns をさらに表示\">もっと見る</button>"));

        assert!(view.reveal_more(&mut page, SectionId::Sns));
        let html = page.to_html("t");
        assert!(html.contains("aria-label=\"sns をさらに表示\" style=\"display:none\">"));
    }
}
