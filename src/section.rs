// src/section.rs
//! Per-section paging state ("もっと見る").
//!
//! Transitions are pure: every method returns a new state and leaves
//! rendering to the caller.

use std::sync::Arc;

use crate::feed::{Item, SectionId};
use crate::render::render_cards;

/// Cards revealed initially and per click.
pub const DEFAULT_PAGE_SIZE: usize = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct SectionViewState {
    pub id: SectionId,
    items: Arc<[Item]>,
    shown: usize,
    page_size: usize,
}

impl SectionViewState {
    /// First page of a section. `None` when there is nothing to render, in
    /// which case the page keeps its static placeholder.
    pub fn initial(id: SectionId, items: impl Into<Arc<[Item]>>, page_size: usize) -> Option<Self> {
        let items: Arc<[Item]> = items.into();
        if items.is_empty() {
            return None;
        }
        let page_size = page_size.max(1);
        Some(Self {
            id,
            shown: page_size.min(items.len()),
            items,
            page_size,
        })
    }

    /// State with an explicit shown count, clamped into `[initial, total]`.
    pub fn at(
        id: SectionId,
        items: impl Into<Arc<[Item]>>,
        shown: usize,
        page_size: usize,
    ) -> Option<Self> {
        let mut st = Self::initial(id, items, page_size)?;
        st.shown = shown.clamp(st.shown, st.items.len());
        Some(st)
    }

    /// One click: reveal the next page, capped at the item count.
    pub fn reveal_more(&self) -> Self {
        Self {
            shown: self.shown.saturating_add(self.page_size).min(self.items.len()),
            ..self.clone()
        }
    }

    pub fn shown(&self) -> usize {
        self.shown
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn visible(&self) -> &[Item] {
        &self.items[..self.shown]
    }

    pub fn has_more(&self) -> bool {
        self.shown < self.items.len()
    }

    /// Whether the section ever needs a reveal button.
    pub fn wants_button(&self) -> bool {
        self.items.len() > self.page_size
    }

    pub fn render(&self) -> String {
        render_cards(self.visible())
    }
}
