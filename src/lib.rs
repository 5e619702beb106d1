// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod feed;
pub mod fetch;
pub mod footer;
pub mod page;
pub mod render;
pub mod section;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::RendererConfig;
pub use crate::feed::{Feed, Highlight, Item, SectionId, SourceLink};
pub use crate::fetch::{load_feed, FeedSource};
pub use crate::page::{init_feed, FeedView, PagePort, StaticPage};
pub use crate::section::{SectionViewState, DEFAULT_PAGE_SIZE};

use axum::Router;

/// Build the full in-process app: config from disk/env, feed routes and `/metrics`.
pub async fn app() -> anyhow::Result<Router> {
    let cfg = RendererConfig::load_default()?;
    tracing::info!(
        target: "feed",
        feed_url = %cfg.feed_url,
        base_url = ?cfg.base_url,
        page_size = cfg.page_size,
        "renderer config loaded"
    );
    let state = AppState::from_config(&cfg)?;
    let metrics = telemetry::Metrics::global()?;
    Ok(router(state).merge(metrics.router()))
}
