// src/api.rs
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::config::RendererConfig;
use crate::feed::SectionId;
use crate::fetch::{load_feed, source_from_config, FeedSource};
use crate::page::{init_feed, StaticPage};
use crate::render::EMPTY_STATE_HTML;
use crate::section::SectionViewState;

pub const PAGE_TITLE: &str = "AIニュース";

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn FeedSource>,
    pub page_size: usize,
    pub site_dir: PathBuf,
}

impl AppState {
    pub fn new(source: Arc<dyn FeedSource>, page_size: usize, site_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            page_size,
            site_dir: site_dir.into(),
        }
    }

    pub fn from_config(cfg: &RendererConfig) -> anyhow::Result<Self> {
        Ok(Self::new(
            source_from_config(cfg)?,
            cfg.page_size,
            cfg.site_dir.clone(),
        ))
    }
}

pub fn router(state: AppState) -> Router {
    let news_dir = ServeDir::new(state.site_dir.join("news"));
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/", get(index))
        .route("/sections/{id}", get(section_slice))
        .route("/sections/{id}/more", get(section_more))
        .nest_service("/news", news_dir)
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let feed = load_feed(state.source.as_ref()).await;
    let mut page = StaticPage::standard();
    let view = init_feed(&mut page, feed.as_ref(), state.page_size);
    counter!("feed_render_total").increment(1);
    tracing::debug!(target: "api", sections = view.sections().len(), "page rendered");

    (
        [(header::CACHE_CONTROL, "no-store")],
        Html(page.to_html(PAGE_TITLE)),
    )
}

#[derive(Debug, Deserialize)]
struct ShownQuery {
    shown: Option<usize>,
}

/// One section's visible cards plus what the reveal button should do next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSlice {
    pub id: SectionId,
    pub shown: usize,
    pub total: usize,
    pub has_more: bool,
    pub html: String,
}

impl SectionSlice {
    fn empty(id: SectionId) -> Self {
        Self {
            id,
            shown: 0,
            total: 0,
            has_more: false,
            html: String::new(),
        }
    }
}

impl From<&SectionViewState> for SectionSlice {
    fn from(s: &SectionViewState) -> Self {
        Self {
            id: s.id,
            shown: s.shown(),
            total: s.total(),
            has_more: s.has_more(),
            html: s.render(),
        }
    }
}

async fn section_state(
    state: &AppState,
    raw_id: &str,
    shown: Option<usize>,
) -> Result<(SectionId, Option<SectionViewState>), Response> {
    let Some(id) = SectionId::parse(raw_id) else {
        return Err((StatusCode::NOT_FOUND, format!("unknown section '{raw_id}'")).into_response());
    };
    let Some(feed) = load_feed(state.source.as_ref()).await else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CACHE_CONTROL, "no-store")],
            Html(EMPTY_STATE_HTML),
        )
            .into_response());
    };
    let items = feed.section(id).to_vec();
    let st = match shown {
        Some(n) => SectionViewState::at(id, items, n, state.page_size),
        None => SectionViewState::initial(id, items, state.page_size),
    };
    Ok((id, st))
}

fn slice_response(id: SectionId, st: Option<&SectionViewState>) -> Response {
    let body = st.map(SectionSlice::from).unwrap_or_else(|| SectionSlice::empty(id));
    ([(header::CACHE_CONTROL, "no-store")], Json(body)).into_response()
}

async fn section_slice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<ShownQuery>,
) -> Response {
    match section_state(&state, &id, q.shown).await {
        Ok((id, st)) => slice_response(id, st.as_ref()),
        Err(resp) => resp,
    }
}

async fn section_more(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<ShownQuery>,
) -> Response {
    match section_state(&state, &id, q.shown).await {
        Ok((id, st)) => {
            let next = st.map(|s| s.reveal_more());
            if next.is_some() {
                counter!("feed_reveal_total").increment(1);
            }
            slice_response(id, next.as_ref())
        }
        Err(resp) => resp,
    }
}
