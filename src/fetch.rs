// src/fetch.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::{Client, Url};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{FeedLocation, RendererConfig};
use crate::feed::Feed;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_fetch_total", "Feed fetch attempts.");
        describe_counter!(
            "feed_fetch_errors_total",
            "Feed fetches that ended in the empty state."
        );
        describe_histogram!("feed_fetch_ms", "Feed fetch + decode time in milliseconds.");
        describe_counter!("feed_render_total", "Pages rendered.");
        describe_counter!("feed_reveal_total", "Reveal (show more) transitions applied.");
    });
}

#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<Feed>;
    fn describe(&self) -> String;
}

/// Fetches over HTTP with caching disabled. Any non-2xx status is an error.
pub struct HttpFeedSource {
    url: Url,
    client: Client,
}

impl HttpFeedSource {
    pub fn new(url: Url, user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(user_agent.to_string());
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().context("building feed http client")?;
        Ok(Self { url, client })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self) -> Result<Feed> {
        let resp = self
            .client
            .get(self.url.clone())
            .header(CACHE_CONTROL, "no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .with_context(|| format!("feed http get {}", self.url))?;
        let resp = resp.error_for_status().context("feed http status")?;
        let body = resp.bytes().await.context("feed http body")?;
        Feed::from_slice(&body)
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

/// Reads the feed from disk on every fetch, the way a static site serves it.
pub struct FileFeedSource {
    path: PathBuf,
}

impl FileFeedSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FeedSource for FileFeedSource {
    async fn fetch(&self) -> Result<Feed> {
        let body = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("reading feed from {}", self.path.display()))?;
        Feed::from_slice(&body)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Fixed body, for tests and offline rendering.
pub struct StaticFeedSource {
    body: String,
}

impl StaticFeedSource {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

#[async_trait]
impl FeedSource for StaticFeedSource {
    async fn fetch(&self) -> Result<Feed> {
        Feed::from_json_str(&self.body)
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

/// Build the source the configuration points at.
pub fn source_from_config(cfg: &RendererConfig) -> Result<Arc<dyn FeedSource>> {
    let source: Arc<dyn FeedSource> = match cfg.feed_location()? {
        FeedLocation::Http(url) => Arc::new(HttpFeedSource::new(
            url,
            &cfg.user_agent,
            cfg.timeout_secs.map(Duration::from_secs),
        )?),
        FeedLocation::File(path) => Arc::new(FileFeedSource::new(path)),
    };
    Ok(source)
}

/// Fetch once and collapse every failure into `None` ("feed unavailable").
pub async fn load_feed(source: &dyn FeedSource) -> Option<Feed> {
    ensure_metrics_described();
    counter!("feed_fetch_total").increment(1);

    let t0 = Instant::now();
    let res = source.fetch().await;
    histogram!("feed_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

    match res {
        Ok(feed) => {
            tracing::info!(
                target: "feed",
                source = %source.describe(),
                items = feed.item_count(),
                has_highlight = feed.highlight.is_some(),
                "feed loaded"
            );
            Some(feed)
        }
        Err(e) => {
            tracing::warn!(target: "feed", error = ?e, source = %source.describe(), "feed unavailable");
            counter!("feed_fetch_errors_total").increment(1);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_source_round_trips_and_null_collapses() {
        let ok = StaticFeedSource::new(r#"{"generated_at":"2024-01-01T00:00:00Z"}"#);
        let feed = load_feed(&ok).await.expect("feed");
        assert_eq!(feed.generated_at.as_deref(), Some("2024-01-01T00:00:00Z"));

        assert!(load_feed(&StaticFeedSource::new("null")).await.is_none());
        assert!(load_feed(&StaticFeedSource::new("{oops")).await.is_none());
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let src = FileFeedSource::new(dir.path().join("news/latest.json"));
        assert!(load_feed(&src).await.is_none());
    }
}
