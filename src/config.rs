// src/config.rs
use anyhow::{anyhow, Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::section::DEFAULT_PAGE_SIZE;

pub const ENV_CONFIG_PATH: &str = "FEED_CONFIG_PATH";
pub const ENV_FEED_URL: &str = "FEED_URL";
pub const ENV_BASE_URL: &str = "FEED_BASE_URL";
pub const ENV_PAGE_SIZE: &str = "FEED_PAGE_SIZE";

pub const DEFAULT_FEED_URL: &str = "news/latest.json";
const DEFAULT_USER_AGENT: &str = concat!("news-feed-renderer/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Absolute http(s) URL, or a path relative to `base_url` / `site_dir`.
    pub feed_url: String,
    pub base_url: Option<String>,
    pub page_size: usize,
    /// No timeout when unset.
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
    /// Root of the static site; also served under `/news`.
    pub site_dir: PathBuf,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            base_url: None,
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            site_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedLocation {
    Http(Url),
    File(PathBuf),
}

impl RendererConfig {
    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading renderer config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        Ok(parse_config(&content, ext.as_str())?.sanitized())
    }

    /// Load using env var + fallbacks, then apply env overrides:
    /// 1) $FEED_CONFIG_PATH
    /// 2) config/renderer.toml
    /// 3) config/renderer.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("FEED_CONFIG_PATH points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else if Path::new("config/renderer.toml").exists() {
            Self::load_from(Path::new("config/renderer.toml"))?
        } else if Path::new("config/renderer.json").exists() {
            Self::load_from(Path::new("config/renderer.json"))?
        } else {
            Self::default()
        };
        cfg.apply_env_overrides();
        Ok(cfg.sanitized())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var(ENV_FEED_URL) {
            if !v.trim().is_empty() {
                self.feed_url = v.trim().to_string();
            }
        }
        if let Ok(v) = std::env::var(ENV_BASE_URL) {
            let v = v.trim();
            self.base_url = (!v.is_empty()).then(|| v.to_string());
        }
        if let Ok(v) = std::env::var(ENV_PAGE_SIZE) {
            match v.trim().parse::<usize>() {
                Ok(n) => self.page_size = n,
                Err(_) => tracing::warn!(target: "feed", value = %v, "ignoring invalid FEED_PAGE_SIZE"),
            }
        }
    }

    fn sanitized(mut self) -> Self {
        if self.page_size == 0 {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        if self.feed_url.trim().is_empty() {
            self.feed_url = DEFAULT_FEED_URL.to_string();
        }
        self
    }

    /// Resolve where the feed lives: absolute URL, relative URL joined onto
    /// `base_url`, or a file under `site_dir`.
    pub fn feed_location(&self) -> Result<FeedLocation> {
        if let Ok(url) = Url::parse(&self.feed_url) {
            return match url.scheme() {
                "http" | "https" => Ok(FeedLocation::Http(url)),
                "file" => url
                    .to_file_path()
                    .map(FeedLocation::File)
                    .map_err(|_| anyhow!("invalid file url: {}", self.feed_url)),
                other => Err(anyhow!("unsupported feed url scheme: {other}")),
            };
        }
        if let Some(base) = self.base_url.as_deref() {
            let base = Url::parse(base).with_context(|| format!("parsing base_url {base}"))?;
            let url = base
                .join(&self.feed_url)
                .with_context(|| format!("joining {} onto {base}", self.feed_url))?;
            return Ok(FeedLocation::Http(url));
        }
        Ok(FeedLocation::File(self.site_dir.join(&self.feed_url)))
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<RendererConfig> {
    match hint_ext {
        "toml" => toml::from_str(s).context("parsing renderer config toml"),
        "json" => serde_json::from_str(s).context("parsing renderer config json"),
        _ => serde_json::from_str(s)
            .or_else(|_| toml::from_str(s))
            .map_err(|_| anyhow!("unsupported renderer config format")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = parse_config("page_size = 0\ntimeout_secs = 5", "toml")
            .unwrap()
            .sanitized();
        assert_eq!(cfg.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(cfg.timeout_secs, Some(5));
        assert_eq!(cfg.feed_url, DEFAULT_FEED_URL);
    }

    #[test]
    fn unknown_extension_tries_json_then_toml() {
        let j = parse_config(r#"{"page_size": 6}"#, "").unwrap();
        assert_eq!(j.page_size, 6);
        let t = parse_config("page_size = 7", "conf").unwrap();
        assert_eq!(t.page_size, 7);
        assert!(parse_config("page_size: [", "").is_err());
    }

    #[test]
    fn feed_location_resolution() {
        let mut cfg = RendererConfig::default();
        assert_eq!(
            cfg.feed_location().unwrap(),
            FeedLocation::File(PathBuf::from("./news/latest.json"))
        );

        cfg.base_url = Some("https://news.example.com/site/".into());
        assert_eq!(
            cfg.feed_location().unwrap(),
            FeedLocation::Http(Url::parse("https://news.example.com/site/news/latest.json").unwrap())
        );

        cfg.feed_url = "http://other.example/feed.json".into();
        assert!(matches!(cfg.feed_location().unwrap(), FeedLocation::Http(u) if u.host_str() == Some("other.example")));

        cfg.feed_url = "ftp://x/y.json".into();
        assert!(cfg.feed_location().is_err());
    }
}
