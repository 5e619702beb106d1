// src/telemetry.rs
use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the tracing subscriber. Safe to call more than once (and next to
/// shuttle's own subscriber): later calls are no-ops.
///
/// `RUST_LOG` wins when set; `FEED_LOG_JSON=1` switches to JSON lines.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("feed=info,warn"));
    let json = std::env::var("FEED_LOG_JSON").ok().as_deref() == Some("1");

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder for this process.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        crate::fetch::ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Process-wide instance; the recorder can only be installed once.
    pub fn global() -> Result<&'static Metrics> {
        static METRICS: OnceCell<Metrics> = OnceCell::new();
        METRICS.get_or_try_init(Self::init)
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
