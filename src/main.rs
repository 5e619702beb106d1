//! News feed renderer: binary entrypoint.
//! Boots the Axum HTTP server with the configured feed source.

use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    news_feed_renderer::telemetry::init_tracing();

    let router = news_feed_renderer::app().await?;
    Ok(router.into())
}
