//! Fetch the configured feed once and print the rendered page to stdout.
//!
//! `--expand` keeps clicking every section's reveal button until all cards show.

use news_feed_renderer::api::PAGE_TITLE;
use news_feed_renderer::fetch::source_from_config;
use news_feed_renderer::{init_feed, load_feed, telemetry, RendererConfig, SectionId, StaticPage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let expand = std::env::args().skip(1).any(|a| a == "--expand");

    let cfg = RendererConfig::load_default()?;
    let source = source_from_config(&cfg)?;
    let feed = load_feed(source.as_ref()).await;

    let mut page = StaticPage::standard();
    let mut view = init_feed(&mut page, feed.as_ref(), cfg.page_size);

    if expand {
        for id in SectionId::ALL {
            while view.reveal_more(&mut page, id) {}
        }
    }

    for s in view.sections() {
        tracing::info!(target: "feed", section = %s.id, shown = s.shown(), total = s.total(), "snapshot section");
    }

    println!("{}", page.to_html(PAGE_TITLE));
    Ok(())
}
