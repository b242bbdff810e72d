//! KormoStream binary entrypoint.
//! Boots the Axum HTTP server with the simulated job feed, filtering, stats,
//! insights and Prometheus metrics.

use anyhow::Context;
use shuttle_axum::ShuttleAxum;

use kormo_stream::config::{FeedConfig, InsightConfig};
use kormo_stream::metrics::Metrics;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    kormo_stream::logging::init();

    let feed_cfg = FeedConfig::load_default().context("loading feed config")?;
    let insight_cfg = InsightConfig::load_default().context("loading insight config")?;

    // Recorder first so the initial feed gauge is captured.
    let metrics = Metrics::init(&feed_cfg).context("installing metrics recorder")?;
    let app = kormo_stream::app_with(&feed_cfg, &insight_cfg).context("building application")?;

    Ok(app.merge(metrics.router()).into())
}
