// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod card;
pub mod config;
pub mod error;
pub mod feed;
pub mod filter;
pub mod insight;
pub mod logging;
pub mod metrics;
pub mod stats;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::feed::types::{JobPosting, WorkType};
pub use crate::feed::{FeedStore, IngestOutcome, SharedFeed};
pub use crate::filter::{matches, visible, FilterCriteria};

use crate::config::{FeedConfig, InsightConfig};
use crate::feed::scheduler::FeedSchedulerCfg;

/// Build the full application router from on-disk/env configuration, with
/// the arrival simulation running. Must be called inside a Tokio runtime.
pub fn app() -> anyhow::Result<axum::Router> {
    let feed_cfg = FeedConfig::load_default()?;
    let insight_cfg = InsightConfig::load_default()?;
    app_with(&feed_cfg, &insight_cfg)
}

/// Same as [`app`] with configuration already loaded.
pub fn app_with(
    feed_cfg: &FeedConfig,
    insight_cfg: &InsightConfig,
) -> anyhow::Result<axum::Router> {
    tracing::info!(?feed_cfg, ?insight_cfg, "configuration loaded");

    let state = AppState::from_config(feed_cfg, insight_cfg)?
        .start_simulation(FeedSchedulerCfg::from(feed_cfg));
    Ok(router(state))
}
