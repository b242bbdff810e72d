use axum::{routing::get, Router};
use metrics::{describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::FeedConfig;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder and publish the feed bounds as
    /// static gauges. Fails if a recorder is already installed.
    pub fn init(feed_cfg: &FeedConfig) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;

        describe_gauge!("feed_capacity", "Configured bound of the live feed.");
        describe_gauge!(
            "feed_live_window_secs",
            "Age under which a posting is flagged LIVE."
        );
        gauge!("feed_capacity").set(feed_cfg.capacity as f64);
        gauge!("feed_live_window_secs").set(feed_cfg.live_window_secs as f64);

        Ok(Self { handle })
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// `/metrics` in the Prometheus exposition format.
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
