// src/feed/scheduler.rs
use std::time::Duration;

use metrics::{counter, gauge};
use rand::Rng;
use tokio::task::JoinHandle;

use crate::config::feed::FeedConfig;
use crate::feed::clock::Clock;
use crate::feed::generator::JobGenerator;
use crate::feed::{IngestOutcome, SharedFeed};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeedSchedulerCfg {
    pub tick_min: Duration,
    pub tick_max: Duration,
}

impl Default for FeedSchedulerCfg {
    fn default() -> Self {
        Self {
            tick_min: Duration::from_millis(4_000),
            tick_max: Duration::from_millis(8_000),
        }
    }
}

impl From<&FeedConfig> for FeedSchedulerCfg {
    fn from(cfg: &FeedConfig) -> Self {
        Self {
            tick_min: Duration::from_millis(cfg.tick_min_ms),
            tick_max: Duration::from_millis(cfg.tick_max_ms),
        }
    }
}

/// Uniform delay in `[tick_min, tick_max]`, drawn fresh every cycle.
pub fn next_delay<R: Rng>(rng: &mut R, cfg: &FeedSchedulerCfg) -> Duration {
    let lo = cfg.tick_min.as_millis() as u64;
    let hi = (cfg.tick_max.as_millis() as u64).max(lo);
    Duration::from_millis(rng.random_range(lo..=hi))
}

/// Handle to the running feed task. The task is aborted on `shutdown` or drop,
/// so no ticks outlive the owner.
#[derive(Debug)]
pub struct FeedScheduler {
    handle: Option<JoinHandle<()>>,
}

impl FeedScheduler {
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(h) = self.handle.take() {
            h.abort();
            tracing::info!(target: "feed", "feed scheduler stopped");
        }
    }
}

impl Drop for FeedScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawn the simulated arrival loop: sleep a random delay, generate one
/// posting, ingest it. `on_ingest` runs after each ingest with the lock released.
pub fn spawn_feed_scheduler<R, C, F>(
    cfg: FeedSchedulerCfg,
    feed: SharedFeed,
    mut generator: JobGenerator<R, C>,
    mut on_ingest: F,
) -> FeedScheduler
where
    R: Rng + Send + 'static,
    C: Clock + 'static,
    F: FnMut(&IngestOutcome) + Send + 'static,
{
    let handle = tokio::spawn(async move {
        loop {
            let delay = next_delay(generator.rng_mut(), &cfg);
            tokio::time::sleep(delay).await;

            let posting = generator.generate();
            let title = posting.title.clone();
            let company = posting.company.name.clone();

            let (outcome, size) = {
                let mut guard = feed.write();
                let outcome = guard.ingest(posting);
                (outcome, guard.len())
            };

            counter!("feed_ticks_total").increment(1);
            gauge!("feed_last_tick_ts").set(generator.clock().now().timestamp() as f64);

            tracing::info!(
                target: "feed",
                %title,
                %company,
                size,
                evicted = outcome.evicted().len(),
                delay_ms = delay.as_millis() as u64,
                "feed tick"
            );

            on_ingest(&outcome);
        }
    });

    FeedScheduler {
        handle: Some(handle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn delays_stay_within_configured_range() {
        let cfg = FeedSchedulerCfg::default();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..1_000 {
            let d = next_delay(&mut rng, &cfg);
            assert!(d >= cfg.tick_min && d <= cfg.tick_max, "{d:?}");
        }
    }

    #[test]
    fn inverted_range_collapses_to_min() {
        let cfg = FeedSchedulerCfg {
            tick_min: Duration::from_millis(500),
            tick_max: Duration::from_millis(100),
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(next_delay(&mut rng, &cfg), Duration::from_millis(500));
    }
}
