// src/config/feed.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::card::DEFAULT_LIVE_WINDOW_SECS;
use crate::feed::DEFAULT_CAPACITY;

pub const ENV_FEED_CONFIG_PATH: &str = "KORMO_FEED_CONFIG_PATH";
pub const DEFAULT_FEED_CONFIG_PATH: &str = "config/feed.toml";

/// Upper bound on `capacity`.
pub const MAX_CAPACITY: usize = 10_000;
/// Upper bound on `live_window_secs` (one day).
pub const MAX_LIVE_WINDOW_SECS: i64 = 86_400;

/// Simulation knobs. Every field is optional in the TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub capacity: usize,
    pub initial_count: usize,
    pub tick_min_ms: u64,
    pub tick_max_ms: u64,
    pub live_window_secs: i64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            initial_count: 15,
            tick_min_ms: 4_000,
            tick_max_ms: 8_000,
            live_window_secs: DEFAULT_LIVE_WINDOW_SECS,
        }
    }
}

impl FeedConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: FeedConfig = toml::from_str(s).context("parsing feed config")?;
        Ok(cfg.sanitized())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading feed config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load using env var + fallbacks:
    /// 1) $KORMO_FEED_CONFIG_PATH (must exist)
    /// 2) config/feed.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_FEED_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!(
                    "{ENV_FEED_CONFIG_PATH} points to non-existent path {}",
                    pb.display()
                ));
            }
            return Self::load_from(&pb);
        }
        let default_p = PathBuf::from(DEFAULT_FEED_CONFIG_PATH);
        if default_p.exists() {
            return Self::load_from(&default_p);
        }
        Ok(Self::default())
    }

    fn sanitized(mut self) -> Self {
        self.capacity = self.capacity.clamp(1, MAX_CAPACITY);
        self.initial_count = self.initial_count.min(self.capacity);
        if self.tick_min_ms > self.tick_max_ms {
            // swap to keep a valid interval
            std::mem::swap(&mut self.tick_min_ms, &mut self.tick_max_ms);
        }
        // a zero-length tick would spin the scheduler
        self.tick_min_ms = self.tick_min_ms.max(1);
        self.tick_max_ms = self.tick_max_ms.max(self.tick_min_ms);
        self.live_window_secs = match self.live_window_secs {
            s if s < 0 => DEFAULT_LIVE_WINDOW_SECS,
            s => s.min(MAX_LIVE_WINDOW_SECS),
        };
        self
    }

    /// Falls back to the default window when the field is out of range.
    pub fn live_window(&self) -> chrono::Duration {
        chrono::Duration::try_seconds(self.live_window_secs)
            .unwrap_or_else(|| chrono::Duration::seconds(DEFAULT_LIVE_WINDOW_SECS))
    }
}
