// src/config/insight.rs
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf};

pub const ENV_INSIGHT_CONFIG_PATH: &str = "KORMO_INSIGHT_CONFIG_PATH";
pub const DEFAULT_INSIGHT_CONFIG_PATH: &str = "config/insight.json";

/// Checked in order when `api_key` is "ENV".
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

fn default_enabled() -> bool {
    true
}
fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_api_key() -> String {
    "ENV".to_string()
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[derive(Clone, Serialize, Deserialize)]
pub struct InsightConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// "gemini" | "mock" (case-insensitive)
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// "ENV" means: read from GEMINI_API_KEY, then API_KEY. Empty after
    /// resolution means no credential; insights report unavailability.
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl std::fmt::Debug for InsightConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsightConfig")
            .field("enabled", &self.enabled)
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key_len", &self.api_key.len())
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            provider: default_provider(),
            model: default_model(),
            api_key: default_api_key(),
            base_url: default_base_url(),
        }
    }
}

impl InsightConfig {
    pub fn from_json_str(data: &str) -> anyhow::Result<Self> {
        let cfg: InsightConfig = serde_json::from_str(data).context("parsing insight config")?;
        cfg.resolved()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading insight config from {}", path.display()))?;
        Self::from_json_str(&data)
    }

    /// $KORMO_INSIGHT_CONFIG_PATH, then config/insight.json, then defaults.
    pub fn load_default() -> anyhow::Result<Self> {
        if let Ok(p) = env::var(ENV_INSIGHT_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!(
                    "{ENV_INSIGHT_CONFIG_PATH} points to non-existent path {}",
                    pb.display()
                ));
            }
            return Self::load_from_file(pb);
        }
        let default_p = PathBuf::from(DEFAULT_INSIGHT_CONFIG_PATH);
        if default_p.exists() {
            return Self::load_from_file(default_p);
        }
        Self::default().resolved()
    }

    /// Normalize provider and resolve an "ENV" api key.
    pub fn resolved(mut self) -> anyhow::Result<Self> {
        self.provider = self.provider.trim().to_lowercase();
        match self.provider.as_str() {
            "gemini" | "mock" => {}
            other => anyhow::bail!("Unsupported insight provider in config: {other}"),
        }

        if self.api_key.trim().eq_ignore_ascii_case("env") {
            self.api_key = API_KEY_ENV_VARS
                .iter()
                .filter_map(|k| env::var(k).ok())
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty())
                .unwrap_or_default();
        }
        self.base_url = self.base_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}
