//! Insight fetcher: a short generative-AI blurb per posting.
//!
//! The fetcher never fails towards its caller: every `InsightError` maps to a
//! fixed human-readable message. `InsightService` adds the per-posting cache;
//! the first answer for a posting id is kept and the provider is not asked again.

pub mod gemini;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell as SyncOnceCell;
use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::config::insight::InsightConfig;
use crate::feed::types::{Currency, JobPosting};

pub use gemini::GeminiProvider;

pub const UNAVAILABLE_MESSAGE: &str =
    "AI Service Unavailable: API key missing. Please configure GEMINI_API_KEY.";
pub const FAILURE_MESSAGE: &str = "Failed to analyze job posting. Please try again later.";
pub const EMPTY_MESSAGE: &str = "Could not generate insight.";

/// Forces the mock provider regardless of config (tests/local runs).
pub const ENV_INSIGHT_TEST_MODE: &str = "INSIGHT_TEST_MODE";

fn ensure_metrics_described() {
    static ONCE: SyncOnceCell<()> = SyncOnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "insight_requests_total",
            "Insight fetches by outcome (ok, unavailable, failed, empty)."
        );
        describe_counter!(
            "insight_cache_hits_total",
            "Insight requests answered from the per-posting cache."
        );
    });
}

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("no API credential configured")]
    MissingKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("provider returned empty content")]
    Empty,
}

/// Fields of a posting sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsightRequest {
    pub title: String,
    pub company: String,
    pub company_tags: Vec<String>,
    pub salary_min: u64,
    pub salary_max: u64,
    pub currency: Currency,
    pub area: String,
    pub city: String,
}

impl From<&JobPosting> for InsightRequest {
    fn from(p: &JobPosting) -> Self {
        Self {
            title: p.title.clone(),
            company: p.company.name.clone(),
            company_tags: p.company.tags.clone(),
            salary_min: p.salary.min,
            salary_max: p.salary.max,
            currency: p.salary.currency,
            area: p.location.area.clone(),
            city: p.location.city.clone(),
        }
    }
}

impl InsightRequest {
    pub fn prompt(&self) -> String {
        format!(
            "Analyze this job posting for the Bangladeshi market context.\n\n\
             Job Title: {}\n\
             Company: {} ({})\n\
             Salary: {} - {} {:?}\n\
             Location: {}, {}\n\n\
             Provide a 2-sentence insight about whether this is a competitive offer \
             for a Senior Engineer in Dhaka and highlight one key pro of the company.\n\
             Keep it professional and concise.",
            self.title,
            self.company,
            self.company_tags.join(", "),
            self.salary_min,
            self.salary_max,
            self.currency,
            self.area,
            self.city,
        )
    }
}

/// Short digest of a prompt for logs; the prompt itself is never logged.
pub(crate) fn prompt_digest(prompt: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(prompt.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[async_trait]
pub trait InsightProvider: Send + Sync {
    async fn generate(&self, req: &InsightRequest) -> Result<String, InsightError>;
    fn name(&self) -> &'static str;
    /// False when no credential is available; the fetcher then skips the call.
    fn is_configured(&self) -> bool {
        true
    }
}

pub type DynInsightProvider = Arc<dyn InsightProvider>;

/// Used when insights are disabled or no key is configured.
pub struct DisabledProvider;

#[async_trait]
impl InsightProvider for DisabledProvider {
    async fn generate(&self, _req: &InsightRequest) -> Result<String, InsightError> {
        Err(InsightError::MissingKey)
    }
    fn name(&self) -> &'static str {
        "disabled"
    }
    fn is_configured(&self) -> bool {
        false
    }
}

/// Deterministic provider for tests/local runs. Counts its calls.
#[derive(Default)]
pub struct MockProvider {
    pub fixed: Option<String>,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            fixed: Some(text.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InsightProvider for MockProvider {
    async fn generate(&self, req: &InsightRequest) -> Result<String, InsightError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.fixed.clone().unwrap_or_else(|| {
            format!(
                "{} at {} pays {}-{} {:?}; a solid offer for {}. (mock)",
                req.title, req.company, req.salary_min, req.salary_max, req.currency, req.city
            )
        }))
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Factory: build a provider according to config and environment.
///
/// * `INSIGHT_TEST_MODE=mock` or provider "mock" ⇒ mock provider.
/// * Disabled config or no credential ⇒ disabled provider.
/// * Otherwise the Gemini provider.
pub fn build_provider(cfg: &InsightConfig) -> anyhow::Result<DynInsightProvider> {
    let test_mock = std::env::var(ENV_INSIGHT_TEST_MODE)
        .map(|v| v == "mock")
        .unwrap_or(false);
    if test_mock || cfg.provider == "mock" {
        return Ok(Arc::new(MockProvider::default()));
    }
    if !cfg.enabled || !cfg.has_credential() {
        return Ok(Arc::new(DisabledProvider));
    }
    Ok(Arc::new(GeminiProvider::from_config(cfg)?))
}

/// One insight for `posting`. Never fails: problems become fixed messages.
pub async fn fetch_insight(provider: &dyn InsightProvider, posting: &JobPosting) -> String {
    ensure_metrics_described();

    if !provider.is_configured() {
        counter!("insight_requests_total", "outcome" => "unavailable").increment(1);
        return UNAVAILABLE_MESSAGE.to_string();
    }

    let req = InsightRequest::from(posting);
    match provider.generate(&req).await {
        Ok(text) if !text.trim().is_empty() => {
            counter!("insight_requests_total", "outcome" => "ok").increment(1);
            text.trim().to_string()
        }
        Ok(_) | Err(InsightError::Empty) => {
            counter!("insight_requests_total", "outcome" => "empty").increment(1);
            EMPTY_MESSAGE.to_string()
        }
        Err(InsightError::MissingKey) => {
            counter!("insight_requests_total", "outcome" => "unavailable").increment(1);
            UNAVAILABLE_MESSAGE.to_string()
        }
        Err(e) => {
            warn!(
                target: "insight",
                error = %e,
                provider = provider.name(),
                posting = %posting.id,
                prompt = %prompt_digest(&req.prompt()),
                "insight call failed"
            );
            counter!("insight_requests_total", "outcome" => "failed").increment(1);
            FAILURE_MESSAGE.to_string()
        }
    }
}

/// Result of `InsightService::insight_for`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insight {
    pub id: String,
    pub insight: String,
    pub cached: bool,
}

/// Provider plus a one-answer-per-posting cache. Concurrent requests for the
/// same posting share a single in-flight call.
pub struct InsightService {
    provider: DynInsightProvider,
    cache: Mutex<HashMap<String, Arc<OnceCell<String>>>>,
}

impl InsightService {
    pub fn new(provider: DynInsightProvider) -> Self {
        Self {
            provider,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub async fn insight_for(&self, posting: &JobPosting) -> Insight {
        let cell = {
            let mut cache = self.cache.lock();
            cache.entry(posting.id.clone()).or_default().clone()
        };

        // Only the caller whose init closure runs sees `fetched`.
        let fetched = AtomicBool::new(false);
        let (flag, provider) = (&fetched, self.provider.as_ref());
        let text = cell
            .get_or_init(|| async move {
                flag.store(true, Ordering::Relaxed);
                info!(
                    target: "insight",
                    posting = %posting.id,
                    provider = provider.name(),
                    "fetching insight"
                );
                fetch_insight(provider, posting).await
            })
            .await
            .clone();

        let cached = !fetched.load(Ordering::Relaxed);
        if cached {
            counter!("insight_cache_hits_total").increment(1);
        }

        Insight {
            id: posting.id.clone(),
            insight: text,
            cached,
        }
    }

    pub fn cached(&self, id: &str) -> Option<String> {
        self.cache.lock().get(id).and_then(|c| c.get().cloned())
    }

    /// Drop cached answers for postings no longer in the feed.
    pub fn forget<S: AsRef<str>>(&self, ids: &[S]) {
        if ids.is_empty() {
            return;
        }
        let mut cache = self.cache.lock();
        for id in ids {
            cache.remove(id.as_ref());
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }
}
