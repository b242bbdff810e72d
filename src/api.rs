// src/api.rs
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use crate::card::JobCard;
use crate::config::{FeedConfig, InsightConfig};
use crate::error::ApiError;
use crate::feed::clock::{Clock, SystemClock};
use crate::feed::generator::JobGenerator;
use crate::feed::scheduler::{spawn_feed_scheduler, FeedScheduler, FeedSchedulerCfg};
use crate::feed::types::WorkType;
use crate::feed::{FeedStore, SharedFeed};
use crate::filter::{self, FilterCriteria, FilterOptions};
use crate::insight::{self, Insight, InsightService};
use crate::stats::FeedStats;

#[derive(Clone)]
pub struct AppState {
    pub feed: SharedFeed,
    pub insights: Arc<InsightService>,
    pub clock: Arc<dyn Clock>,
    pub live_window: chrono::Duration,
    // Held so the simulation lives exactly as long as the router's state.
    scheduler: Option<Arc<FeedScheduler>>,
}

impl AppState {
    pub fn new(
        feed: SharedFeed,
        insights: Arc<InsightService>,
        clock: Arc<dyn Clock>,
        live_window: chrono::Duration,
    ) -> Self {
        Self {
            feed,
            insights,
            clock,
            live_window,
            scheduler: None,
        }
    }

    /// Seeded feed, insight provider from config, no background ticks.
    pub fn from_config(
        feed_cfg: &FeedConfig,
        insight_cfg: &InsightConfig,
    ) -> anyhow::Result<Self> {
        let mut generator = JobGenerator::from_os_rng();
        let feed =
            FeedStore::with_initial(feed_cfg.capacity, &mut generator, feed_cfg.initial_count)
                .into_shared();
        let provider =
            insight::build_provider(insight_cfg).context("building insight provider")?;
        let insights = Arc::new(InsightService::new(provider));
        info!(
            target: "api",
            capacity = feed_cfg.capacity,
            initial = feed_cfg.initial_count,
            provider = insights.provider_name(),
            "app state ready"
        );
        Ok(Self::new(
            feed,
            insights,
            Arc::new(SystemClock),
            feed_cfg.live_window(),
        ))
    }

    /// Start the arrival simulation. Evicted postings also leave the insight cache.
    pub fn start_simulation(mut self, cfg: FeedSchedulerCfg) -> Self {
        let insights = self.insights.clone();
        let scheduler = spawn_feed_scheduler(
            cfg,
            self.feed.clone(),
            JobGenerator::from_os_rng(),
            move |outcome| insights.forget(outcome.evicted()),
        );
        self.scheduler = Some(Arc::new(scheduler));
        self
    }

    pub fn is_simulating(&self) -> bool {
        self.scheduler.as_ref().is_some_and(|s| s.is_running())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/jobs", get(list_jobs))
        .route("/jobs/{id}", get(get_job))
        .route("/jobs/{id}/insight", post(job_insight))
        .route("/stats", get(feed_stats))
        .route("/filters", get(|| async { Json(FilterOptions::default()) }))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// `GET /jobs` query. List values are comma-separated. `min_salary` stays raw
/// until `into_criteria`, which reports a malformed floor as `BAD_REQUEST`.
#[derive(Debug, Default, Deserialize)]
pub struct JobsQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub job_types: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub min_salary: Option<String>,
}

fn split_list(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

impl JobsQuery {
    pub fn into_criteria(self) -> Result<FilterCriteria, ApiError> {
        let job_types = split_list(self.job_types.as_deref())
            .map(|s| s.parse::<WorkType>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        let tags: Vec<&str> = split_list(self.tags.as_deref()).collect();
        let min_salary = match self.min_salary.as_deref().map(str::trim) {
            None | Some("") => 0,
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                ApiError::BadRequest(format!(
                    "min_salary must be a non-negative integer, got '{raw}'"
                ))
            })?,
        };

        // Search is taken verbatim: whitespace is part of the substring query.
        Ok(FilterCriteria::default()
            .with_search(self.search.unwrap_or_default())
            .with_job_types(job_types)
            .with_tags(tags)
            .with_min_salary(min_salary))
    }
}

#[derive(Serialize)]
struct JobsResp {
    total: usize,
    visible: usize,
    jobs: Vec<JobCard>,
}

async fn list_jobs(
    State(state): State<AppState>,
    Query(q): Query<JobsQuery>,
) -> Result<Json<JobsResp>, ApiError> {
    let criteria = q.into_criteria()?;
    let snapshot = state.feed.read().snapshot();
    let total = snapshot.len();

    let now = state.clock.now();
    let jobs: Vec<JobCard> = filter::visible(&snapshot, &criteria)
        .into_iter()
        .map(|p| JobCard::new(p, now, state.live_window))
        .collect();

    debug!(target: "api", total, visible = jobs.len(), ?criteria, "list jobs");
    Ok(Json(JobsResp {
        total,
        visible: jobs.len(),
        jobs,
    }))
}

async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobCard>, ApiError> {
    let posting = state
        .feed
        .read()
        .get(&id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("job '{id}'")))?;
    Ok(Json(JobCard::new(posting, state.clock.now(), state.live_window)))
}

async fn job_insight(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Insight>, ApiError> {
    let posting = state
        .feed
        .read()
        .get(&id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("job '{id}'")))?;

    let out = state.insights.insight_for(&posting).await;

    // Posting evicted while the call was in flight: answer, but keep no cache entry.
    if !state.feed.read().contains(&id) {
        state.insights.forget(&[id.as_str()]);
    }
    Ok(Json(out))
}

async fn feed_stats(State(state): State<AppState>) -> Json<FeedStats> {
    let feed = state.feed.read();
    Json(FeedStats::from_postings(feed.iter()))
}
