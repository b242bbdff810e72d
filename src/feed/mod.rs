// src/feed/mod.rs
pub mod clock;
pub mod generator;
pub mod scheduler;
pub mod types;

use std::collections::VecDeque;
use std::sync::Arc;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use rand::Rng;

use crate::feed::clock::Clock;
use crate::feed::generator::JobGenerator;
use crate::feed::types::{JobPosting, JobSource};

/// Default bound of the live feed.
pub const DEFAULT_CAPACITY: usize = 100;

/// Feed shared between the scheduler task and request handlers.
pub type SharedFeed = Arc<RwLock<FeedStore>>;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_ingested_total", "Postings prepended to the feed.");
        describe_counter!(
            "feed_evicted_total",
            "Postings truncated off the tail of the feed."
        );
        describe_counter!(
            "feed_merged_total",
            "Postings folded into an existing entry by fingerprint."
        );
        describe_counter!("feed_ticks_total", "Scheduler ticks that produced a posting.");
        describe_gauge!("feed_size", "Postings currently held in the feed.");
        describe_gauge!(
            "feed_last_tick_ts",
            "Unix ts when the feed scheduler last ingested."
        );
    });
}

/// What `FeedStore::ingest` did with a posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Prepended as a new entry; `evicted` lists ids truncated off the tail.
    Inserted { id: String, evicted: Vec<String> },
    /// Fingerprint already held: sources folded into `id`, which moved to the front.
    Merged { id: String, added_sources: usize },
}

impl IngestOutcome {
    pub fn evicted(&self) -> &[String] {
        match self {
            IngestOutcome::Inserted { evicted, .. } => evicted,
            IngestOutcome::Merged { .. } => &[],
        }
    }
}

/// Bounded, newest-first buffer of postings.
#[derive(Debug, Clone)]
pub struct FeedStore {
    items: VecDeque<JobPosting>,
    capacity: usize,
}

impl Default for FeedStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl FeedStore {
    /// Capacity is clamped to at least one entry. Storage grows on demand
    /// past `DEFAULT_CAPACITY`.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity,
        }
    }

    /// Replace the contents with `n` freshly generated postings, in generation order.
    pub fn initialize<R: Rng, C: Clock>(&mut self, generator: &mut JobGenerator<R, C>, n: usize) {
        self.items = generator.generate_batch(n).into_iter().collect();
        self.items.truncate(self.capacity);
        gauge!("feed_size").set(self.items.len() as f64);
    }

    pub fn with_initial<R: Rng, C: Clock>(
        capacity: usize,
        generator: &mut JobGenerator<R, C>,
        n: usize,
    ) -> Self {
        let mut store = Self::with_capacity(capacity);
        store.initialize(generator, n);
        store
    }

    pub fn into_shared(self) -> SharedFeed {
        Arc::new(RwLock::new(self))
    }

    /// Prepend `posting`, truncating the tail past capacity. A posting whose
    /// fingerprint is already held is merged into that entry instead.
    pub fn ingest(&mut self, posting: JobPosting) -> IngestOutcome {
        ensure_metrics_described();

        let held_at = self
            .items
            .iter()
            .position(|p| p.fingerprint == posting.fingerprint);

        let outcome = if let Some(mut held) = held_at.and_then(|idx| self.items.remove(idx)) {
            let added = merge_sources(&mut held.sources, posting.sources);
            let id = held.id.clone();
            self.items.push_front(held);
            counter!("feed_merged_total").increment(1);
            IngestOutcome::Merged {
                id,
                added_sources: added,
            }
        } else {
            let id = posting.id.clone();
            self.items.push_front(posting);
            let evicted: Vec<String> = if self.items.len() > self.capacity {
                self.items.drain(self.capacity..).map(|p| p.id).collect()
            } else {
                Vec::new()
            };
            counter!("feed_ingested_total").increment(1);
            counter!("feed_evicted_total").increment(evicted.len() as u64);
            IngestOutcome::Inserted { id, evicted }
        };

        gauge!("feed_size").set(self.items.len() as f64);
        outcome
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, id: &str) -> Option<&JobPosting> {
        self.items.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &JobPosting> {
        self.items.iter()
    }

    /// Owned copy, newest first. Lets callers drop the lock before filtering.
    pub fn snapshot(&self) -> Vec<JobPosting> {
        self.items.iter().cloned().collect()
    }
}

/// Append providers not yet present as non-primary entries. Returns how many were added.
fn merge_sources(held: &mut Vec<JobSource>, incoming: Vec<JobSource>) -> usize {
    let mut added = 0;
    for mut src in incoming {
        if held.iter().any(|s| s.provider == src.provider) {
            continue;
        }
        src.is_primary = false;
        held.push(src);
        added += 1;
    }
    added
}
