// src/card.rs
//! Per-posting display facts derived at read time.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::feed::types::{Currency, JobPosting, PostingStatus};

/// Postings extracted within this window are flagged LIVE.
pub const DEFAULT_LIVE_WINDOW_SECS: i64 = 30;

#[derive(Debug, Clone, Serialize)]
pub struct JobCard {
    #[serde(flatten)]
    pub posting: JobPosting,
    pub salary_label: String,
    pub age_label: String,
    pub live: bool,
    pub merged_duplicates: usize,
    pub effective_status: PostingStatus,
}

impl JobCard {
    pub fn new(posting: JobPosting, now: DateTime<Utc>, live_window: Duration) -> Self {
        let age = now - posting.dates.extracted;
        Self {
            salary_label: salary_label(
                posting.salary.min,
                posting.salary.max,
                posting.salary.currency,
            ),
            age_label: age_label(age),
            live: age < live_window,
            merged_duplicates: posting.sources.len().saturating_sub(1),
            effective_status: posting.effective_status(now),
            posting,
        }
    }
}

/// "৳30k - 50k" for BDT, "$min - $max" otherwise.
pub fn salary_label(min: u64, max: u64, currency: Currency) -> String {
    match currency {
        Currency::BDT => format!("৳{}k - {}k", round_thousands(min), round_thousands(max)),
        Currency::USD => format!("${min} - ${max}"),
    }
}

fn round_thousands(v: u64) -> u64 {
    (v + 500) / 1000
}

/// "42s ago", "5m ago", "3h ago". Negative ages (clock skew) read as "0s ago".
pub fn age_label(age: Duration) -> String {
    let secs = age.num_seconds().max(0);
    if secs < 60 {
        return format!("{secs}s ago");
    }
    let mins = secs / 60;
    if mins < 60 {
        return format!("{mins}m ago");
    }
    format!("{}h ago", mins / 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salary_labels() {
        assert_eq!(salary_label(30_000, 50_000, Currency::BDT), "৳30k - 50k");
        assert_eq!(salary_label(1_500, 2_000, Currency::USD), "$1500 - $2000");
    }

    #[test]
    fn age_labels_step_through_units() {
        assert_eq!(age_label(Duration::seconds(-4)), "0s ago");
        assert_eq!(age_label(Duration::seconds(59)), "59s ago");
        assert_eq!(age_label(Duration::seconds(60)), "1m ago");
        assert_eq!(age_label(Duration::minutes(59)), "59m ago");
        assert_eq!(age_label(Duration::minutes(61)), "1h ago");
        assert_eq!(age_label(Duration::hours(30)), "30h ago");
    }

    #[test]
    fn live_flag_and_expiry_follow_the_clock() {
        use crate::feed::clock::{Clock, FixedClock};
        use crate::feed::generator::JobGenerator;

        let clock = FixedClock::new(Utc::now());
        let posting = JobGenerator::seeded(4, &clock).generate();
        let window = Duration::seconds(DEFAULT_LIVE_WINDOW_SECS);

        let fresh = JobCard::new(posting.clone(), clock.now(), window);
        assert!(fresh.live);
        assert_eq!(fresh.effective_status, PostingStatus::Active);
        assert_eq!(fresh.merged_duplicates, posting.sources.len() - 1);

        clock.advance(Duration::seconds(DEFAULT_LIVE_WINDOW_SECS));
        assert!(!JobCard::new(posting.clone(), clock.now(), window).live);

        clock.set(posting.dates.expires);
        let stale = JobCard::new(posting.clone(), clock.now(), window);
        assert_eq!(stale.effective_status, PostingStatus::Expired);
        assert_eq!(stale.posting.status, PostingStatus::Active);
    }
}
