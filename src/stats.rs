// src/stats.rs
//! Aggregate counts over the whole feed, for the "market pulse" panel.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::feed::types::{JobPosting, WorkType};

/// Number of hubs reported in `top_hubs`.
pub const TOP_HUBS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityCount {
    pub city: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedStats {
    pub total: usize,
    pub remote: usize,
    pub mnc: usize,
    pub by_work_type: BTreeMap<WorkType, usize>,
    pub by_tag: BTreeMap<String, usize>,
    pub by_city: BTreeMap<String, usize>,
    pub top_hubs: Vec<CityCount>,
}

impl FeedStats {
    pub fn from_postings<'a, I>(postings: I) -> Self
    where
        I: IntoIterator<Item = &'a JobPosting>,
    {
        let mut s = FeedStats::default();
        for p in postings {
            s.total += 1;
            *s.by_work_type.entry(p.location.work_type).or_default() += 1;
            *s.by_city.entry(p.location.city.clone()).or_default() += 1;
            for tag in &p.company.tags {
                *s.by_tag.entry(tag.clone()).or_default() += 1;
            }
        }
        s.remote = s.by_work_type.get(&WorkType::Remote).copied().unwrap_or(0);
        s.mnc = s.by_tag.get("MNC").copied().unwrap_or(0);
        s.top_hubs = top_cities(&s.by_city, TOP_HUBS);
        s
    }
}

/// Busiest cities first; ties broken by name.
fn top_cities(by_city: &BTreeMap<String, usize>, n: usize) -> Vec<CityCount> {
    let mut v: Vec<CityCount> = by_city
        .iter()
        .map(|(city, count)| CityCount {
            city: city.clone(),
            count: *count,
        })
        .collect();
    v.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.city.cmp(&b.city)));
    v.truncate(n);
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::clock::FixedClock;
    use crate::feed::generator::JobGenerator;
    use chrono::Utc;

    #[test]
    fn counts_add_up_over_generated_feed() {
        let mut g = JobGenerator::seeded(5, FixedClock::new(Utc::now()));
        let feed = g.generate_batch(60);
        let s = FeedStats::from_postings(&feed);

        assert_eq!(s.total, 60);
        assert_eq!(s.by_work_type.values().sum::<usize>(), 60);
        assert_eq!(s.by_city.values().sum::<usize>(), 60);
        assert_eq!(
            s.remote,
            feed.iter()
                .filter(|p| p.location.work_type == WorkType::Remote)
                .count()
        );
        assert_eq!(s.mnc, feed.iter().filter(|p| p.has_tag("MNC")).count());
        assert!(s.top_hubs.len() <= TOP_HUBS);
        assert!(s.top_hubs.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn empty_feed_is_all_zero() {
        let s = FeedStats::from_postings(std::iter::empty::<&JobPosting>());
        assert_eq!(s, FeedStats::default());
    }

    #[test]
    fn work_type_keys_serialize_as_labels() {
        let mut g = JobGenerator::seeded(2, FixedClock::new(Utc::now()));
        let feed = g.generate_batch(30);
        let json = serde_json::to_value(FeedStats::from_postings(&feed)).unwrap();
        let keys: Vec<&String> = json["by_work_type"].as_object().unwrap().keys().collect();
        assert!(keys
            .iter()
            .all(|k| ["On-site", "Remote", "Hybrid"].contains(&k.as_str())));
    }
}
