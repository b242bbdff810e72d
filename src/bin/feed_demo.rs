//! Demo that runs the simulated feed for a few fast ticks and prints the
//! filtered view plus stats to stdout.

use std::time::Duration;

use kormo_stream::feed::generator::JobGenerator;
use kormo_stream::feed::scheduler::{spawn_feed_scheduler, FeedSchedulerCfg};
use kormo_stream::stats::FeedStats;
use kormo_stream::{visible, FeedStore, FilterCriteria, WorkType};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    kormo_stream::logging::init();

    let mut generator = JobGenerator::from_os_rng();
    let feed = FeedStore::with_initial(100, &mut generator, 15).into_shared();

    let cfg = FeedSchedulerCfg {
        tick_min: Duration::from_millis(200),
        tick_max: Duration::from_millis(400),
    };
    let scheduler = spawn_feed_scheduler(cfg, feed.clone(), generator, |_| {});
    tokio::time::sleep(Duration::from_secs(2)).await;
    scheduler.shutdown();

    let snapshot = feed.read().snapshot();
    let criteria = FilterCriteria::default()
        .with_job_types([WorkType::Remote, WorkType::Hybrid])
        .with_min_salary(60_000);

    println!("feed: {} postings", snapshot.len());
    for p in visible(&snapshot, &criteria) {
        println!(
            "  {:<28} {:<26} {:>7}-{:<7} {} ({})",
            p.title,
            p.company.name,
            p.salary.min,
            p.salary.max,
            p.location.city,
            p.location.work_type
        );
    }

    let stats = FeedStats::from_postings(&snapshot);
    println!(
        "remote={} mnc={} top hubs={:?}",
        stats.remote,
        stats.mnc,
        stats
            .top_hubs
            .iter()
            .map(|h| format!("{}:{}", h.city, h.count))
            .collect::<Vec<_>>()
    );
}
