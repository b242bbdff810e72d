// tests/feed_scheduler.rs
//
// Timer-driven ingestion on a paused Tokio clock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use kormo_stream::feed::clock::FixedClock;
use kormo_stream::feed::generator::JobGenerator;
use kormo_stream::feed::scheduler::{spawn_feed_scheduler, FeedSchedulerCfg};
use kormo_stream::FeedStore;

fn fast_cfg() -> FeedSchedulerCfg {
    FeedSchedulerCfg {
        tick_min: Duration::from_millis(40),
        tick_max: Duration::from_millis(80),
    }
}

#[tokio::test(start_paused = true)]
async fn ticks_ingest_newest_first_until_shutdown() {
    let mut g = JobGenerator::seeded(8, FixedClock::new(Utc::now()));
    let feed = FeedStore::with_initial(100, &mut g, 15).into_shared();
    let before = feed.read().snapshot()[0].id.clone();

    let ticks = Arc::new(AtomicUsize::new(0));
    let t = ticks.clone();
    let scheduler = spawn_feed_scheduler(fast_cfg(), feed.clone(), g, move |_| {
        t.fetch_add(1, Ordering::SeqCst);
    });
    assert!(scheduler.is_running());

    // 800ms at 40..=80ms per tick: between 10 and 20 ticks.
    tokio::time::sleep(Duration::from_millis(800)).await;
    let n = ticks.load(Ordering::SeqCst);
    assert!((10..=20).contains(&n), "ticks = {n}");
    assert_eq!(feed.read().len(), 15 + n);
    assert_ne!(feed.read().snapshot()[0].id, before);

    scheduler.shutdown();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), n, "no ticks after shutdown");
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_cancels_the_task() {
    let mut g = JobGenerator::seeded(9, FixedClock::new(Utc::now()));
    let feed = FeedStore::with_initial(100, &mut g, 0).into_shared();

    {
        let _scheduler = spawn_feed_scheduler(fast_cfg(), feed.clone(), g, |_| {});
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    let len = feed.read().len();
    assert!(len > 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(feed.read().len(), len);
}

#[tokio::test(start_paused = true)]
async fn eviction_is_reported_to_the_hook() {
    let mut g = JobGenerator::seeded(10, FixedClock::new(Utc::now()));
    let feed = FeedStore::with_initial(3, &mut g, 3).into_shared();

    let evicted = Arc::new(AtomicUsize::new(0));
    let e = evicted.clone();
    let scheduler = spawn_feed_scheduler(fast_cfg(), feed.clone(), g, move |o| {
        e.fetch_add(o.evicted().len(), Ordering::SeqCst);
    });

    tokio::time::sleep(Duration::from_millis(400)).await;
    scheduler.shutdown();

    assert_eq!(feed.read().len(), 3);
    assert!(evicted.load(Ordering::SeqCst) >= 4);
}
