// src/config/mod.rs
pub mod feed;
pub mod insight;

pub use feed::FeedConfig;
pub use insight::InsightConfig;
