//! # patentflow-search — C5 Search Aggregator
//!
//! Health-gated, failover-aware multi-source search with deduplication,
//! quality scoring, and a diversity pass (spec §4.5).

pub mod aggregator;
pub mod dedup;
pub mod health;
pub mod metrics;
pub mod scoring;
pub mod types;

pub use aggregator::SearchAggregator;
pub use health::SourceHealthTracker;
pub use metrics::SearchMetrics;
pub use types::{ScoredRecord, SearchRequest, SourceId};
