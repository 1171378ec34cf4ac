//! Analysis quality control (spec §4.9): five weighted dimensions,
//! anomaly detection, result caching, and version history over
//! `AnalysisBundle`s.

pub mod anomaly;
pub mod cache;
pub mod completeness;
pub mod consistency;
pub mod controller;
pub mod logical_coherence;
pub mod metrics;
pub mod statistical_validity;
pub mod temporal_stability;
pub mod versioning;

pub use controller::{AnalysisQualityController, AnalysisQualityControllerConfig};
pub use metrics::AnalysisQualityControllerMetrics;
