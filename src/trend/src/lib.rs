//! # patentflow-trend — C6 Trend Analyzer
//!
//! Time-series trend analysis over a patent series: counts at three
//! granularities, moving average and year-over-year growth, linear
//! regression and CAGR, a five-method prediction ensemble with
//! confidence scoring, direction analysis, seasonality, and outlier
//! detection (spec §4.6).

pub mod analyzer;
pub mod confidence;
pub mod counts;
pub mod direction;
pub mod metrics;
pub mod outliers;
pub mod predictions;
pub mod preprocessing;
pub mod regression;
pub mod seasonality;
pub mod types;

pub use analyzer::{TrendAnalyzer, TrendAnalyzerConfig};
pub use metrics::TrendAnalyzerMetrics;
