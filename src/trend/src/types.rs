//! Internal intermediates used while assembling a `TrendResult` (spec
//! §4.6). None of this is serialized on its own; the analyzer folds
//! everything into `patentflow_common::TrendResult` at the end.

use std::collections::HashMap;

/// A single patent reduced to the fields the trend analyzer needs,
/// mirroring `trend_analyzer.py`'s `processed_patent` dict.
#[derive(Debug, Clone)]
pub struct ProcessedPoint {
    pub year: i32,
    pub month: u32,
    pub quarter: u32,
}

/// Yearly/monthly/quarterly tallies derived from a processed series.
#[derive(Debug, Clone, Default)]
pub struct Counts {
    pub yearly: HashMap<i32, u64>,
    pub monthly: HashMap<String, u64>,
    pub quarterly: HashMap<String, u64>,
}

/// One prediction method's output: a value per future year.
#[derive(Debug, Clone)]
pub struct MethodPrediction {
    pub method: &'static str,
    pub values: HashMap<i32, f64>,
}

/// The four confidence components averaged into an overall score
/// (spec §4.6 "weighted sum of (data_quality, trend_consistency,
/// method_agreement, historical_stability)").
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceFactors {
    pub data_quality: f64,
    pub trend_consistency: f64,
    pub method_agreement: f64,
    pub historical_stability: f64,
}

impl ConfidenceFactors {
    pub fn overall(&self) -> f64 {
        (self.data_quality + self.trend_consistency + self.method_agreement + self.historical_stability) / 4.0
    }
}

/// One of the three direction votes (growth-based, pattern-based,
/// long-term/CAGR-based) combined with weights 0.4/0.3/0.3.
#[derive(Debug, Clone, Copy)]
pub struct DirectionVote {
    pub score: f64,
    pub confidence: f64,
    pub weight: f64,
}
