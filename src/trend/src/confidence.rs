//! Prediction confidence scoring (spec §4.6), ported from
//! `trend_analyzer.py`'s `_assess_prediction_confidence`.

use crate::types::{ConfidenceFactors, MethodPrediction};
use std::collections::HashMap;

/// Data-quality score from the number of years observed: 0.9 at ≥10
/// years, 0.7 at ≥5, 0.5 at ≥3, else 0.3.
fn data_quality(year_count: usize) -> f64 {
    if year_count >= 10 {
        0.9
    } else if year_count >= 5 {
        0.7
    } else if year_count >= 3 {
        0.5
    } else {
        0.3
    }
}

/// How lopsided the year-over-year direction of change is: 1.0 when
/// every change points the same way, 0.0 when it's evenly split.
fn trend_consistency(counts: &[f64]) -> f64 {
    if counts.len() < 3 {
        return 0.0;
    }
    let changes: Vec<f64> = counts.windows(2).map(|w| w[1] - w[0]).collect();
    let positives = changes.iter().filter(|c| **c > 0.0).count() as f64;
    let negatives = changes.iter().filter(|c| **c < 0.0).count() as f64;
    (positives - negatives).abs() / changes.len() as f64
}

/// How closely the contributing methods agree on the first predicted
/// year: 1 minus the coefficient of variation across their first-year
/// values.
fn method_agreement(methods: &[MethodPrediction]) -> f64 {
    let first_year_values: Vec<f64> = methods
        .iter()
        .filter_map(|m| {
            let mut years: Vec<&i32> = m.values.keys().collect();
            years.sort();
            years.first().map(|y| m.values[*y])
        })
        .collect();
    if first_year_values.len() <= 1 {
        return 0.0;
    }
    let avg = first_year_values.iter().sum::<f64>() / first_year_values.len() as f64;
    if avg <= 0.0 {
        return 0.0;
    }
    let variance = first_year_values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / first_year_values.len() as f64;
    (1.0 - variance.sqrt() / avg).max(0.0)
}

/// How stable the historical counts are: 1 minus their coefficient of
/// variation.
fn historical_stability(counts: &[f64]) -> f64 {
    if counts.len() < 3 {
        return 0.0;
    }
    let mean = counts.iter().sum::<f64>() / counts.len() as f64;
    if mean <= 0.0 {
        return 0.0;
    }
    let variance = counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / counts.len() as f64;
    (1.0 - variance.sqrt() / mean).max(0.0)
}

pub fn assess(yearly: &HashMap<i32, u64>, methods: &[MethodPrediction]) -> ConfidenceFactors {
    let mut years: Vec<i32> = yearly.keys().copied().collect();
    years.sort_unstable();
    let counts: Vec<f64> = years.iter().map(|y| yearly[y] as f64).collect();

    ConfidenceFactors {
        data_quality: data_quality(years.len()),
        trend_consistency: trend_consistency(&counts),
        method_agreement: method_agreement(methods),
        historical_stability: historical_stability(&counts),
    }
}

/// `high` ≥ 0.8, `medium` ≥ 0.6, `low` ≥ 0.4, else `very_low` (spec
/// §4.6).
pub fn grade(overall: f64) -> &'static str {
    if overall >= 0.8 {
        "high"
    } else if overall >= 0.6 {
        "medium"
    } else if overall >= 0.4 {
        "low"
    } else {
        "very_low"
    }
}
