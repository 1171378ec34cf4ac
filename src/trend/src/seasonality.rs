//! Seasonality strength as the coefficient of variation across the
//! twelve calendar months (spec §4.6), ported from
//! `trend_analyzer.py`'s `_calculate_seasonality_strength`.

use crate::types::ProcessedPoint;

/// Coefficient of variation (stddev / mean) of patent counts bucketed
/// by calendar month (1-12), irrespective of year. Present (per spec
/// §4.6) once it exceeds 0.3.
pub fn coefficient_of_variation(points: &[ProcessedPoint]) -> f64 {
    let mut by_month = [0u64; 12];
    for point in points {
        by_month[(point.month - 1) as usize] += 1;
    }
    let counts: Vec<f64> = by_month.iter().map(|c| *c as f64).collect();
    let mean = counts.iter().sum::<f64>() / counts.len() as f64;
    if mean == 0.0 {
        return 0.0;
    }
    let variance = counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / counts.len() as f64;
    variance.sqrt() / mean
}

pub fn is_present(coefficient: f64) -> bool {
    coefficient > 0.3
}
