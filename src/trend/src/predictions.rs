//! The five-method prediction ensemble (spec §4.6), ported from
//! `trend_analyzer.py`'s `_linear_trend_prediction` /
//! `_moving_average_prediction` / `_exponential_smoothing_prediction` /
//! `_seasonal_adjusted_prediction` / `_ensemble_prediction`.

use crate::regression::linear_fit;
use crate::types::MethodPrediction;
use std::collections::HashMap;

const EXP_SMOOTHING_ALPHA: f64 = 0.3;
const SEASONAL_CYCLE_LENGTH: usize = 3;
const SEASONAL_MIN_POINTS: usize = 6;

fn sorted_series(yearly: &HashMap<i32, u64>) -> (Vec<i32>, Vec<f64>) {
    let mut years: Vec<i32> = yearly.keys().copied().collect();
    years.sort_unstable();
    let counts: Vec<f64> = years.iter().map(|y| yearly[y] as f64).collect();
    (years, counts)
}

/// Extrapolates the OLS fit on (year_index, count) `horizon` years past
/// the last observed year, floored at zero.
pub fn linear(yearly: &HashMap<i32, u64>, horizon: usize) -> MethodPrediction {
    let (years, counts) = sorted_series(yearly);
    let fit = linear_fit(&counts);
    let last_year = *years.last().unwrap_or(&0);
    let n = counts.len() as f64;
    let mut values = HashMap::new();
    for i in 1..=horizon {
        let future_year = last_year + i as i32;
        let predicted = fit.slope * (n + i as f64 - 1.0) + (counts.iter().sum::<f64>() / n - fit.slope * (n - 1.0) / 2.0);
        values.insert(future_year, predicted.max(0.0));
    }
    MethodPrediction { method: "linear_regression", values }
}

/// Holds the mean of the trailing `window` years constant across the
/// horizon (clamped to however many years are actually available).
pub fn moving_average(yearly: &HashMap<i32, u64>, window: usize, horizon: usize) -> MethodPrediction {
    let (years, counts) = sorted_series(yearly);
    let window = window.min(counts.len()).max(1);
    let recent_average = counts[counts.len() - window..].iter().sum::<f64>() / window as f64;
    let last_year = *years.last().unwrap_or(&0);
    let values = (1..=horizon).map(|i| (last_year + i as i32, recent_average)).collect();
    MethodPrediction { method: "moving_average", values }
}

/// Holds the last exponentially-smoothed value (α = 0.3) constant
/// across the horizon.
pub fn exponential_smoothing(yearly: &HashMap<i32, u64>, horizon: usize) -> MethodPrediction {
    let (years, counts) = sorted_series(yearly);
    let mut smoothed = counts[0];
    for &count in &counts[1..] {
        smoothed = EXP_SMOOTHING_ALPHA * count + (1.0 - EXP_SMOOTHING_ALPHA) * smoothed;
    }
    let last_year = *years.last().unwrap_or(&0);
    let values = (1..=horizon).map(|i| (last_year + i as i32, smoothed)).collect();
    MethodPrediction { method: "exponential_smoothing", values }
}

/// Detects a 3-year cycle once at least 6 data points exist and repeats
/// the per-position cycle average across the horizon; otherwise falls
/// back to the plain historical mean.
pub fn seasonal(yearly: &HashMap<i32, u64>, horizon: usize) -> MethodPrediction {
    let (years, counts) = sorted_series(yearly);
    let last_year = *years.last().unwrap_or(&0);

    if counts.len() >= SEASONAL_MIN_POINTS && counts.len() >= SEASONAL_CYCLE_LENGTH * 2 {
        let cycle_averages: Vec<f64> = (0..SEASONAL_CYCLE_LENGTH)
            .map(|offset| {
                let cycle_values: Vec<f64> = counts.iter().skip(offset).step_by(SEASONAL_CYCLE_LENGTH).copied().collect();
                cycle_values.iter().sum::<f64>() / cycle_values.len() as f64
            })
            .collect();
        let values = (1..=horizon)
            .map(|i| {
                let position = (i - 1) % SEASONAL_CYCLE_LENGTH;
                (last_year + i as i32, cycle_averages[position])
            })
            .collect();
        return MethodPrediction { method: "seasonal_adjusted", values };
    }

    let average = counts.iter().sum::<f64>() / counts.len() as f64;
    let values = (1..=horizon).map(|i| (last_year + i as i32, average)).collect();
    MethodPrediction { method: "seasonal_adjusted_fallback", values }
}

/// Simple mean of every contributing method per year, plus the
/// min/max/standard-deviation spread across methods for that year.
pub fn ensemble(methods: &[MethodPrediction]) -> (HashMap<i32, f64>, HashMap<i32, (f64, f64, f64)>) {
    let mut by_year: HashMap<i32, Vec<f64>> = HashMap::new();
    for method in methods {
        for (&year, &value) in &method.values {
            by_year.entry(year).or_default().push(value);
        }
    }
    let mut ensemble = HashMap::new();
    let mut spread = HashMap::new();
    for (year, values) in &by_year {
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        ensemble.insert(*year, mean);
        spread.insert(*year, (min, max, variance.sqrt()));
    }
    (ensemble, spread)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(counts: &[(i32, u64)]) -> HashMap<i32, u64> {
        counts.iter().copied().collect()
    }

    #[test]
    fn linear_prediction_extrapolates_a_constant_slope() {
        let yearly = series(&[(2020, 10), (2021, 20), (2022, 30)]);
        let pred = linear(&yearly, 1);
        assert!((pred.values[&2023] - 40.0).abs() < 1e-6);
    }

    #[test]
    fn moving_average_prediction_holds_the_recent_mean() {
        let yearly = series(&[(2020, 10), (2021, 20), (2022, 30)]);
        let pred = moving_average(&yearly, 3, 2);
        assert_eq!(pred.values[&2023], 20.0);
        assert_eq!(pred.values[&2024], 20.0);
    }

    #[test]
    fn seasonal_falls_back_to_mean_below_six_points() {
        let yearly = series(&[(2020, 10), (2021, 20), (2022, 30)]);
        let pred = seasonal(&yearly, 1);
        assert_eq!(pred.method, "seasonal_adjusted_fallback");
        assert_eq!(pred.values[&2023], 20.0);
    }

    #[test]
    fn ensemble_averages_contributing_methods() {
        let a = MethodPrediction {
            method: "a",
            values: [(2023, 10.0)].into_iter().collect(),
        };
        let b = MethodPrediction {
            method: "b",
            values: [(2023, 20.0)].into_iter().collect(),
        };
        let (ensemble_values, spread) = ensemble(&[a, b]);
        assert_eq!(ensemble_values[&2023], 15.0);
        assert_eq!(spread[&2023].0, 10.0);
        assert_eq!(spread[&2023].1, 20.0);
    }
}
