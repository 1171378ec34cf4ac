//! Outlier years via the union of an IQR fence and a Z-score threshold
//! (spec §4.6), ported from `trend_analyzer.py`'s
//! `_detect_outliers_iqr` / `_detect_outliers_zscore` /
//! `_analyze_outlier_causes`.

use patentflow_common::TrendOutlier;
use std::collections::{HashMap, HashSet};

const Z_THRESHOLD: f64 = 2.0;

fn iqr_outliers(years: &[i32], counts: &[f64]) -> HashSet<i32> {
    if counts.len() < 4 {
        return HashSet::new();
    }
    let mut sorted = counts.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = sorted.len();
    let q1 = sorted[n / 4];
    let q3 = sorted[3 * n / 4];
    let iqr = q3 - q1;
    let lower = q1 - 1.5 * iqr;
    let upper = q3 + 1.5 * iqr;
    years
        .iter()
        .zip(counts)
        .filter(|(_, c)| **c < lower || **c > upper)
        .map(|(y, _)| *y)
        .collect()
}

fn zscore_outliers(years: &[i32], counts: &[f64]) -> HashSet<i32> {
    if counts.len() < 3 {
        return HashSet::new();
    }
    let mean = counts.iter().sum::<f64>() / counts.len() as f64;
    let variance = counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / counts.len() as f64;
    let std_dev = variance.sqrt();
    if std_dev == 0.0 {
        return HashSet::new();
    }
    years
        .iter()
        .zip(counts)
        .filter(|(_, c)| (**c - mean).abs() / std_dev > Z_THRESHOLD)
        .map(|(y, _)| *y)
        .collect()
}

fn cause_hypothesis(is_high: bool) -> String {
    if is_high {
        "policy push, a technology breakthrough, or a surge in competitive filing".to_string()
    } else {
        "a market slowdown, technology maturity, or a data collection gap".to_string()
    }
}

/// Detects and annotates outlier years across `yearly`, tagging each as
/// `high` or `low` relative to the series mean with a generic cause
/// hypothesis (spec §4.6).
pub fn detect(yearly: &HashMap<i32, u64>) -> Vec<TrendOutlier> {
    let mut years: Vec<i32> = yearly.keys().copied().collect();
    years.sort_unstable();
    let counts: Vec<f64> = years.iter().map(|y| yearly[y] as f64).collect();

    let mut outlier_years: Vec<i32> = iqr_outliers(&years, &counts).into_iter().collect();
    for year in zscore_outliers(&years, &counts) {
        if !outlier_years.contains(&year) {
            outlier_years.push(year);
        }
    }
    outlier_years.sort_unstable();

    let mean = counts.iter().sum::<f64>() / counts.len().max(1) as f64;
    outlier_years
        .into_iter()
        .map(|year| {
            let count = yearly[&year];
            let is_high = count as f64 > mean;
            TrendOutlier {
                year,
                count,
                direction: if is_high { "high" } else { "low" }.to_string(),
                hypothesis: cause_hypothesis(is_high),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spike_year_is_flagged_high() {
        let yearly: HashMap<i32, u64> = [(2019, 10), (2020, 12), (2021, 11), (2022, 90), (2023, 13)]
            .into_iter()
            .collect();
        let outliers = detect(&yearly);
        assert!(outliers.iter().any(|o| o.year == 2022 && o.direction == "high"));
    }

    #[test]
    fn stable_series_has_no_outliers() {
        let yearly: HashMap<i32, u64> = [(2019, 10), (2020, 11), (2021, 10), (2022, 11)].into_iter().collect();
        assert!(detect(&yearly).is_empty());
    }
}
