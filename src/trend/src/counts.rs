//! Yearly/monthly/quarterly tallies, moving average, and year-over-year
//! growth rates (spec §4.6), ported from `trend_analyzer.py`'s
//! `_time_series_analysis` / `_calculate_moving_average` /
//! `_calculate_change_rates`.

use crate::types::{Counts, ProcessedPoint};
use std::collections::HashMap;

pub fn tally(points: &[ProcessedPoint]) -> Counts {
    let mut counts = Counts::default();
    for point in points {
        *counts.yearly.entry(point.year).or_insert(0) += 1;
        *counts
            .monthly
            .entry(format!("{:04}-{:02}", point.year, point.month))
            .or_insert(0) += 1;
        *counts
            .quarterly
            .entry(format!("{}-Q{}", point.year, point.quarter))
            .or_insert(0) += 1;
    }
    counts
}

/// Trailing moving average with window `window` over the yearly
/// series, keyed by the year the window ends on. Empty once there are
/// fewer years than `window`.
pub fn moving_average(yearly: &HashMap<i32, u64>, window: usize) -> HashMap<i32, f64> {
    let mut years: Vec<i32> = yearly.keys().copied().collect();
    years.sort_unstable();
    if years.len() < window || window == 0 {
        return HashMap::new();
    }
    let mut result = HashMap::new();
    for i in (window - 1)..years.len() {
        let slice = &years[i + 1 - window..=i];
        let sum: u64 = slice.iter().map(|y| yearly[y]).sum();
        result.insert(years[i], sum as f64 / window as f64);
    }
    result
}

/// Year-over-year percentage growth; a zero previous-year count yields
/// 0% rather than dividing by zero (spec §4.6).
pub fn growth_rates(yearly: &HashMap<i32, u64>) -> HashMap<i32, f64> {
    let mut years: Vec<i32> = yearly.keys().copied().collect();
    years.sort_unstable();
    let mut rates = HashMap::new();
    for window in years.windows(2) {
        let (prev_year, curr_year) = (window[0], window[1]);
        let prev = yearly[&prev_year] as f64;
        let curr = yearly[&curr_year] as f64;
        let rate = if prev > 0.0 { (curr - prev) / prev * 100.0 } else { 0.0 };
        rates.insert(curr_year, rate);
    }
    rates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn years(counts: &[(i32, u64)]) -> HashMap<i32, u64> {
        counts.iter().copied().collect()
    }

    #[test]
    fn moving_average_needs_a_full_window() {
        let yearly = years(&[(2020, 10), (2021, 20)]);
        assert!(moving_average(&yearly, 3).is_empty());
    }

    #[test]
    fn moving_average_is_trailing_mean() {
        let yearly = years(&[(2020, 9), (2021, 12), (2022, 15)]);
        let ma = moving_average(&yearly, 3);
        assert_eq!(ma[&2022], 12.0);
    }

    #[test]
    fn growth_rate_from_zero_previous_year_is_zero() {
        let yearly = years(&[(2020, 0), (2021, 5)]);
        let rates = growth_rates(&yearly);
        assert_eq!(rates[&2021], 0.0);
    }

    #[test]
    fn growth_rate_doubling_is_one_hundred_percent() {
        let yearly = years(&[(2020, 10), (2021, 20)]);
        let rates = growth_rates(&yearly);
        assert_eq!(rates[&2021], 100.0);
    }
}
