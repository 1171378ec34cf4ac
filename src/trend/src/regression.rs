//! Linear trend strength, CAGR, and growth-pattern classification (spec
//! §4.6), ported from `trend_analyzer.py`'s `_calculate_trend_strength`
//! / `_calculate_cagr` / `_classify_growth_pattern`.

use std::collections::HashMap;

/// Slope and Pearson correlation of `counts` regressed on its own index
/// (0, 1, 2, ...), i.e. on (year_index, count) as spec §4.6 specifies.
pub struct LinearFit {
    pub slope: f64,
    pub r: f64,
}

impl LinearFit {
    pub fn direction(&self) -> &'static str {
        if self.slope > 0.0 {
            "increasing"
        } else if self.slope < 0.0 {
            "decreasing"
        } else {
            "stable"
        }
    }
}

/// Ordinary least squares of `values` against their position index.
/// Returns slope 0 / r 0 for series too short or constant to fit.
pub fn linear_fit(values: &[f64]) -> LinearFit {
    let n = values.len();
    if n < 2 {
        return LinearFit { slope: 0.0, r: 0.0 };
    }
    let mean_x = (n - 1) as f64 / 2.0;
    let mean_y = values.iter().sum::<f64>() / n as f64;

    let mut num = 0.0;
    let mut den_x = 0.0;
    let mut den_y = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        let dy = y - mean_y;
        num += dx * dy;
        den_x += dx * dx;
        den_y += dy * dy;
    }
    if den_x == 0.0 {
        return LinearFit { slope: 0.0, r: 0.0 };
    }
    let slope = num / den_x;
    let r = if den_y > 0.0 { num / (den_x * den_y).sqrt() } else { 0.0 };
    LinearFit { slope, r }
}

/// `(end/start)^(1/(end_year-start_year)) - 1`, valid only when the
/// start count is positive and the series spans more than one year
/// (spec §4.6).
pub fn cagr(yearly: &HashMap<i32, u64>) -> Option<f64> {
    let mut years: Vec<i32> = yearly.keys().copied().collect();
    years.sort_unstable();
    let (start_year, end_year) = (*years.first()?, *years.last()?);
    if end_year <= start_year {
        return None;
    }
    let start = yearly[&start_year] as f64;
    let end = yearly[&end_year] as f64;
    if start <= 0.0 {
        return None;
    }
    let span = (end_year - start_year) as f64;
    Some((end / start).powf(1.0 / span) - 1.0)
}

/// Classifies the mean year-over-year growth rate into the six bands
/// from spec §4.6.
pub fn classify_pattern(growth_rates: &HashMap<i32, f64>) -> String {
    if growth_rates.is_empty() {
        return "insufficient_data".to_string();
    }
    let rates: Vec<f64> = growth_rates.values().copied().collect();
    let avg = rates.iter().sum::<f64>() / rates.len() as f64;
    let positives = rates.iter().filter(|r| **r > 0.0).count();
    let negatives = rates.iter().filter(|r| **r < 0.0).count();

    if avg > 20.0 {
        "rapid_growth".to_string()
    } else if avg > 5.0 {
        "steady_growth".to_string()
    } else if avg > -5.0 {
        if positives > negatives {
            "moderate_growth".to_string()
        } else {
            "fluctuating".to_string()
        }
    } else if avg > -20.0 {
        "declining".to_string()
    } else {
        "rapid_decline".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfectly_linear_series_has_r_of_one() {
        let fit = linear_fit(&[10.0, 20.0, 30.0, 40.0]);
        assert_eq!(fit.slope, 10.0);
        assert!((fit.r - 1.0).abs() < 1e-9);
        assert_eq!(fit.direction(), "increasing");
    }

    #[test]
    fn flat_series_has_zero_slope() {
        let fit = linear_fit(&[5.0, 5.0, 5.0]);
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.direction(), "stable");
    }

    #[test]
    fn cagr_requires_positive_start_and_multi_year_span() {
        let single_year: HashMap<i32, u64> = [(2020, 10)].into_iter().collect();
        assert_eq!(cagr(&single_year), None);

        let zero_start: HashMap<i32, u64> = [(2020, 0), (2022, 10)].into_iter().collect();
        assert_eq!(cagr(&zero_start), None);

        let doubling: HashMap<i32, u64> = [(2020, 10), (2022, 40)].into_iter().collect();
        assert!((cagr(&doubling).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn classify_pattern_bands_match_thresholds() {
        let rapid: HashMap<i32, f64> = [(2021, 25.0), (2022, 30.0)].into_iter().collect();
        assert_eq!(classify_pattern(&rapid), "rapid_growth");

        let fluctuating: HashMap<i32, f64> = [(2021, -3.0), (2022, -4.0)].into_iter().collect();
        assert_eq!(classify_pattern(&fluctuating), "fluctuating");

        let moderate: HashMap<i32, f64> = [(2021, 4.0), (2022, 3.0)].into_iter().collect();
        assert_eq!(classify_pattern(&moderate), "moderate_growth");

        assert_eq!(classify_pattern(&HashMap::new()), "insufficient_data");
    }
}
