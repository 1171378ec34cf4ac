//! Combines three independent direction signals into one verdict (spec
//! §4.6), ported from `trend_analyzer.py`'s `_trend_direction_analysis`
//! / `_pattern_to_confidence` / `_determine_overall_direction`.

use crate::types::DirectionVote;
use std::collections::HashMap;

const GROWTH_WEIGHT: f64 = 0.4;
const PATTERN_WEIGHT: f64 = 0.3;
const LONG_TERM_WEIGHT: f64 = 0.3;

fn pattern_confidence(pattern: &str) -> f64 {
    match pattern {
        "rapid_growth" => 0.9,
        "steady_growth" => 0.8,
        "moderate_growth" => 0.6,
        "fluctuating" => 0.4,
        "declining" => 0.7,
        "rapid_decline" => 0.8,
        "insufficient_data" => 0.1,
        _ => 0.5,
    }
}

fn pattern_score(pattern: &str) -> f64 {
    match pattern {
        "rapid_growth" | "steady_growth" | "moderate_growth" => 1.0,
        "declining" | "rapid_decline" => -1.0,
        _ => 0.0,
    }
}

/// Direction, confidence, and strength from a weighted 0.4/0.3/0.3
/// vote over growth-based, pattern-based, and CAGR-based signals.
pub struct DirectionResult {
    pub direction: String,
    pub confidence: f64,
    pub strength: f64,
}

/// `growth_rates` must already be sorted by year ascending by the
/// caller (it's produced that way by [`crate::counts::growth_rates`]
/// fed through a sorted key order, but `HashMap` doesn't preserve
/// order, so callers pass the last-3 values explicitly).
pub fn analyze(recent_growth_rates: &[f64], pattern: &str, cagr: Option<f64>) -> DirectionResult {
    let avg_recent_growth = if recent_growth_rates.is_empty() {
        0.0
    } else {
        recent_growth_rates.iter().sum::<f64>() / recent_growth_rates.len() as f64
    };
    let growth_score = if avg_recent_growth > 0.0 { 1.0 } else if avg_recent_growth < 0.0 { -1.0 } else { 0.0 };
    let growth_vote = DirectionVote {
        score: growth_score,
        confidence: (avg_recent_growth.abs() / 20.0).min(1.0),
        weight: GROWTH_WEIGHT,
    };

    let pattern_vote = DirectionVote {
        score: pattern_score(pattern),
        confidence: pattern_confidence(pattern),
        weight: PATTERN_WEIGHT,
    };

    let cagr_pct = cagr.unwrap_or(0.0) * 100.0;
    let long_term_score = if cagr_pct > 5.0 { 1.0 } else if cagr_pct < -5.0 { -1.0 } else { 0.0 };
    let long_term_vote = DirectionVote {
        score: long_term_score,
        confidence: (cagr_pct.abs() / 20.0).min(1.0),
        weight: LONG_TERM_WEIGHT,
    };

    let votes = [growth_vote, pattern_vote, long_term_vote];
    let weighted_score: f64 = votes.iter().map(|v| v.score * v.weight * v.confidence).sum();
    let total_weight: f64 = votes.iter().map(|v| v.weight).sum();
    let total_confidence: f64 = votes.iter().map(|v| v.weight * v.confidence).sum::<f64>() / total_weight;

    let direction = if weighted_score > 0.3 {
        "increasing"
    } else if weighted_score < -0.3 {
        "decreasing"
    } else {
        "stable"
    };

    DirectionResult {
        direction: direction.to_string(),
        confidence: total_confidence,
        strength: weighted_score.abs(),
    }
}

/// Extracts the last `n` growth-rate values in year order.
pub fn recent(growth_rates: &HashMap<i32, f64>, n: usize) -> Vec<f64> {
    let mut years: Vec<i32> = growth_rates.keys().copied().collect();
    years.sort_unstable();
    years.iter().rev().take(n).rev().map(|y| growth_rates[y]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_positive_signals_agree_on_increasing() {
        let result = analyze(&[15.0, 18.0, 20.0], "rapid_growth", Some(0.2));
        assert_eq!(result.direction, "increasing");
        assert!(result.strength > 0.3);
    }

    #[test]
    fn conflicting_weak_signals_settle_on_stable() {
        let result = analyze(&[0.0], "fluctuating", Some(0.0));
        assert_eq!(result.direction, "stable");
    }

    #[test]
    fn recent_takes_the_last_n_years_in_order() {
        let rates: HashMap<i32, f64> = [(2019, 1.0), (2020, 2.0), (2021, 3.0), (2022, 4.0)].into_iter().collect();
        assert_eq!(recent(&rates, 3), vec![2.0, 3.0, 4.0]);
    }
}
