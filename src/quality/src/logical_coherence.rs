//! Logical-coherence dimension (spec §4.9, weight 0.15): within-module
//! consistency, cross-module coherence, and conclusion-data support.

use patentflow_common::AnalysisBundle;
use std::collections::HashMap;

fn internal_consistency(bundle: &AnalysisBundle) -> f64 {
    let Some(trend) = &bundle.trend else { return 0.7 };
    if trend.growth_rates.is_empty() {
        return 1.0;
    }
    let mut years: Vec<i32> = trend.growth_rates.keys().copied().collect();
    years.sort_unstable();
    let recent: Vec<f64> = years.iter().rev().take(3).map(|y| trend.growth_rates[y]).collect();
    let avg = recent.iter().sum::<f64>() / recent.len() as f64;

    let mut score = 1.0;
    if trend.direction == "increasing" && avg < -5.0 {
        score -= 0.3;
    } else if trend.direction == "decreasing" && avg > 5.0 {
        score -= 0.3;
    }
    score.max(0.0)
}

fn cross_module_coherence(bundle: &AnalysisBundle) -> f64 {
    let (Some(trend), Some(competition)) = (&bundle.trend, &bundle.competition) else { return 0.7 };
    let mut score = 1.0;
    let rapidly_increasing = trend.direction == "increasing" && trend.direction_strength > 0.7;
    if rapidly_increasing && competition.hhi > 0.8 {
        score -= 0.2;
    }
    if trend.direction == "decreasing" && competition.hhi < 0.3 {
        score -= 0.2;
    }
    score.max(0.0)
}

/// Technology-to-trend causal plausibility: a growing portfolio of
/// identified main technologies should coincide with an increasing
/// patent-count trend.
fn causal_relationships(bundle: &AnalysisBundle) -> f64 {
    let (Some(technology), Some(trend)) = (&bundle.technology, &bundle.trend) else { return 0.8 };
    if technology.main_technologies.len() > 2 && trend.direction == "increasing" {
        0.9
    } else if technology.main_technologies.is_empty() && trend.direction == "increasing" && trend.direction_strength > 0.7 {
        0.6
    } else {
        0.8
    }
}

fn conclusion_data_consistency(bundle: &AnalysisBundle) -> f64 {
    match bundle.modules_present() {
        0 => 0.5,
        1 => 0.7,
        _ => 0.9,
    }
}

pub struct CoherenceCheck {
    pub overall: f64,
    pub checks: HashMap<String, f64>,
}

pub fn check(bundle: &AnalysisBundle) -> CoherenceCheck {
    let mut checks = HashMap::new();
    checks.insert("internal_consistency".to_string(), internal_consistency(bundle));
    checks.insert("cross_module_coherence".to_string(), cross_module_coherence(bundle));
    checks.insert("causal_relationships".to_string(), causal_relationships(bundle));
    checks.insert("conclusion_consistency".to_string(), conclusion_data_consistency(bundle));

    let overall = checks.values().sum::<f64>() / checks.len() as f64;
    CoherenceCheck { overall, checks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patentflow_common::{CompetitionResult, TrendResult};

    #[test]
    fn increasing_direction_with_negative_recent_growth_is_penalized() {
        let bundle = AnalysisBundle {
            trend: Some(TrendResult {
                direction: "increasing".into(),
                growth_rates: [(2020, -10.0), (2021, -8.0), (2022, -9.0)].into_iter().collect(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let result = check(&bundle);
        assert!(result.checks["internal_consistency"] < 1.0);
    }

    #[test]
    fn no_modules_scores_low_conclusion_consistency() {
        let result = check(&AnalysisBundle::default());
        assert_eq!(result.checks["conclusion_consistency"], 0.5);
    }

    #[test]
    fn cross_module_monopoly_with_rapid_growth_penalized() {
        let bundle = AnalysisBundle {
            trend: Some(TrendResult { direction: "increasing".into(), direction_strength: 0.9, ..Default::default() }),
            competition: Some(CompetitionResult { hhi: 0.85, ..Default::default() }),
            ..Default::default()
        };
        let result = check(&bundle);
        assert!(result.checks["cross_module_coherence"] < 1.0);
    }
}
