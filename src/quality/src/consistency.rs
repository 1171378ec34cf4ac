//! Consistency dimension (spec §4.9, weight 0.25): data-count
//! agreement, time-range overlap, and cross-module logical checks.

use patentflow_common::AnalysisBundle;
use std::collections::HashMap;

pub struct ConsistencyCheck {
    pub overall: f64,
    pub checks: HashMap<String, f64>,
}

fn data_count_consistency(bundle: &AnalysisBundle) -> f64 {
    let mut counts = Vec::new();
    if let Some(trend) = &bundle.trend {
        counts.push(trend.yearly_counts.values().sum::<u64>());
    }
    if let Some(competition) = &bundle.competition {
        counts.push(competition.applicant_counts.values().sum::<u64>());
    }
    if let Some(technology) = &bundle.technology {
        counts.push(technology.ipc_distribution.values().sum::<u64>());
    }
    if counts.len() <= 1 {
        return 1.0;
    }
    let max = *counts.iter().max().unwrap();
    let min = *counts.iter().min().unwrap();
    if max == 0 { 1.0 } else { min as f64 / max as f64 }
}

fn time_range_overlap(bundle: &AnalysisBundle) -> f64 {
    let mut ranges: Vec<(i32, i32)> = Vec::new();
    if let Some(trend) = &bundle.trend {
        if let (Some(&min), Some(&max)) = (trend.yearly_counts.keys().min(), trend.yearly_counts.keys().max()) {
            ranges.push((min, max));
        }
    }
    if let Some(competition) = &bundle.competition {
        if let (Some(&min), Some(&max)) =
            (competition.yearly_competition.keys().min(), competition.yearly_competition.keys().max())
        {
            ranges.push((min, max));
        }
    }
    if let Some(technology) = &bundle.technology {
        let years: Vec<i32> = technology.evolution.values().flat_map(|m| m.keys().copied()).collect();
        if let (Some(&min), Some(&max)) = (years.iter().min(), years.iter().max()) {
            ranges.push((min, max));
        }
    }

    if ranges.len() <= 1 {
        return 1.0;
    }
    let max_start = ranges.iter().map(|(s, _)| *s).max().unwrap();
    let min_end = ranges.iter().map(|(_, e)| *e).min().unwrap();
    if max_start > min_end {
        return 0.0;
    }
    let overlap_years = (min_end - max_start + 1) as f64;
    let avg_range_length: f64 = ranges.iter().map(|(s, e)| (e - s + 1) as f64).sum::<f64>() / ranges.len() as f64;
    (overlap_years / avg_range_length).min(1.0)
}

/// Penalizes a strongly-increasing trend paired with a near-monopoly
/// market (spec: `rapidly_increasing` ⇔ HHI<0.9), and symmetrically a
/// decreasing trend paired with a very fragmented market.
fn logical_consistency(bundle: &AnalysisBundle) -> f64 {
    let (Some(trend), Some(competition)) = (&bundle.trend, &bundle.competition) else { return 1.0 };
    let mut score = 1.0;
    let rapidly_increasing = trend.direction == "increasing" && trend.direction_strength > 0.7;
    if rapidly_increasing && competition.hhi > 0.9 {
        score -= 0.2;
    }
    if trend.direction == "decreasing" && competition.hhi < 0.1 {
        score -= 0.2;
    }
    score.max(0.0)
}

pub fn check(bundle: &AnalysisBundle) -> ConsistencyCheck {
    let mut checks = HashMap::new();
    checks.insert("data_count_consistency".to_string(), data_count_consistency(bundle));
    checks.insert("time_range_consistency".to_string(), time_range_overlap(bundle));
    checks.insert("logical_consistency".to_string(), logical_consistency(bundle));

    let overall = checks.values().sum::<f64>() / checks.len() as f64;
    ConsistencyCheck { overall, checks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patentflow_common::{CompetitionResult, TrendResult};

    #[test]
    fn rapid_growth_with_monopoly_is_penalized() {
        let bundle = AnalysisBundle {
            trend: Some(TrendResult { direction: "increasing".into(), direction_strength: 0.9, ..Default::default() }),
            competition: Some(CompetitionResult { hhi: 0.95, ..Default::default() }),
            ..Default::default()
        };
        let result = check(&bundle);
        assert!(result.checks["logical_consistency"] < 1.0);
    }

    #[test]
    fn single_module_is_fully_consistent() {
        let bundle = AnalysisBundle { trend: Some(TrendResult::default()), ..Default::default() };
        let result = check(&bundle);
        assert_eq!(result.checks["data_count_consistency"], 1.0);
    }
}
