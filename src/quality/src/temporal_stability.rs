//! Temporal-stability dimension (spec §4.9, weight 0.15): compares the
//! current bundle against the previous version of the same `result_id`.

use patentflow_common::AnalysisBundle;
use std::collections::{HashMap, HashSet};

pub struct StabilityCheck {
    pub score: f64,
    pub status: &'static str,
    pub checks: HashMap<String, f64>,
}

fn top_applicants(bundle: &AnalysisBundle, n: usize) -> HashSet<String> {
    let Some(competition) = &bundle.competition else { return HashSet::new() };
    let mut ranked: Vec<(&String, &u64)> = competition.applicant_counts.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    ranked.into_iter().take(n).map(|(name, _)| name.clone()).collect()
}

fn top_technologies(bundle: &AnalysisBundle, n: usize) -> HashSet<String> {
    bundle.technology.as_ref().map(|t| t.main_technologies.iter().take(n).cloned().collect()).unwrap_or_default()
}

fn overlap_ratio(a: &HashSet<String>, b: &HashSet<String>) -> Option<f64> {
    if a.is_empty() && b.is_empty() {
        return None;
    }
    let overlap = a.intersection(b).count() as f64;
    Some(overlap / a.len().max(b.len()) as f64)
}

pub fn check(current: &AnalysisBundle, previous: Option<&AnalysisBundle>) -> StabilityCheck {
    let Some(previous) = previous else {
        return StabilityCheck { score: 0.8, status: "insufficient_history", checks: HashMap::new() };
    };

    let mut checks = HashMap::new();
    if let (Some(current_trend), Some(previous_trend)) = (&current.trend, &previous.trend) {
        checks.insert(
            "trend_direction".to_string(),
            if current_trend.direction == previous_trend.direction { 1.0 } else { 0.5 },
        );
    }
    if let Some(score) = overlap_ratio(&top_applicants(current, 5), &top_applicants(previous, 5)) {
        checks.insert("top_competitors".to_string(), score);
    }
    if let Some(score) = overlap_ratio(&top_technologies(current, 5), &top_technologies(previous, 5)) {
        checks.insert("main_technologies".to_string(), score);
    }

    let score = if checks.is_empty() { 0.8 } else { checks.values().sum::<f64>() / checks.len() as f64 };
    let status = if score >= 0.7 { "pass" } else { "unstable" };
    StabilityCheck { score, status, checks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patentflow_common::{CompetitionResult, TrendResult};

    #[test]
    fn no_previous_version_is_insufficient_history() {
        let result = check(&AnalysisBundle::default(), None);
        assert_eq!(result.status, "insufficient_history");
        assert_eq!(result.score, 0.8);
    }

    #[test]
    fn matching_direction_and_applicants_is_stable() {
        let current = AnalysisBundle {
            trend: Some(TrendResult { direction: "increasing".into(), ..Default::default() }),
            competition: Some(CompetitionResult {
                applicant_counts: [("A".to_string(), 10), ("B".to_string(), 5)].into_iter().collect(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let previous = current.clone();
        let result = check(&current, Some(&previous));
        assert_eq!(result.status, "pass");
        assert_eq!(result.checks["trend_direction"], 1.0);
    }
}
