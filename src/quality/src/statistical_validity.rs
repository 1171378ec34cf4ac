//! Statistical-validity dimension (spec §4.9, weight 0.20): sample-size
//! thresholds, variance bands, and distribution-shape sanity.

use patentflow_common::AnalysisBundle;
use std::collections::HashMap;

const MIN_SAMPLES: &[(&str, u64)] = &[("trend", 20), ("competition", 15), ("technology", 10)];

fn sample_size_score(actual: u64, min_size: u64) -> f64 {
    if actual >= min_size {
        1.0
    } else if actual as f64 >= min_size as f64 * 0.7 {
        0.8
    } else if actual as f64 >= min_size as f64 * 0.5 {
        0.6
    } else {
        0.3
    }
}

fn sample_size_validity(bundle: &AnalysisBundle) -> f64 {
    let mut scores = Vec::new();
    for (module, min_size) in MIN_SAMPLES {
        let actual = match *module {
            "trend" => bundle.trend.as_ref().map(|t| t.yearly_counts.values().sum()),
            "competition" => bundle.competition.as_ref().map(|c| c.applicant_counts.len() as u64),
            "technology" => bundle.technology.as_ref().map(|t| t.ipc_distribution.len() as u64),
            _ => None,
        };
        if let Some(actual) = actual {
            scores.push(sample_size_score(actual, *min_size));
        }
    }
    if scores.is_empty() { 0.0 } else { scores.iter().sum::<f64>() / scores.len() as f64 }
}

fn statistical_significance(bundle: &AnalysisBundle) -> f64 {
    let mut scores = Vec::new();
    if let Some(trend) = &bundle.trend {
        if !trend.growth_rates.is_empty() {
            let rates: Vec<f64> = trend.growth_rates.values().copied().collect();
            if rates.len() > 1 {
                let mean = rates.iter().sum::<f64>() / rates.len() as f64;
                let variance = rates.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / rates.len() as f64;
                scores.push(if variance > 5.0 && variance < 100.0 { 0.8 } else { 0.5 });
            }
        }
    }
    if let Some(competition) = &bundle.competition {
        scores.push(if competition.hhi > 0.1 && competition.hhi < 0.9 { 0.8 } else { 0.6 });
    }
    if scores.is_empty() { 0.7 } else { scores.iter().sum::<f64>() / scores.len() as f64 }
}

fn distribution_validity(bundle: &AnalysisBundle) -> f64 {
    let Some(trend) = &bundle.trend else { return 0.8 };
    if trend.yearly_counts.is_empty() {
        return 0.8;
    }
    let counts: Vec<f64> = trend.yearly_counts.values().map(|&c| c as f64).collect();
    let mean = counts.iter().sum::<f64>() / counts.len() as f64;
    let max = counts.iter().cloned().fold(f64::MIN, f64::max);
    let min = counts.iter().cloned().fold(f64::MAX, f64::min);
    if mean == 0.0 {
        return 0.8;
    }
    if max <= mean * 5.0 && min >= mean * 0.1 {
        0.9
    } else if max <= mean * 10.0 && min >= mean * 0.05 {
        0.7
    } else {
        0.5
    }
}

fn confidence_interval_validity(bundle: &AnalysisBundle) -> f64 {
    let Some(trend) = &bundle.trend else { return 0.7 };
    if trend.predictions.is_empty() {
        return 0.7;
    }
    if trend.confidence >= 0.8 {
        0.9
    } else if trend.confidence >= 0.5 {
        0.7
    } else {
        0.5
    }
}

pub struct ValidityCheck {
    pub overall: f64,
    pub checks: HashMap<String, f64>,
}

pub fn check(bundle: &AnalysisBundle) -> ValidityCheck {
    let mut checks = HashMap::new();
    checks.insert("sample_size".to_string(), sample_size_validity(bundle));
    checks.insert("statistical_significance".to_string(), statistical_significance(bundle));
    checks.insert("distribution_validity".to_string(), distribution_validity(bundle));
    checks.insert("confidence_intervals".to_string(), confidence_interval_validity(bundle));

    let overall = checks.values().sum::<f64>() / checks.len() as f64;
    ValidityCheck { overall, checks }
}
