//! Wires normalization, concentration metrics, typing, activity scoring,
//! emerging-applicant detection, competitor similarity, and temporal
//! competition into the single `analyze` entry point (spec §4.7).

use crate::activity::{self, YearlyApplicantCounts};
use crate::concentration;
use crate::metrics::CompetitionAnalyzerMetrics;
use crate::normalize::normalize_applicant;
use crate::similarity;
use crate::temporal;
use crate::typing;
use patentflow_common::{CompetitionResult, CoreError, CoreResult, PatentRecord};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// How many top applicants get a `type`/`activity_score` entry (spec
/// §4.7 "top 20"/"top 50" passes, unified to one configurable cap).
const TOP_APPLICANTS_FOR_TYPING: usize = 50;
const TOP_APPLICANTS_FOR_ACTIVITY: usize = 20;

pub struct CompetitionAnalyzer {
    metrics: CompetitionAnalyzerMetrics,
}

impl CompetitionAnalyzer {
    pub fn new() -> Self {
        Self { metrics: CompetitionAnalyzerMetrics::new() }
    }

    pub fn metrics(&self) -> &CompetitionAnalyzerMetrics {
        &self.metrics
    }

    pub fn analyze(&self, records: &[PatentRecord]) -> CoreResult<CompetitionResult> {
        let started = std::time::Instant::now();
        let result = self.analyze_inner(records);
        self.metrics.record(result.is_ok(), started.elapsed().as_secs_f64());
        if let Err(err) = &result {
            info!(error = %err, "competition analysis returned insufficient_data");
        }
        result
    }

    fn analyze_inner(&self, records: &[PatentRecord]) -> CoreResult<CompetitionResult> {
        if records.is_empty() {
            return Err(CoreError::insufficient_data("no patent records to analyze"));
        }

        let mut applicant_counts: HashMap<String, u64> = HashMap::new();
        let mut applicant_years: HashMap<String, HashSet<i32>> = HashMap::new();
        let mut applicant_countries: HashMap<String, HashSet<String>> = HashMap::new();
        let mut applicant_ipc_prefixes: HashMap<String, HashSet<String>> = HashMap::new();
        let mut yearly_applicant_counts: YearlyApplicantCounts = HashMap::new();

        for record in records {
            let Some(raw) = record.applicants.first() else { continue };
            let applicant = normalize_applicant(raw);
            if applicant.is_empty() {
                continue;
            }
            *applicant_counts.entry(applicant.clone()).or_insert(0) += 1;

            if let Some(year) = record.year() {
                applicant_years.entry(applicant.clone()).or_default().insert(year);
                *yearly_applicant_counts.entry(year).or_default().entry(applicant.clone()).or_insert(0) += 1;
            }
            applicant_countries.entry(applicant.clone()).or_default().insert(record.country.clone());
            for ipc in &record.ipc_classes {
                let prefix = ipc.chars().take(4).collect::<String>();
                if !prefix.is_empty() {
                    applicant_ipc_prefixes.entry(applicant.clone()).or_default().insert(prefix);
                }
            }
        }

        if applicant_counts.is_empty() {
            return Err(CoreError::insufficient_data("no applicants could be normalized"));
        }

        let concentration_metrics = concentration::compute(&applicant_counts);
        let concentration_level = concentration::concentration_level(concentration_metrics.hhi, concentration_metrics.cr4);

        let mut ranked: Vec<(&String, &u64)> = applicant_counts.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        let applicant_types: HashMap<String, String> = ranked
            .iter()
            .take(TOP_APPLICANTS_FOR_TYPING)
            .map(|(name, _)| ((*name).clone(), typing::classify(name).to_string()))
            .collect();

        let activity_scores: HashMap<String, f64> = ranked
            .iter()
            .take(TOP_APPLICANTS_FOR_ACTIVITY)
            .map(|(name, &count)| {
                let years = applicant_years.get(*name).map(|s| s.len()).unwrap_or(0);
                let countries = applicant_countries.get(*name).map(|s| s.len()).unwrap_or(0);
                let tech_areas = applicant_ipc_prefixes.get(*name).map(|s| s.len()).unwrap_or(0);
                ((*name).clone(), activity::activity_score(count, years, countries, tech_areas))
            })
            .collect();

        let emerging_applicants = activity::emerging_applicants(&yearly_applicant_counts);
        let competitor_pairs = similarity::competitor_pairs(&applicant_ipc_prefixes);
        let yearly_competition = temporal::analyze(&yearly_applicant_counts);

        Ok(CompetitionResult {
            applicant_counts,
            hhi: concentration_metrics.hhi,
            cr4: concentration_metrics.cr4,
            cr8: concentration_metrics.cr8,
            gini: concentration_metrics.gini,
            concentration_level: concentration_level.to_string(),
            applicant_types,
            activity_scores,
            emerging_applicants,
            competitor_pairs,
            yearly_competition,
        })
    }
}

impl Default for CompetitionAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(applicant: &str, year: &str, ipc: &[&str]) -> PatentRecord {
        PatentRecord {
            applicants: vec![applicant.to_string()],
            application_date: year.to_string(),
            country: "CN".to_string(),
            ipc_classes: ipc.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    /// S2 HHI scenario (spec §8): A=50, B=30, C=20 patents.
    #[test]
    fn s2_hhi_scenario_end_to_end() {
        let analyzer = CompetitionAnalyzer::new();
        let mut records = Vec::new();
        for (name, count) in [("A Inc.", 50), ("B Inc.", 30), ("C Inc.", 20)] {
            for _ in 0..count {
                records.push(record(name, "2021", &["G06F1234"]));
            }
        }
        let result = analyzer.analyze(&records).unwrap();
        assert!((result.hhi - 0.38).abs() < 1e-9);
        assert!((result.cr4 - 1.0).abs() < 1e-9);
        assert_eq!(result.concentration_level, "高度集中");
    }

    #[test]
    fn empty_input_is_insufficient_data() {
        let analyzer = CompetitionAnalyzer::new();
        let err = analyzer.analyze(&[]).unwrap_err();
        assert_eq!(err.kind, patentflow_common::ErrorKind::InsufficientData);
    }

    #[test]
    fn applicant_suffixes_are_normalized_before_counting() {
        let analyzer = CompetitionAnalyzer::new();
        let records = vec![
            record("华为技术有限公司", "2022", &["H04L0001"]),
            record("华为技术", "2022", &["H04L0002"]),
        ];
        let result = analyzer.analyze(&records).unwrap();
        assert_eq!(result.applicant_counts.get("华为技术"), Some(&2));
    }
}
