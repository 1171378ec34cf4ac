//! Wires completeness, consistency, statistical-validity,
//! logical-coherence, and temporal-stability into one weighted
//! `QualityReport`, with result caching, versioning, and anomaly
//! detection layered on top (spec §4.9).

use crate::anomaly::{self, Severity};
use crate::cache::{self, ResultCache};
use crate::versioning::VersionStore;
use crate::{completeness, consistency, logical_coherence, statistical_validity, temporal_stability};
use crate::metrics::AnalysisQualityControllerMetrics;
use patentflow_common::{AnalysisBundle, Clock, QualityGrade, QualityReport, RiskBucket};
use std::sync::Arc;

const COMPLETENESS_WEIGHT: f64 = 0.25;
const CONSISTENCY_WEIGHT: f64 = 0.25;
const VALIDITY_WEIGHT: f64 = 0.20;
const COHERENCE_WEIGHT: f64 = 0.15;
const STABILITY_WEIGHT: f64 = 0.15;

pub struct AnalysisQualityControllerConfig {
    /// Resolves spec.md §9's Open Question on the pass-threshold
    /// literal: a configurable knob rather than a hardcoded 0.7.
    pub configurable_pass_threshold: f64,
}

impl Default for AnalysisQualityControllerConfig {
    fn default() -> Self {
        Self { configurable_pass_threshold: 0.7 }
    }
}

pub struct AnalysisQualityController {
    config: AnalysisQualityControllerConfig,
    cache: ResultCache,
    versions: VersionStore,
    metrics: AnalysisQualityControllerMetrics,
    clock: Arc<dyn Clock>,
}

impl AnalysisQualityController {
    pub fn new(config: AnalysisQualityControllerConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, cache: ResultCache::new(), versions: VersionStore::new(), metrics: AnalysisQualityControllerMetrics::new(), clock }
    }

    pub fn metrics(&self) -> &AnalysisQualityControllerMetrics {
        &self.metrics
    }

    pub fn validate(&self, bundle: &AnalysisBundle) -> QualityReport {
        let started = std::time::Instant::now();
        let now = self.clock.now();
        let result_id = cache::result_id(bundle);

        if let Some(cached) = self.cache.get(&result_id, now) {
            self.metrics.record(cached.overall_quality >= self.config.configurable_pass_threshold, started.elapsed().as_secs_f64());
            return cached;
        }

        let completeness = completeness::check(bundle);
        let consistency = consistency::check(bundle);
        let validity = statistical_validity::check(bundle);
        let coherence = logical_coherence::check(bundle);
        let previous = self.versions.previous(&result_id);
        let stability = temporal_stability::check(bundle, previous.as_ref());
        let anomalies = anomaly::detect(bundle);

        let overall_quality = completeness.overall * COMPLETENESS_WEIGHT
            + consistency.overall * CONSISTENCY_WEIGHT
            + validity.overall * VALIDITY_WEIGHT
            + coherence.overall * COHERENCE_WEIGHT
            + stability.score * STABILITY_WEIGHT;
        let overall_quality = overall_quality.clamp(0.0, 1.0);
        let grade = QualityGrade::from_score(overall_quality);

        let mut dimension_scores = std::collections::HashMap::new();
        dimension_scores.insert("completeness".to_string(), completeness.overall);
        dimension_scores.insert("consistency".to_string(), consistency.overall);
        dimension_scores.insert("statistical_validity".to_string(), validity.overall);
        dimension_scores.insert("logical_coherence".to_string(), coherence.overall);
        dimension_scores.insert("temporal_stability".to_string(), stability.score);

        let issues: Vec<String> = anomalies.iter().map(|a| a.description.clone()).collect();
        let recommendations = recommendations_for(&completeness, &consistency, &validity, &coherence, &anomalies);
        let risks = risks_for(&completeness, &consistency, &validity, &anomalies);

        let report = QualityReport { overall_quality, grade, dimension_scores, issues, recommendations, risks, timestamp: now };

        self.versions.record(&result_id, bundle.clone(), overall_quality, grade, now);
        self.cache.insert(result_id, report.clone(), now);
        self.metrics.record(overall_quality >= self.config.configurable_pass_threshold, started.elapsed().as_secs_f64());
        report
    }
}

fn recommendations_for(
    completeness: &completeness::CompletenessCheck,
    consistency: &consistency::ConsistencyCheck,
    validity: &statistical_validity::ValidityCheck,
    coherence: &logical_coherence::CoherenceCheck,
    anomalies: &[anomaly::Anomaly],
) -> Vec<String> {
    let mut recommendations = Vec::new();
    if completeness.overall < 0.8 {
        let missing: Vec<&str> = ["trend", "competition", "technology"]
            .into_iter()
            .filter(|m| !completeness.present_modules.iter().any(|p| p == m))
            .collect();
        if !missing.is_empty() {
            recommendations.push(format!("add {} analysis to improve completeness", missing.join(", ")));
        }
    }
    if consistency.overall < 0.7 {
        recommendations.push("check data sources and time ranges across analysis modules for consistency".to_string());
    }
    if validity.overall < 0.7 {
        recommendations.push("increase sample size or refine methodology to improve statistical validity".to_string());
    }
    if coherence.overall < 0.7 {
        recommendations.push("review cross-module conclusions for logical consistency".to_string());
    }
    let critical = anomalies.iter().filter(|a| a.severity == Severity::Critical).count();
    let warning = anomalies.iter().filter(|a| a.severity == Severity::Warning).count();
    if critical > 0 {
        recommendations.push("critical anomalies detected, review data quality before relying on this report".to_string());
    } else if warning > 2 {
        recommendations.push("multiple warning-level anomalies detected, consider data cleaning".to_string());
    }
    recommendations
}

fn risks_for(
    completeness: &completeness::CompletenessCheck,
    consistency: &consistency::ConsistencyCheck,
    validity: &statistical_validity::ValidityCheck,
    anomalies: &[anomaly::Anomaly],
) -> RiskBucket {
    let mut risks = RiskBucket::default();

    if completeness.overall < 0.6 {
        risks.high.push("data completeness is severely insufficient".to_string());
    } else if completeness.overall < 0.8 {
        risks.medium.push("data completeness could be improved".to_string());
    }

    if consistency.overall < 0.6 {
        risks.high.push("result consistency has serious problems".to_string());
    } else if consistency.overall < 0.8 {
        risks.medium.push("result consistency needs improvement".to_string());
    }

    let critical = anomalies.iter().filter(|a| a.severity == Severity::Critical).count();
    let warning = anomalies.iter().filter(|a| a.severity == Severity::Warning).count();
    if critical > 0 {
        risks.high.push(format!("{critical} critical anomalies present"));
    } else if warning > 3 {
        risks.medium.push(format!("{warning} warning-level anomalies present"));
    } else if warning > 0 {
        risks.low.push(format!("{warning} minor anomalies present"));
    }

    if validity.overall < 0.6 {
        risks.high.push("statistical validity is insufficient".to_string());
    } else if validity.overall < 0.8 {
        risks.medium.push("statistical validity could be improved".to_string());
    }

    risks
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use patentflow_common::fakes::FixedClock;
    use patentflow_common::{CompetitionResult, TrendResult};

    #[test]
    fn empty_bundle_yields_low_quality_report() {
        let controller =
            AnalysisQualityController::new(AnalysisQualityControllerConfig::default(), Arc::new(FixedClock::new(Utc::now())));
        let report = controller.validate(&AnalysisBundle::default());
        assert!(report.overall_quality < 0.5);
        assert!(!risks_for(
            &completeness::check(&AnalysisBundle::default()),
            &consistency::check(&AnalysisBundle::default()),
            &statistical_validity::check(&AnalysisBundle::default()),
            &[]
        )
        .high
        .is_empty());
    }

    #[test]
    fn validation_is_cached_for_the_same_bundle() {
        let controller =
            AnalysisQualityController::new(AnalysisQualityControllerConfig::default(), Arc::new(FixedClock::new(Utc::now())));
        let bundle = AnalysisBundle {
            trend: Some(TrendResult {
                yearly_counts: (2000..2025).map(|y| (y, 10)).collect(),
                direction: "stable".into(),
                ..Default::default()
            }),
            competition: Some(CompetitionResult {
                applicant_counts: (0..20).map(|i| (format!("applicant-{i}"), 5)).collect(),
                concentration_level: "适度集中".into(),
                hhi: 0.3,
                ..Default::default()
            }),
            ..Default::default()
        };
        let first = controller.validate(&bundle);
        let second = controller.validate(&bundle);
        assert_eq!(first.overall_quality, second.overall_quality);
        assert_eq!(first.timestamp, second.timestamp);
    }
}
