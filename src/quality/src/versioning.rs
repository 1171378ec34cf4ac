//! Per-`result_id` version history (spec §4.9): retained for
//! `version_retention_days` (30), with at least the 3 most recent
//! versions always kept regardless of age.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use patentflow_common::{AnalysisBundle, QualityGrade};

const RETENTION_DAYS: i64 = 30;
const MIN_KEPT: usize = 3;

#[derive(Clone)]
pub struct VersionRecord {
    pub version_id: String,
    pub timestamp: DateTime<Utc>,
    pub bundle: AnalysisBundle,
    pub quality_score: f64,
    pub grade: QualityGrade,
}

pub struct VersionStore {
    history: DashMap<String, Mutex<Vec<VersionRecord>>>,
}

impl VersionStore {
    pub fn new() -> Self {
        Self { history: DashMap::new() }
    }

    pub fn record(&self, result_id: &str, bundle: AnalysisBundle, quality_score: f64, grade: QualityGrade, now: DateTime<Utc>) {
        let entry = self.history.entry(result_id.to_string()).or_insert_with(|| Mutex::new(Vec::new()));
        let mut versions = entry.lock();
        let version_id = format!("{result_id}_v{}", versions.len() + 1);
        versions.push(VersionRecord { version_id, timestamp: now, bundle, quality_score, grade });

        if versions.len() > MIN_KEPT {
            let cutoff = now - chrono::Duration::days(RETENTION_DAYS);
            let kept_from_age = versions.iter().filter(|v| v.timestamp >= cutoff).count();
            if kept_from_age < MIN_KEPT {
                let drop = versions.len() - MIN_KEPT;
                versions.drain(..drop);
            } else {
                versions.retain(|v| v.timestamp >= cutoff);
            }
        }
    }

    /// The previous version's bundle (the one recorded just before the
    /// current call to `record`), used by the temporal-stability check.
    pub fn previous(&self, result_id: &str) -> Option<AnalysisBundle> {
        self.history.get(result_id).and_then(|versions| {
            let versions = versions.lock();
            versions.iter().rev().nth(1).map(|v| v.bundle.clone())
        })
    }

    pub fn history(&self, result_id: &str) -> Vec<VersionRecord> {
        self.history.get(result_id).map(|v| v.lock().clone()).unwrap_or_default()
    }
}

impl Default for VersionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previous_is_none_on_first_version() {
        let store = VersionStore::new();
        let now = Utc::now();
        store.record("r1", AnalysisBundle::default(), 0.8, QualityGrade::Good, now);
        assert!(store.previous("r1").is_none());
    }

    #[test]
    fn previous_returns_the_version_before_the_latest() {
        let store = VersionStore::new();
        let now = Utc::now();
        store.record("r1", AnalysisBundle::default(), 0.5, QualityGrade::Poor, now);
        store.record("r1", AnalysisBundle::default(), 0.9, QualityGrade::Excellent, now + chrono::Duration::seconds(1));
        let previous = store.previous("r1");
        assert!(previous.is_some());
        assert_eq!(store.history("r1").len(), 2);
    }

    #[test]
    fn at_least_three_versions_survive_expiry() {
        let store = VersionStore::new();
        let old = Utc::now() - chrono::Duration::days(90);
        store.record("r1", AnalysisBundle::default(), 0.5, QualityGrade::Poor, old);
        store.record("r1", AnalysisBundle::default(), 0.5, QualityGrade::Poor, old + chrono::Duration::seconds(1));
        store.record("r1", AnalysisBundle::default(), 0.5, QualityGrade::Poor, old + chrono::Duration::seconds(2));
        store.record("r1", AnalysisBundle::default(), 0.5, QualityGrade::Poor, old + chrono::Duration::seconds(3));
        assert_eq!(store.history("r1").len(), 3);
    }
}
