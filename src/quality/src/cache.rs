//! Cached quality-validation results keyed by `result_id` (spec §4.9):
//! TTL 3600s, capacity 1000, oldest-first eviction.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use md5::{Digest, Md5};
use patentflow_common::QualityReport;
use patentflow_common::AnalysisBundle;

const TTL_SECONDS: i64 = 3600;
const CAPACITY: usize = 1000;

/// `md5(canonical-json(analysis_results))[:16]` (spec §4.9). `serde_json`
/// without the `preserve_order` feature backs objects with a `BTreeMap`,
/// so `to_string` already yields key-sorted, deterministic output.
pub fn result_id(bundle: &AnalysisBundle) -> String {
    let canonical = serde_json::to_string(bundle).unwrap_or_default();
    let digest = Md5::digest(canonical.as_bytes());
    format!("{digest:x}")[..16].to_string()
}

struct CacheEntry {
    report: QualityReport,
    cached_at: DateTime<Utc>,
}

pub struct ResultCache {
    entries: DashMap<String, CacheEntry>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }

    pub fn get(&self, key: &str, now: DateTime<Utc>) -> Option<QualityReport> {
        let expired = self
            .entries
            .get(key)
            .map(|entry| (now - entry.cached_at).num_seconds() >= TTL_SECONDS)
            .unwrap_or(false);
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| entry.report.clone())
    }

    pub fn insert(&self, key: String, report: QualityReport, now: DateTime<Utc>) {
        self.entries.insert(key, CacheEntry { report, cached_at: now });
        if self.entries.len() > CAPACITY {
            if let Some(oldest_key) = self.entries.iter().min_by_key(|e| e.cached_at).map(|e| e.key().clone()) {
                self.entries.remove(&oldest_key);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patentflow_common::{QualityGrade, RiskBucket};
    use std::collections::HashMap;

    fn report(score: f64) -> QualityReport {
        QualityReport {
            overall_quality: score,
            grade: QualityGrade::from_score(score),
            dimension_scores: HashMap::new(),
            issues: Vec::new(),
            recommendations: Vec::new(),
            risks: RiskBucket::default(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn same_bundle_yields_same_id() {
        let bundle = AnalysisBundle::default();
        assert_eq!(result_id(&bundle), result_id(&bundle));
        assert_eq!(result_id(&bundle).len(), 16);
    }

    #[test]
    fn expired_entries_are_evicted_on_read() {
        let cache = ResultCache::new();
        let now = Utc::now();
        cache.insert("k".to_string(), report(0.9), now);
        assert!(cache.get("k", now).is_some());
        assert!(cache.get("k", now + chrono::Duration::seconds(3601)).is_none());
    }

    #[test]
    fn capacity_evicts_oldest() {
        let cache = ResultCache::new();
        let now = Utc::now();
        cache.insert("a".to_string(), report(0.5), now);
        cache.insert("b".to_string(), report(0.5), now + chrono::Duration::seconds(1));
        assert_eq!(cache.len(), 2);
    }
}
