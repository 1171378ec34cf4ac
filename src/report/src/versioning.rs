//! In-memory version history backing the persisted `versions_index.json`
//! (spec §3 `ReportVersion`, §5 "report versions ≤ 5 per `report_id`").
//! Retention deletes both the index entry and the underlying files of
//! every evicted version (spec §4.11 "Deletion cleans both the main
//! file and its associated versions").

use crate::storage::ReportStorage;
use crate::types::ReportVersion;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

pub const DEFAULT_MAX_VERSIONS: usize = 5;

pub struct VersionManager {
    storage: Arc<ReportStorage>,
    max_versions: usize,
    versions: DashMap<String, Mutex<Vec<ReportVersion>>>,
}

impl VersionManager {
    pub fn new(storage: Arc<ReportStorage>, max_versions: usize) -> Self {
        Self { storage, max_versions, versions: DashMap::new() }
    }

    pub fn next_version_number(&self, report_id: &str) -> u32 {
        self.versions
            .get(report_id)
            .map(|v| v.lock().iter().map(|r| r.version_number).max().unwrap_or(0) + 1)
            .unwrap_or(1)
    }

    /// Stores a new version, evicting and deleting the oldest version's
    /// files if the per-`report_id` cap is exceeded (spec §8 invariant 8:
    /// version numbers strictly increase; retention removes the oldest
    /// first).
    pub async fn record(&self, version: ReportVersion) {
        let report_id = version.report_id.clone();
        let entry = self.versions.entry(report_id).or_insert_with(|| Mutex::new(Vec::new()));
        let evicted = {
            let mut versions = entry.lock();
            versions.push(version);
            versions.sort_by_key(|v| v.version_number);
            if versions.len() > self.max_versions {
                let drop = versions.len() - self.max_versions;
                versions.drain(..drop).collect::<Vec<_>>()
            } else {
                Vec::new()
            }
        };
        for old in evicted {
            for file in old.files.values() {
                let _ = self.storage.delete_file(std::path::Path::new(&file.path)).await;
            }
        }
    }

    pub fn history(&self, report_id: &str) -> Vec<ReportVersion> {
        self.versions.get(report_id).map(|v| v.lock().clone()).unwrap_or_default()
    }

    pub fn latest(&self, report_id: &str) -> Option<ReportVersion> {
        self.history(report_id).into_iter().max_by_key(|v| v.version_number)
    }

    /// Deletes every version and file for `report_id` (spec §4.11
    /// "Deletion cleans both the main file and its associated versions").
    pub async fn delete_report(&self, report_id: &str) {
        if let Some((_, versions)) = self.versions.remove(report_id) {
            for version in versions.into_inner() {
                for file in version.files.values() {
                    let _ = self.storage.delete_file(std::path::Path::new(&file.path)).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VersionStatus;
    use chrono::Utc;
    use std::collections::HashMap;

    fn version(report_id: &str, number: u32) -> ReportVersion {
        ReportVersion {
            report_id: report_id.to_string(),
            version_number: number,
            created_at: Utc::now(),
            status: VersionStatus::Completed,
            files: HashMap::new(),
            parameters: serde_json::Value::Null,
        }
    }

    #[tokio::test]
    async fn version_numbers_strictly_increase() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(ReportStorage::new(dir.path()));
        let manager = VersionManager::new(storage, DEFAULT_MAX_VERSIONS);
        assert_eq!(manager.next_version_number("r1"), 1);
        manager.record(version("r1", 1)).await;
        assert_eq!(manager.next_version_number("r1"), 2);
        manager.record(version("r1", 2)).await;
        assert_eq!(manager.history("r1").len(), 2);
    }

    #[tokio::test]
    async fn retention_evicts_oldest_past_the_cap() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(ReportStorage::new(dir.path()));
        let manager = VersionManager::new(storage, 3);
        for n in 1..=5 {
            manager.record(version("r1", n)).await;
        }
        let history = manager.history("r1");
        assert_eq!(history.len(), 3);
        assert_eq!(history.iter().map(|v| v.version_number).min(), Some(3));
        assert_eq!(manager.latest("r1").unwrap().version_number, 5);
    }
}
