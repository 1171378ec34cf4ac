//! On-disk layout for exported reports (spec §6 "Persisted state
//! layout"): `reports/`, `versions/`, `temp/`, `assets/` under an
//! `output_dir`, with `storage_index.json` and `versions_index.json`
//! manifests kept in sync with what's actually on disk.

use crate::types::{ExportedFile, VersionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageIndex {
    pub reports: HashMap<String, Vec<ExportedFile>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionIndexRecord {
    pub version_id: String,
    pub version_number: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: VersionStatus,
    pub files: HashMap<String, ExportedFile>,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionsIndexEntry {
    pub created_at: DateTime<Utc>,
    pub latest_version: u32,
    pub versions: Vec<VersionIndexRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionsIndex {
    pub reports: HashMap<String, VersionsIndexEntry>,
}

pub struct ReportStorage {
    output_dir: PathBuf,
}

impl ReportStorage {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into() }
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.output_dir.join("reports")
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.output_dir.join("versions")
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.output_dir.join("temp")
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.output_dir.join("assets")
    }

    fn storage_index_path(&self) -> PathBuf {
        self.reports_dir().join("storage_index.json")
    }

    fn versions_index_path(&self) -> PathBuf {
        self.versions_dir().join("versions_index.json")
    }

    /// `<output_dir>/reports/<report_id>_v<N>.<ext>`.
    pub fn report_file_path(&self, report_id: &str, version_number: u32, extension: &str) -> PathBuf {
        self.reports_dir().join(format!("{report_id}_v{version_number}.{extension}"))
    }

    /// `<output_dir>/versions/<report_id>/v<N>/<filename>`.
    pub fn version_artifact_path(&self, report_id: &str, version_number: u32, filename: &str) -> PathBuf {
        self.versions_dir().join(report_id).join(format!("v{version_number}")).join(filename)
    }

    pub async fn ensure_layout(&self) -> std::io::Result<()> {
        for dir in [self.reports_dir(), self.versions_dir(), self.temp_dir(), self.assets_dir()] {
            tokio::fs::create_dir_all(&dir).await?;
        }
        Ok(())
    }

    pub async fn write_file(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, bytes).await
    }

    pub async fn delete_file(&self, path: &Path) -> std::io::Result<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Removes everything under `temp/` (spec §5 "temp files cleaned
    /// after any export operation").
    pub async fn clean_temp(&self) -> std::io::Result<()> {
        let temp_dir = self.temp_dir();
        if tokio::fs::metadata(&temp_dir).await.is_ok() {
            tokio::fs::remove_dir_all(&temp_dir).await?;
        }
        tokio::fs::create_dir_all(&temp_dir).await
    }

    pub async fn load_storage_index(&self) -> StorageIndex {
        self.load_json(&self.storage_index_path()).await.unwrap_or_default()
    }

    pub async fn save_storage_index(&self, index: &StorageIndex) -> std::io::Result<()> {
        self.save_json(&self.storage_index_path(), index).await
    }

    pub async fn load_versions_index(&self) -> VersionsIndex {
        self.load_json(&self.versions_index_path()).await.unwrap_or_default()
    }

    pub async fn save_versions_index(&self, index: &VersionsIndex) -> std::io::Result<()> {
        self.save_json(&self.versions_index_path(), index).await
    }

    async fn load_json<T: for<'de> Deserialize<'de>>(&self, path: &Path) -> Option<T> {
        let bytes = tokio::fs::read(path).await.ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    async fn save_json<T: Serialize>(&self, path: &Path, value: &T) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(value).unwrap_or_default();
        tokio::fs::write(path, bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn layout_creates_all_four_directories() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ReportStorage::new(dir.path());
        storage.ensure_layout().await.unwrap();
        for sub in ["reports", "versions", "temp", "assets"] {
            assert!(dir.path().join(sub).is_dir());
        }
    }

    #[tokio::test]
    async fn storage_index_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ReportStorage::new(dir.path());
        storage.ensure_layout().await.unwrap();
        let mut index = StorageIndex::default();
        index.reports.insert(
            "r1".to_string(),
            vec![ExportedFile { path: "r1_v1.html".to_string(), size: 10, hash: "abc".to_string(), format: "html".to_string() }],
        );
        storage.save_storage_index(&index).await.unwrap();
        let loaded = storage.load_storage_index().await;
        assert_eq!(loaded.reports.get("r1").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn clean_temp_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ReportStorage::new(dir.path());
        storage.ensure_layout().await.unwrap();
        storage.write_file(&storage.temp_dir().join("scratch.txt"), b"x").await.unwrap();
        storage.clean_temp().await.unwrap();
        assert_eq!(tokio::fs::read_dir(storage.temp_dir()).await.unwrap().next_entry().await.unwrap(), None);
    }
}
