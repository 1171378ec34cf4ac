//! Layered configuration (spec §2 ambient stack): defaults, overridden by
//! an optional TOML file, overridden by `PATENTFLOW__`-prefixed
//! environment variables — the same env-over-file shape
//! `platform::config`/`utils::config` use in the platform workspace,
//! built here from `toml`+`serde` directly rather than a config-merging
//! crate, since none is in the dependency stack we carried over.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATH: &str = "config/patentflow.toml";
const ENV_PREFIX: &str = "PATENTFLOW__";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatentflowConfig {
    pub metadata: MetadataSettings,
    pub observability: ObservabilitySettings,
    pub collab: CollabSettings,
    pub balancer: BalancerSettings,
    pub search: SearchSettings,
    pub trend: TrendSettings,
    pub quality: QualitySettings,
    pub workflow_quality: WorkflowQualitySettings,
    pub report: ReportSettings,
}

impl Default for PatentflowConfig {
    fn default() -> Self {
        Self {
            metadata: MetadataSettings::default(),
            observability: ObservabilitySettings::default(),
            collab: CollabSettings::default(),
            balancer: BalancerSettings::default(),
            search: SearchSettings::default(),
            trend: TrendSettings::default(),
            quality: QualitySettings::default(),
            workflow_quality: WorkflowQualitySettings::default(),
            report: ReportSettings::default(),
        }
    }
}

impl PatentflowConfig {
    pub fn load() -> Result<Self> {
        Self::load_from_path(None::<PathBuf>)
    }

    pub fn load_from_path<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut value = toml::Value::Table(Default::default());

        let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_path.is_file() {
            merge_file(&mut value, &default_path)?;
        }
        if let Some(path) = path {
            merge_file(&mut value, path.as_ref())?;
        }

        merge_env(&mut value, ENV_PREFIX);

        value.try_into().context("invalid patentflow configuration")
    }
}

fn merge_file(base: &mut toml::Value, path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let parsed: toml::Value = toml::from_str(&text)
        .with_context(|| format!("parsing config file {}", path.display()))?;
    merge_values(base, parsed);
    Ok(())
}

/// Overlays `PATENTFLOW__section__key=value` environment variables onto
/// `base`, splitting on `__` to address nested tables.
fn merge_env(base: &mut toml::Value, prefix: &str) {
    for (key, raw_value) in std::env::vars() {
        let Some(path) = key.strip_prefix(prefix) else { continue };
        let segments: Vec<String> = path.split("__").map(|s| s.to_lowercase()).collect();
        if segments.is_empty() {
            continue;
        }
        set_path(base, &segments, env_scalar(&raw_value));
    }
}

fn env_scalar(raw: &str) -> toml::Value {
    if let Ok(b) = raw.parse::<bool>() {
        toml::Value::Boolean(b)
    } else if let Ok(i) = raw.parse::<i64>() {
        toml::Value::Integer(i)
    } else if let Ok(f) = raw.parse::<f64>() {
        toml::Value::Float(f)
    } else {
        toml::Value::String(raw.to_string())
    }
}

fn set_path(base: &mut toml::Value, segments: &[String], leaf: toml::Value) {
    if !base.is_table() {
        *base = toml::Value::Table(Default::default());
    }
    let table = base.as_table_mut().expect("just coerced to table");
    match segments.split_first() {
        Some((head, [])) => {
            table.insert(head.clone(), leaf);
        }
        Some((head, rest)) => {
            let entry = table.entry(head.clone()).or_insert_with(|| toml::Value::Table(Default::default()));
            set_path(entry, rest, leaf);
        }
        None => {}
    }
}

fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base_slot, overlay_value) => *base_slot = overlay_value,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataSettings {
    pub name: String,
    pub environment: String,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self { name: "patentflow".to_string(), environment: "development".to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilitySettings {
    pub log_level: String,
    pub metrics_port: u16,
    pub enable_metrics: bool,
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self { log_level: "info".to_string(), metrics_port: 9090, enable_metrics: true }
    }
}

/// Collaboration manager settings (spec §4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollabSettings {
    pub timeout_minutes: i64,
}

impl Default for CollabSettings {
    fn default() -> Self {
        Self { timeout_minutes: 5 }
    }
}

/// Per-worker default capacity (spec §5 resource caps: "default 5").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancerSettings {
    pub default_capacity: u32,
}

impl Default for BalancerSettings {
    fn default() -> Self {
        Self { default_capacity: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub default_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { default_limit: 20 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendSettings {
    pub moving_average_window: usize,
    pub prediction_horizon_years: usize,
}

impl Default for TrendSettings {
    fn default() -> Self {
        Self { moving_average_window: 3, prediction_horizon_years: 3 }
    }
}

/// Resolves spec.md §9's Open Question: C9's pass-threshold default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualitySettings {
    pub configurable_pass_threshold: f64,
}

impl Default for QualitySettings {
    fn default() -> Self {
        Self { configurable_pass_threshold: 0.7 }
    }
}

/// Resolves spec.md §9's Open Question: C10's pass-threshold default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowQualitySettings {
    pub configurable_pass_threshold: f64,
}

impl Default for WorkflowQualitySettings {
    fn default() -> Self {
        Self { configurable_pass_threshold: 0.6 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub output_dir: String,
    pub max_versions: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self { output_dir: "./output/reports".to_string(), max_versions: 5 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_constants() {
        let config = PatentflowConfig::default();
        assert_eq!(config.collab.timeout_minutes, 5);
        assert_eq!(config.balancer.default_capacity, 5);
        assert_eq!(config.quality.configurable_pass_threshold, 0.7);
        assert_eq!(config.workflow_quality.configurable_pass_threshold, 0.6);
        assert_eq!(config.report.max_versions, 5);
    }

    #[test]
    fn env_override_wins_over_default() {
        std::env::set_var("PATENTFLOW__OBSERVABILITY__METRICS_PORT", "9999");
        let mut value = toml::Value::Table(Default::default());
        merge_env(&mut value, ENV_PREFIX);
        std::env::remove_var("PATENTFLOW__OBSERVABILITY__METRICS_PORT");
        let config: PatentflowConfig = value.try_into().unwrap();
        assert_eq!(config.observability.metrics_port, 9999);
    }
}
