//! Anomaly detection across an analysis bundle (spec §4.9): extreme
//! growth rates, extreme concentration, outlier counts, zero-count
//! years, and cross-module logical contradictions.

use patentflow_common::AnalysisBundle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    pub severity: Severity,
    pub description: String,
    pub module: String,
}

pub fn detect(bundle: &AnalysisBundle) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    if let Some(trend) = &bundle.trend {
        for (year, rate) in &trend.growth_rates {
            if rate.abs() > 500.0 {
                anomalies.push(Anomaly {
                    severity: Severity::Critical,
                    description: format!("{year} growth rate is extreme: {rate:.1}%"),
                    module: "trend".to_string(),
                });
            } else if rate.abs() > 200.0 {
                anomalies.push(Anomaly {
                    severity: Severity::Warning,
                    description: format!("{year} growth rate is high: {rate:.1}%"),
                    module: "trend".to_string(),
                });
            }
        }
        if !trend.yearly_counts.is_empty() {
            let mean = trend.yearly_counts.values().sum::<u64>() as f64 / trend.yearly_counts.len() as f64;
            let mut years: Vec<i32> = trend.yearly_counts.keys().copied().collect();
            years.sort_unstable();
            for year in years {
                let count = trend.yearly_counts[&year];
                if count as f64 > mean * 10.0 {
                    anomalies.push(Anomaly {
                        severity: Severity::Critical,
                        description: format!("trend module {year} is anomalously high: {count}"),
                        module: "trend".to_string(),
                    });
                } else if count == 0 && mean > 5.0 {
                    anomalies.push(Anomaly {
                        severity: Severity::Warning,
                        description: format!("trend module {year} has zero patents"),
                        module: "trend".to_string(),
                    });
                }
            }
        }
    }

    if let Some(competition) = &bundle.competition {
        if competition.hhi > 0.95 {
            anomalies.push(Anomaly {
                severity: Severity::Warning,
                description: format!("market concentration is extreme: {:.3}", competition.hhi),
                module: "competition".to_string(),
            });
        } else if competition.hhi < 0.01 {
            anomalies.push(Anomaly {
                severity: Severity::Warning,
                description: format!("market concentration is extremely low: {:.3}", competition.hhi),
                module: "competition".to_string(),
            });
        }
    }

    if let (Some(trend), Some(competition)) = (&bundle.trend, &bundle.competition) {
        let rapidly_increasing = trend.direction == "increasing" && trend.direction_strength > 0.7;
        if rapidly_increasing && competition.hhi > 0.9 {
            anomalies.push(Anomaly {
                severity: Severity::Warning,
                description: "rapid growth contradicts a near-monopoly market".to_string(),
                module: "trend,competition".to_string(),
            });
        }
        if trend.direction == "decreasing" && competition.hhi < 0.2 {
            anomalies.push(Anomaly {
                severity: Severity::Warning,
                description: "declining trend contradicts a highly fragmented market".to_string(),
                module: "trend,competition".to_string(),
            });
        }
    }

    anomalies
}
