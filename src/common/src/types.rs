//! Cross-cutting data model shared by every analyzer and the report
//! pipeline (spec §3).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single patent application as seen by the analyzers and the search
/// aggregator. Only `application_number`/`title`/`applicants`/
/// `application_date`/`ipc_classes`/`country` are required by spec §3;
/// the rest are optional enrichments.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PatentRecord {
    pub application_number: String,
    pub title: String,
    pub applicants: Vec<String>,
    pub application_date: String,
    pub ipc_classes: Vec<String>,
    pub country: String,
    pub abstract_text: Option<String>,
    pub inventors: Vec<String>,
    pub publication_date: Option<String>,
    pub status: Option<String>,
}

impl PatentRecord {
    /// Parses `application_date`, accepting `YYYY-MM-DD`, `YYYY-MM` or
    /// `YYYY` (spec §4.6 preprocessing step).
    pub fn parsed_date(&self) -> Option<ParsedDate> {
        parse_flexible_date(&self.application_date)
    }

    pub fn year(&self) -> Option<i32> {
        self.parsed_date().map(|d| d.0)
    }
}

/// Parses a flexible `YYYY[-MM[-DD]]` date, defaulting missing
/// month/day to January 1st so every record still contributes a year.
/// Returns `(year, NaiveDate)`-shaped data via a small wrapper tuple
/// struct so callers that only need the year avoid a second parse.
pub struct ParsedDate(pub i32, pub NaiveDate);

fn parse_flexible_date(raw: &str) -> Option<ParsedDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(ParsedDate(d.format("%Y").to_string().parse().ok()?, d));
    }
    if let Ok(d) = chrono::NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d") {
        return Some(ParsedDate(d.format("%Y").to_string().parse().ok()?, d));
    }
    if let Ok(year) = raw.parse::<i32>() {
        let d = NaiveDate::from_ymd_opt(year, 1, 1)?;
        return Some(ParsedDate(year, d));
    }
    None
}

// `NaiveDate` destructuring convenience: treat `ParsedDate` like a plain date.
impl std::ops::Deref for ParsedDate {
    type Target = NaiveDate;
    fn deref(&self) -> &NaiveDate {
        &self.1
    }
}

/// Yearly counts keyed by calendar year.
pub type YearlyCounts = HashMap<i32, u64>;

/// A trend-analysis result variant (spec §3 `AnalysisResult`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrendResult {
    pub yearly_counts: YearlyCounts,
    pub monthly_counts: HashMap<String, u64>,
    pub quarterly_counts: HashMap<String, u64>,
    pub moving_average: HashMap<i32, f64>,
    pub growth_rates: HashMap<i32, f64>,
    pub trend_slope: f64,
    pub trend_r: f64,
    pub direction: String,
    pub direction_confidence: f64,
    pub direction_strength: f64,
    pub cagr: Option<f64>,
    pub pattern: String,
    pub predictions: HashMap<i32, f64>,
    pub prediction_spread: HashMap<i32, (f64, f64, f64)>,
    pub confidence: f64,
    pub confidence_grade: String,
    pub seasonality_present: bool,
    pub seasonality_coefficient: f64,
    pub outliers: Vec<TrendOutlier>,
    pub total_records: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendOutlier {
    pub year: i32,
    pub count: u64,
    pub direction: String,
    pub hypothesis: String,
}

/// A competition-analysis result variant.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompetitionResult {
    pub applicant_counts: HashMap<String, u64>,
    pub hhi: f64,
    pub cr4: f64,
    pub cr8: f64,
    pub gini: f64,
    pub concentration_level: String,
    pub applicant_types: HashMap<String, String>,
    pub activity_scores: HashMap<String, f64>,
    pub emerging_applicants: Vec<EmergingApplicant>,
    pub competitor_pairs: Vec<CompetitorPair>,
    pub yearly_competition: HashMap<i32, YearlyCompetition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergingApplicant {
    pub applicant: String,
    pub recent_count: u64,
    pub early_count: u64,
    pub growth_rate: f64,
    pub entrant_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorPair {
    pub a: String,
    pub b: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct YearlyCompetition {
    pub hhi: f64,
    pub new_entrants: u64,
    pub active_applicants: u64,
    pub competition_score: f64,
}

/// A technology-classification result variant.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TechnologyResult {
    pub ipc_distribution: HashMap<String, u64>,
    pub ipc_labels: HashMap<String, String>,
    pub keywords: Vec<String>,
    pub clusters: HashMap<String, Vec<String>>,
    pub main_technologies: Vec<String>,
    pub evolution: HashMap<String, HashMap<i32, u64>>,
    pub evolution_verdict: HashMap<String, String>,
}

/// A geographic-distribution result variant.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeographicResult {
    pub country_counts: HashMap<String, u64>,
}

/// Tagged union over the four analyzer outputs (spec §3, §9 "tagged
/// analysis results").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "variant")]
pub enum AnalysisResult {
    Trend(TrendResult),
    Competition(CompetitionResult),
    Technology(TechnologyResult),
    Geographic(GeographicResult),
}

/// Groups the variants produced by one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalysisBundle {
    pub run_id: String,
    pub trend: Option<TrendResult>,
    pub competition: Option<CompetitionResult>,
    pub technology: Option<TechnologyResult>,
    pub geographic: Option<GeographicResult>,
    pub created_at: Option<DateTime<Utc>>,
}

impl AnalysisBundle {
    pub fn modules_present(&self) -> usize {
        [
            self.trend.is_some(),
            self.competition.is_some(),
            self.technology.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}

/// Quality grade bands, partitioning `[0, 1]` per spec §8 invariant 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityGrade {
    Excellent,
    Good,
    Acceptable,
    Poor,
    Failed,
}

impl QualityGrade {
    /// `{<0.6 failed/poor, [0.7,0.8) acceptable, [0.8,0.9) good, >=0.9
    /// excellent}`. The `[0.6, 0.7)` band is `poor` (spec's partition
    /// leaves it implicit; the original source treats anything below
    /// the pass threshold but above zero as `poor` rather than `failed`,
    /// reserving `failed` for scores the statistical-validity dimension
    /// rejects outright).
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            QualityGrade::Excellent
        } else if score >= 0.8 {
            QualityGrade::Good
        } else if score >= 0.7 {
            QualityGrade::Acceptable
        } else if score >= 0.6 {
            QualityGrade::Poor
        } else {
            QualityGrade::Failed
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskBucket {
    pub high: Vec<String>,
    pub medium: Vec<String>,
    pub low: Vec<String>,
}

impl Default for RiskBucket {
    fn default() -> Self {
        Self {
            high: Vec::new(),
            medium: Vec::new(),
            low: Vec::new(),
        }
    }
}

/// Output of the quality controllers (spec §3 `QualityReport`, shared by
/// C9 and C10).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub overall_quality: f64,
    pub grade: QualityGrade,
    pub dimension_scores: HashMap<String, f64>,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
    pub risks: RiskBucket,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_partitions_unit_interval() {
        assert_eq!(QualityGrade::from_score(0.95), QualityGrade::Excellent);
        assert_eq!(QualityGrade::from_score(0.85), QualityGrade::Good);
        assert_eq!(QualityGrade::from_score(0.75), QualityGrade::Acceptable);
        assert_eq!(QualityGrade::from_score(0.65), QualityGrade::Poor);
        assert_eq!(QualityGrade::from_score(0.1), QualityGrade::Failed);
    }

    #[test]
    fn flexible_date_parses_year_only() {
        let rec = PatentRecord {
            application_date: "2021".into(),
            ..Default::default()
        };
        assert_eq!(rec.year(), Some(2021));
    }

    #[test]
    fn flexible_date_parses_year_month() {
        let rec = PatentRecord {
            application_date: "2021-07".into(),
            ..Default::default()
        };
        assert_eq!(rec.year(), Some(2021));
    }

    #[test]
    fn flexible_date_parses_full_date() {
        let rec = PatentRecord {
            application_date: "2021-07-15".into(),
            ..Default::default()
        };
        assert_eq!(rec.year(), Some(2021));
    }
}
