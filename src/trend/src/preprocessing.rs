//! Parses and validates the raw patent series (spec §4.6 preprocessing),
//! ported from `trend_analyzer.py`'s `_preprocess_patent_data` /
//! `_validate_data_quality` / `_get_data_quality_issues`.

use crate::types::ProcessedPoint;
use chrono::NaiveDate;
use patentflow_common::{CoreError, CoreResult, PatentRecord};

const MIN_DATA_POINTS: usize = 3;
const MIN_SPAN_DAYS: i64 = 365;
const MIN_DISTINCT_YEARS: usize = 3;

/// Parses every record's `application_date`, drops the ones that don't
/// parse, and sorts the survivors chronologically. Records with an
/// unparseable date are skipped rather than rejecting the whole batch,
/// matching the original's `continue`-on-error behaviour.
fn parse_series(records: &[PatentRecord]) -> Vec<(NaiveDate, ProcessedPoint)> {
    let mut points: Vec<(NaiveDate, ProcessedPoint)> = records
        .iter()
        .filter_map(|record| {
            let parsed = record.parsed_date()?;
            let date: NaiveDate = *parsed;
            let month = chrono::Datelike::month(&date);
            Some((
                date,
                ProcessedPoint {
                    year: parsed.0,
                    month,
                    quarter: (month - 1) / 3 + 1,
                },
            ))
        })
        .collect();
    points.sort_by_key(|(date, _)| *date);
    points
}

fn quality_issues(points: &[(NaiveDate, ProcessedPoint)]) -> Vec<String> {
    let mut issues = Vec::new();
    if points.len() < MIN_DATA_POINTS {
        issues.push(format!("insufficient data points, at least {MIN_DATA_POINTS} required"));
    }
    if let (Some((first, _)), Some((last, _))) = (points.first(), points.last()) {
        let span = (*last - *first).num_days();
        if span < MIN_SPAN_DAYS {
            issues.push("insufficient time span, at least one year of data required".to_string());
        }
    }
    let distinct_years: std::collections::HashSet<i32> = points.iter().map(|(_, p)| p.year).collect();
    if distinct_years.len() < MIN_DISTINCT_YEARS {
        issues.push(format!(
            "insufficient year coverage, at least {MIN_DISTINCT_YEARS} distinct years required"
        ));
    }
    issues
}

/// Parses, sorts, and validates a patent series, returning the
/// processed points or an `insufficient_data` error listing every
/// failed check.
pub fn preprocess(records: &[PatentRecord]) -> CoreResult<Vec<ProcessedPoint>> {
    let parsed = parse_series(records);
    let issues = quality_issues(&parsed);
    if !issues.is_empty() {
        return Err(CoreError::insufficient_data(issues.join("; ")));
    }
    Ok(parsed.into_iter().map(|(_, point)| point).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str) -> PatentRecord {
        PatentRecord {
            application_date: date.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn rejects_fewer_than_three_distinct_years() {
        let records = vec![record("2022-01-01"), record("2022-06-01"), record("2022-09-01")];
        let err = preprocess(&records).unwrap_err();
        assert_eq!(err.kind, patentflow_common::ErrorKind::InsufficientData);
        assert!(err.message.contains("year coverage"));
    }

    #[test]
    fn accepts_a_well_formed_multi_year_series() {
        let records = vec![
            record("2020-01-01"),
            record("2021-06-01"),
            record("2022-09-01"),
            record("2023-03-01"),
        ];
        let points = preprocess(&records).unwrap();
        assert_eq!(points.len(), 4);
        assert_eq!(points[0].year, 2020);
        assert_eq!(points.last().unwrap().year, 2023);
    }

    #[test]
    fn skips_unparseable_dates_rather_than_failing_outright() {
        let records = vec![
            record("not-a-date"),
            record("2020-01-01"),
            record("2021-06-01"),
            record("2022-09-01"),
        ];
        let points = preprocess(&records).unwrap();
        assert_eq!(points.len(), 3);
    }
}
