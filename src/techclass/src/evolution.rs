//! Per-(year, tech area) counts and an early-half vs late-half trend
//! verdict per area (spec §4.8).

use crate::keywords::TECH_AREAS;
use std::collections::HashMap;

/// `rapid` if the late-half average exceeds the early-half by >20%,
/// `steady` if it exceeds by >5%, `declining` if it falls short by
/// >20%, else `stable`. Areas with fewer than 2 distinct years report
/// no verdict (caller should treat missing as "insufficient data").
pub fn verdict(yearly_counts: &HashMap<i32, u64>) -> Option<&'static str> {
    let mut years: Vec<i32> = yearly_counts.keys().copied().collect();
    years.sort_unstable();
    if years.len() < 2 {
        return None;
    }

    let mid = years.len() / 2;
    let early: Vec<i32> = years[..mid].to_vec();
    let late: Vec<i32> = years[mid..].to_vec();

    let early_avg = early.iter().filter_map(|y| yearly_counts.get(y)).sum::<u64>() as f64 / early.len() as f64;
    let late_avg = late.iter().filter_map(|y| yearly_counts.get(y)).sum::<u64>() as f64 / late.len() as f64;

    Some(if late_avg > early_avg * 1.2 {
        "rapid"
    } else if late_avg > early_avg * 1.05 {
        "steady"
    } else if late_avg < early_avg * 0.8 {
        "declining"
    } else {
        "stable"
    })
}

/// Builds per-(area, year) counts for every record whose title/abstract
/// matches one of the seed keyword lists, keyed by area then year.
pub fn evolution(records: &[(i32, String)]) -> HashMap<String, HashMap<i32, u64>> {
    let mut result: HashMap<String, HashMap<i32, u64>> = HashMap::new();
    for (year, text) in records {
        let lower = text.to_lowercase();
        for (domain, seeds) in TECH_AREAS {
            if seeds.iter().any(|seed| lower.contains(seed)) {
                *result.entry((*domain).to_string()).or_default().entry(*year).or_insert(0) += 1;
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rapid_growth_is_detected() {
        let mut counts = HashMap::new();
        counts.insert(2018, 1);
        counts.insert(2019, 1);
        counts.insert(2020, 5);
        counts.insert(2021, 5);
        assert_eq!(verdict(&counts), Some("rapid"));
    }

    #[test]
    fn declining_trend_is_detected() {
        let mut counts = HashMap::new();
        counts.insert(2018, 10);
        counts.insert(2019, 10);
        counts.insert(2020, 1);
        counts.insert(2021, 1);
        assert_eq!(verdict(&counts), Some("declining"));
    }

    #[test]
    fn single_year_has_no_verdict() {
        let mut counts = HashMap::new();
        counts.insert(2020, 5);
        assert_eq!(verdict(&counts), None);
    }

    #[test]
    fn evolution_groups_by_area_and_year() {
        let records = vec![(2020, "人工智能系统".to_string()), (2021, "人工智能算法".to_string())];
        let result = evolution(&records);
        assert_eq!(result["人工智能"][&2020], 1);
        assert_eq!(result["人工智能"][&2021], 1);
    }
}
