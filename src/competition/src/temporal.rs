//! Per-year HHI, entrant count, and active-applicant count, combined
//! into an equally-weighted yearly "competition score" (spec §4.7).

use crate::activity::YearlyApplicantCounts;
use crate::concentration;
use patentflow_common::YearlyCompetition;
use std::collections::{HashMap, HashSet};

pub fn analyze(yearly: &YearlyApplicantCounts) -> HashMap<i32, YearlyCompetition> {
    let mut years: Vec<i32> = yearly.keys().copied().collect();
    years.sort_unstable();

    let mut seen = HashSet::new();
    let mut result = HashMap::new();
    for year in years {
        let Some(counts) = yearly.get(&year) else { continue };
        let active_applicants = counts.len() as u64;
        let new_entrants = counts.keys().filter(|a| seen.insert((*a).clone())).count() as u64;
        let metrics = concentration::compute(counts);

        let total: u64 = counts.values().sum();
        let applicant_component = (active_applicants as f64 / 50.0).min(1.0);
        let entrant_component = (new_entrants as f64 / 10.0).min(1.0);
        let concentration_component = 1.0 - metrics.hhi;
        let activity_component = (total as f64 / 100.0).min(1.0);
        let competition_score = (applicant_component + entrant_component + concentration_component + activity_component) / 4.0 * 100.0;

        result.insert(
            year,
            YearlyCompetition {
                hhi: metrics.hhi,
                new_entrants,
                active_applicants,
                competition_score,
            },
        );
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entrants_counted_only_on_first_appearance() {
        let mut yearly = YearlyApplicantCounts::new();
        yearly.insert(2020, HashMap::from([("A".to_string(), 5)]));
        yearly.insert(2021, HashMap::from([("A".to_string(), 3), ("B".to_string(), 2)]));

        let result = analyze(&yearly);
        assert_eq!(result[&2020].new_entrants, 1);
        assert_eq!(result[&2021].new_entrants, 1);
    }
}
