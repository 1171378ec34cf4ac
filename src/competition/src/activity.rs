//! Applicant activity scoring and emerging-applicant detection (spec
//! §4.7).

use patentflow_common::EmergingApplicant;
use std::collections::{HashMap, HashSet};

/// `0.4*min(count/100,1) + 0.3*min(years/10,1) + 0.15*min(countries/5,1)
/// + 0.15*min(tech_areas/10,1)`, presented in `[0, 100]`.
pub fn activity_score(patent_count: u64, active_years: usize, countries: usize, tech_areas: usize) -> f64 {
    let patent_term = (patent_count as f64 / 100.0).min(1.0);
    let years_term = (active_years as f64 / 10.0).min(1.0);
    let country_term = (countries as f64 / 5.0).min(1.0);
    let tech_term = (tech_areas as f64 / 10.0).min(1.0);
    let score = patent_term * 0.4 + years_term * 0.3 + country_term * 0.15 + tech_term * 0.15;
    score * 100.0
}

/// Per-(applicant, year) counts, used by both emerging-applicant
/// detection and the temporal-competition module.
pub type YearlyApplicantCounts = HashMap<i32, HashMap<String, u64>>;

/// Identifies emerging applicants (spec §4.7): recent-3-years count >= 3
/// and (early count = 0 or recent > 2*early).
pub fn emerging_applicants(yearly: &YearlyApplicantCounts) -> Vec<EmergingApplicant> {
    let mut years: Vec<i32> = yearly.keys().copied().collect();
    years.sort_unstable();
    if years.len() < 3 {
        return Vec::new();
    }

    let recent_years: HashSet<i32> = years[years.len() - 3..].iter().copied().collect();
    let early_years: HashSet<i32> = if years.len() >= 6 {
        years[..3].iter().copied().collect()
    } else {
        years[..years.len() - 3].iter().copied().collect()
    };

    let all_applicants: HashSet<&String> = yearly.values().flat_map(|m| m.keys()).collect();

    let mut result = Vec::new();
    for applicant in all_applicants {
        let recent_count: u64 = recent_years
            .iter()
            .filter_map(|y| yearly.get(y).and_then(|m| m.get(applicant)))
            .sum();
        let early_count: u64 = early_years
            .iter()
            .filter_map(|y| yearly.get(y).and_then(|m| m.get(applicant)))
            .sum();

        if recent_count >= 3 && (early_count == 0 || recent_count > early_count * 2) {
            let growth_rate = ((recent_count as f64 - early_count as f64) / early_count.max(1) as f64) * 100.0;
            let entrant_type = if early_count == 0 { "new_entrant" } else { "rapid_growth" };
            result.push(EmergingApplicant {
                applicant: applicant.clone(),
                recent_count,
                early_count,
                growth_rate,
                entrant_type: entrant_type.to_string(),
            });
        }
    }

    result.sort_by(|a, b| b.growth_rate.partial_cmp(&a.growth_rate).unwrap_or(std::cmp::Ordering::Equal));
    result.truncate(10);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_score_caps_each_component() {
        let score = activity_score(1000, 100, 100, 100);
        assert!((score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn new_entrant_with_zero_early_count() {
        let mut yearly = YearlyApplicantCounts::new();
        for year in 2018..=2023 {
            yearly.insert(year, HashMap::new());
        }
        yearly.get_mut(&2021).unwrap().insert("NewCo".into(), 1);
        yearly.get_mut(&2022).unwrap().insert("NewCo".into(), 1);
        yearly.get_mut(&2023).unwrap().insert("NewCo".into(), 2);

        let emerging = emerging_applicants(&yearly);
        assert_eq!(emerging.len(), 1);
        assert_eq!(emerging[0].entrant_type, "new_entrant");
        assert_eq!(emerging[0].early_count, 0);
    }

    #[test]
    fn too_few_years_returns_empty() {
        let mut yearly = YearlyApplicantCounts::new();
        yearly.insert(2022, HashMap::new());
        yearly.insert(2023, HashMap::new());
        assert!(emerging_applicants(&yearly).is_empty());
    }
}
