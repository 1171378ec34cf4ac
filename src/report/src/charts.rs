//! Chart spec construction from analysis outputs (spec §4.11 "Chart
//! specs"). Pixels are produced later by the external `ChartRenderer`;
//! this module only derives the x/y series.

use crate::types::{ChartSpec, ChartType};
use patentflow_common::AnalysisBundle;

const TOP_N: usize = 10;

pub fn build(bundle: &AnalysisBundle) -> Vec<ChartSpec> {
    let mut charts = Vec::new();

    if let Some(trend) = &bundle.trend {
        let mut years: Vec<i32> = trend.yearly_counts.keys().copied().collect();
        years.sort_unstable();
        let x: Vec<String> = years.iter().map(|y| y.to_string()).collect();
        let y: Vec<f64> = years.iter().map(|y| *trend.yearly_counts.get(y).unwrap_or(&0) as f64).collect();
        charts.push(ChartSpec {
            chart_id: "trend_chart".to_string(),
            chart_type: ChartType::Line,
            title: "Filing Trend".to_string(),
            x,
            y,
            series_labels: vec!["applications".to_string()],
        });
    }

    if let Some(competition) = &bundle.competition {
        let mut applicants: Vec<(&String, &u64)> = competition.applicant_counts.iter().collect();
        applicants.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        let top: Vec<(&String, &u64)> = applicants.into_iter().take(TOP_N).collect();
        charts.push(ChartSpec {
            chart_id: "competition_chart".to_string(),
            chart_type: ChartType::Pie,
            title: "Top Applicants".to_string(),
            x: top.iter().map(|(name, _)| (*name).clone()).collect(),
            y: top.iter().map(|(_, count)| **count as f64).collect(),
            series_labels: vec!["patent_count".to_string()],
        });
    }

    if let Some(technology) = &bundle.technology {
        let mut prefixes: Vec<(&String, &u64)> = technology.ipc_distribution.iter().collect();
        prefixes.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        let top: Vec<(&String, &u64)> = prefixes.into_iter().take(TOP_N).collect();
        charts.push(ChartSpec {
            chart_id: "technology_chart".to_string(),
            chart_type: ChartType::Bar,
            title: "Top IPC Classes".to_string(),
            x: top.iter().map(|(code, _)| (*code).clone()).collect(),
            y: top.iter().map(|(_, count)| **count as f64).collect(),
            series_labels: vec!["patent_count".to_string()],
        });
    }

    if let Some(geographic) = &bundle.geographic {
        let mut countries: Vec<(&String, &u64)> = geographic.country_counts.iter().collect();
        countries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        let top: Vec<(&String, &u64)> = countries.into_iter().take(TOP_N).collect();
        charts.push(ChartSpec {
            chart_id: "geographic_chart".to_string(),
            chart_type: ChartType::Bar,
            title: "Top Filing Countries".to_string(),
            x: top.iter().map(|(country, _)| (*country).clone()).collect(),
            y: top.iter().map(|(_, count)| **count as f64).collect(),
            series_labels: vec!["patent_count".to_string()],
        });
    }

    charts
}

#[cfg(test)]
mod tests {
    use super::*;
    use patentflow_common::{CompetitionResult, GeographicResult, TrendResult};
    use std::collections::HashMap;

    #[test]
    fn trend_chart_sorts_years_ascending() {
        let bundle = AnalysisBundle {
            trend: Some(TrendResult { yearly_counts: HashMap::from([(2022, 5), (2020, 1), (2021, 3)]), ..Default::default() }),
            ..Default::default()
        };
        let charts = build(&bundle);
        let trend_chart = charts.iter().find(|c| c.chart_id == "trend_chart").unwrap();
        assert_eq!(trend_chart.x, vec!["2020", "2021", "2022"]);
        assert_eq!(trend_chart.y, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn competition_chart_caps_at_top_ten() {
        let counts: HashMap<String, u64> = (0..20).map(|i| (format!("applicant-{i}"), i as u64)).collect();
        let bundle = AnalysisBundle {
            competition: Some(CompetitionResult { applicant_counts: counts, ..Default::default() }),
            ..Default::default()
        };
        let charts = build(&bundle);
        let chart = charts.iter().find(|c| c.chart_id == "competition_chart").unwrap();
        assert_eq!(chart.x.len(), 10);
        assert_eq!(chart.y[0], 19.0);
    }

    #[test]
    fn no_modules_yields_no_charts() {
        assert!(build(&AnalysisBundle::default()).is_empty());
    }

    #[test]
    fn geographic_chart_present_when_module_present() {
        let bundle = AnalysisBundle {
            geographic: Some(GeographicResult { country_counts: HashMap::from([("CN".to_string(), 5)]) }),
            ..Default::default()
        };
        let charts = build(&bundle);
        assert!(charts.iter().any(|c| c.chart_id == "geographic_chart"));
    }
}
