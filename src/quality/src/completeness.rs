//! Completeness dimension (spec §4.9, weight 0.25): module presence
//! averaged with per-module required-field ratios.

use patentflow_common::AnalysisBundle;

const REQUIRED_MODULES: usize = 3;

pub struct CompletenessCheck {
    pub overall: f64,
    pub module_completeness: f64,
    pub data_completeness: f64,
    pub present_modules: Vec<String>,
}

pub fn check(bundle: &AnalysisBundle) -> CompletenessCheck {
    let mut present_modules = Vec::new();
    let mut module_scores = Vec::new();

    if let Some(trend) = &bundle.trend {
        present_modules.push("trend".to_string());
        let fields = [!trend.yearly_counts.is_empty(), !trend.growth_rates.is_empty(), !trend.direction.is_empty()];
        module_scores.push(fields.iter().filter(|f| **f).count() as f64 / fields.len() as f64);
    }
    if let Some(competition) = &bundle.competition {
        present_modules.push("competition".to_string());
        let fields = [
            !competition.applicant_counts.is_empty(),
            !competition.concentration_level.is_empty(),
            !competition.activity_scores.is_empty(),
        ];
        module_scores.push(fields.iter().filter(|f| **f).count() as f64 / fields.len() as f64);
    }
    if let Some(technology) = &bundle.technology {
        present_modules.push("technology".to_string());
        let fields =
            [!technology.ipc_distribution.is_empty(), !technology.main_technologies.is_empty(), !technology.clusters.is_empty()];
        module_scores.push(fields.iter().filter(|f| **f).count() as f64 / fields.len() as f64);
    }

    let module_completeness = present_modules.len() as f64 / REQUIRED_MODULES as f64;
    let data_completeness = if module_scores.is_empty() {
        0.0
    } else {
        module_scores.iter().sum::<f64>() / module_scores.len() as f64
    };

    CompletenessCheck {
        overall: (module_completeness + data_completeness) / 2.0,
        module_completeness,
        data_completeness,
        present_modules,
    }
}
