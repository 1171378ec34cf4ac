//! Content composition (spec §4.11 "build content"): a deterministic
//! summary plus per-section prose from the analysis bundle, optionally
//! enhanced by a `TextGenerator` at `deep` analysis depth.

use crate::types::{AnalysisDepth, ReportContent, ReportRequest, ReportSection};
use patentflow_common::{AnalysisBundle, TextGenerator};

pub async fn build(
    request: &ReportRequest,
    bundle: &AnalysisBundle,
    text_generator: Option<&dyn TextGenerator>,
) -> ReportContent {
    let mut sections = Vec::new();

    if let Some(trend) = &bundle.trend {
        let years = trend.yearly_counts.len();
        let total: u64 = trend.yearly_counts.values().sum();
        let mut body = format!(
            "Across {years} years of data ({total} applications observed), the patenting trend is \
             {direction} ({pattern}), with an estimated direction confidence of {confidence:.0}%.",
            direction = trend.direction,
            pattern = trend.pattern,
            confidence = trend.direction_confidence * 100.0,
        );
        if let Some(cagr) = trend.cagr {
            body.push_str(&format!(" The compound annual growth rate over the observed span is {:.1}%.", cagr * 100.0));
        }
        sections.push(ReportSection { title: "Trend Analysis".to_string(), body });
    }

    if let Some(competition) = &bundle.competition {
        let applicant_count = competition.applicant_counts.len();
        let body = format!(
            "{applicant_count} distinct applicants were observed. Market concentration is {level} \
             (HHI={hhi:.3}, CR4={cr4:.1}%). {emerging} emerging applicant(s) were identified.",
            level = competition.concentration_level,
            hhi = competition.hhi,
            cr4 = competition.cr4 * 100.0,
            emerging = competition.emerging_applicants.len(),
        );
        sections.push(ReportSection { title: "Competitive Landscape".to_string(), body });
    }

    if let Some(technology) = &bundle.technology {
        let top: Vec<String> = technology.main_technologies.iter().take(5).cloned().collect();
        let body = format!(
            "The dominant technology areas are: {}.",
            if top.is_empty() { "not enough data to identify a dominant area".to_string() } else { top.join(", ") }
        );
        sections.push(ReportSection { title: "Technology Classification".to_string(), body });
    }

    if let Some(geographic) = &bundle.geographic {
        let mut countries: Vec<(&String, &u64)> = geographic.country_counts.iter().collect();
        countries.sort_by(|a, b| b.1.cmp(a.1));
        let top: Vec<String> = countries.iter().take(5).map(|(country, count)| format!("{country} ({count})")).collect();
        let body = format!("Top filing countries: {}.", if top.is_empty() { "none recorded".to_string() } else { top.join(", ") });
        sections.push(ReportSection { title: "Geographic Distribution".to_string(), body });
    }

    let mut summary = format!(
        "Patent intelligence report for: \"{}\". {} analysis module(s) contributed to this report.",
        request.content,
        bundle.modules_present(),
    );

    if request.depth == AnalysisDepth::Deep {
        if let Some(generator) = text_generator {
            let prompt = format!(
                "Write a one-paragraph executive summary of a patent landscape report covering: {}. Sections: {}.",
                request.content,
                sections.iter().map(|s| s.title.as_str()).collect::<Vec<_>>().join(", "),
            );
            if let Ok(enhanced) = generator.generate(&prompt).await {
                summary = enhanced;
            }
        }
    }

    ReportContent { summary, sections }
}
