//! Template and chart rendering (spec §4.11 "render (template + charts)").

use crate::types::{ChartSpec, ReportContent};
use patentflow_common::{ChartRenderer, CoreResult, RenderedChart, TemplateRenderer};
use serde_json::json;

pub struct RenderedReport {
    pub html: String,
    pub charts: Vec<RenderedChart>,
}

pub async fn render(
    content: &ReportContent,
    chart_specs: &[ChartSpec],
    template_renderer: &dyn TemplateRenderer,
    chart_renderer: &dyn ChartRenderer,
) -> CoreResult<RenderedReport> {
    let mut charts = Vec::with_capacity(chart_specs.len());
    for spec in chart_specs {
        let spec_value = json!({
            "chart_id": spec.chart_id,
            "chart_type": chart_type_str(spec.chart_type),
            "title": spec.title,
            "x": spec.x,
            "y": spec.y,
            "series_labels": spec.series_labels,
        });
        charts.push(chart_renderer.render(&spec_value).await?);
    }

    let data = json!({
        "summary": content.summary,
        "sections": content.sections.iter().map(|s| json!({"title": s.title, "body": s.body})).collect::<Vec<_>>(),
        "charts": charts.iter().map(|c| json!({"path": c.path, "format": c.format})).collect::<Vec<_>>(),
    });

    let html = template_renderer.render("report", &data).await?;
    Ok(RenderedReport { html, charts })
}

fn chart_type_str(chart_type: crate::types::ChartType) -> &'static str {
    match chart_type {
        crate::types::ChartType::Line => "line",
        crate::types::ChartType::Pie => "pie",
        crate::types::ChartType::Bar => "bar",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReportSection;
    use patentflow_common::fakes::{NullChartRenderer, StringTemplateRenderer};

    #[tokio::test]
    async fn renders_html_containing_summary_and_charts() {
        let content = ReportContent {
            summary: "a summary".to_string(),
            sections: vec![ReportSection { title: "Trend".to_string(), body: "up".to_string() }],
        };
        let bundle = patentflow_common::AnalysisBundle {
            trend: Some(patentflow_common::TrendResult::default()),
            ..Default::default()
        };
        let charts = crate::charts::build(&bundle);
        let rendered = render(&content, &charts, &StringTemplateRenderer, &NullChartRenderer).await.unwrap();
        assert!(rendered.html.contains("template:report"));
        assert_eq!(rendered.charts.len(), charts.len());
    }
}
