//! HTML report adapter implementing ChartPort.
//!
//! One page: the risk summary table followed by every chart as inline SVG,
//! rendered through an Askama template.

use std::fs;
use std::path::{Path, PathBuf};

use askama::Template;

use crate::adapters::chart_svg::render_svg;
use crate::domain::chart::ChartView;
use crate::domain::error::TraderError;
use crate::domain::risk::RiskSummary;
use crate::ports::chart_port::ChartPort;

struct ChartSection {
    slug: &'static str,
    title: String,
    svg: String,
}

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate {
    title: String,
    var_line: String,
    confidence: String,
    value_at_risk: String,
    observations: usize,
    final_return: String,
    final_strategy_return: String,
    charts: Vec<ChartSection>,
}

fn pct(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}%", v * 100.0))
        .unwrap_or_else(|| "n/a".to_string())
}

pub struct HtmlReportAdapter {
    title: String,
}

impl HtmlReportAdapter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

impl ChartPort for HtmlReportAdapter {
    fn render(
        &self,
        views: &[ChartView],
        risk: &RiskSummary,
        output: &Path,
    ) -> Result<Vec<PathBuf>, TraderError> {
        let template = ReportTemplate {
            title: self.title.clone(),
            var_line: risk.to_string(),
            confidence: format!("{:.0}%", risk.confidence * 100.0),
            value_at_risk: risk
                .value_at_risk
                .map(|v| format!("{:.4}", v))
                .unwrap_or_else(|| "n/a".to_string()),
            observations: risk.observations,
            final_return: pct(risk.final_return),
            final_strategy_return: pct(risk.final_strategy_return),
            charts: views
                .iter()
                .map(|v| ChartSection {
                    slug: v.slug,
                    title: v.title.clone(),
                    svg: render_svg(v),
                })
                .collect(),
        };

        let html = template.render().map_err(|e| TraderError::Render {
            reason: e.to_string(),
        })?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(output, html)?;

        Ok(vec![output.to_path_buf()])
    }
}
