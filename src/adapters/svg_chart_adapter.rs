//! Writes each chart view to its own SVG file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::adapters::chart_svg::render_svg;
use crate::domain::chart::ChartView;
use crate::domain::error::TraderError;
use crate::domain::risk::RiskSummary;
use crate::ports::chart_port::ChartPort;

#[derive(Default)]
pub struct SvgChartAdapter;

impl SvgChartAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ChartPort for SvgChartAdapter {
    /// `output` is a directory; files are named `<NN>_<slug>.svg` in view order.
    fn render(
        &self,
        views: &[ChartView],
        _risk: &RiskSummary,
        output: &Path,
    ) -> Result<Vec<PathBuf>, TraderError> {
        fs::create_dir_all(output)?;

        let mut written = Vec::with_capacity(views.len());
        for (i, view) in views.iter().enumerate() {
            let path = output.join(format!("{:02}_{}.svg", i + 1, view.slug));
            fs::write(&path, render_svg(view))?;
            debug!(path = %path.display(), "wrote chart");
            written.push(path);
        }
        Ok(written)
    }
}
