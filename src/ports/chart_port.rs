//! Chart rendering port trait.

use crate::domain::chart::ChartView;
use crate::domain::error::TraderError;
use crate::domain::risk::RiskSummary;
use std::path::{Path, PathBuf};

pub trait ChartPort {
    /// Render the views under `output`; returns the files written.
    fn render(
        &self,
        views: &[ChartView],
        risk: &RiskSummary,
        output: &Path,
    ) -> Result<Vec<PathBuf>, TraderError>;
}
