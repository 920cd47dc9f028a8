//! Run parameters and their defaults.

use chrono::NaiveDate;
use std::path::PathBuf;

use crate::domain::pipeline::PipelineParams;

pub const DEFAULT_SYMBOL: &str = "^GSPC";
pub const DEFAULT_START_DATE: &str = "2022-04-02";
pub const DEFAULT_END_DATE: &str = "2024-07-05";
pub const DEFAULT_DB_PATH: &str = "harshfinance_data.db";
pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Html,
    Svg,
}

impl ReportFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "html" => Some(ReportFormat::Html),
            "svg" => Some(ReportFormat::Svg),
            _ => None,
        }
    }

    pub fn default_output(self) -> PathBuf {
        match self {
            ReportFormat::Html => PathBuf::from("report.html"),
            ReportFormat::Svg => PathBuf::from("charts"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub base_url: String,
    pub db_path: String,
    pub pool_size: u32,
    pub dedupe_on_load: bool,
    pub pipeline: PipelineParams,
    pub report_format: ReportFormat,
    pub report_output: PathBuf,
}
