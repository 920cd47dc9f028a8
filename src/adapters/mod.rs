//! Concrete adapter implementations for ports.

#[cfg(feature = "yahoo")]
pub mod yahoo_adapter;
pub mod chart_svg;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod html_report_adapter;
pub mod sqlite_adapter;
pub mod svg_chart_adapter;
