//! Integration tests for the ingest, reload, analyze and render flow.
//!
//! Tests cover:
//! - Full pipeline through an in-memory SqliteAdapter with a mock price source
//! - Append-only store semantics (re-ingesting doubles the row count)
//! - Optional date de-duplication on load
//! - NoData and DataSource failures
//! - HTML and SVG chart output
//! - File-backed store persistence

mod common;

use common::*;
use idxtrader::adapters::html_report_adapter::HtmlReportAdapter;
use idxtrader::adapters::sqlite_adapter::SqliteAdapter;
use idxtrader::adapters::svg_chart_adapter::SvgChartAdapter;
use idxtrader::cli::{analyze, ingest, render};
use idxtrader::domain::error::TraderError;
use idxtrader::domain::signal::Signal;
use idxtrader::ports::store_port::PriceStore;
use std::fs;
use std::path::PathBuf;

fn memory_store() -> SqliteAdapter {
    let store = SqliteAdapter::in_memory().unwrap();
    store.initialize_schema().unwrap();
    store
}

fn wave_source(count: usize) -> MockPriceSource {
    MockPriceSource::new().with_records("^GSPC", generate_records("2024-01-01", count, wave))
}

mod full_pipeline {
    use super::*;

    #[test]
    fn ingest_then_analyze_with_mock_source() {
        let source = wave_source(120);
        let store = memory_store();
        let config = sample_run_config(PathBuf::from("unused.html"));

        let written = ingest(&source, &store, &config).unwrap();
        assert_eq!(written, 120);
        assert_eq!(source.calls.get(), 1);

        let series = analyze(&store, &config).unwrap();
        assert_eq!(series.len(), 120);
        assert_eq!(series.rows[0].date, date(2024, 1, 1));

        // long window of 20: first defined at index 19
        assert!(series.rows[18].ma_long.is_none());
        assert!(series.rows[19].ma_long.is_some());
        assert!(series.rows[3].ma_short.is_none());
        assert!(series.rows[4].ma_short.is_some());
        assert!(series.rows[12].rsi.is_none());
    }

    #[test]
    fn signals_flip_on_wave() {
        let source = wave_source(200);
        let store = memory_store();
        let config = sample_run_config(PathBuf::from("unused.html"));

        ingest(&source, &store, &config).unwrap();
        let series = analyze(&store, &config).unwrap();
        let signals = series.signals();

        assert!(signals.contains(&Signal::Long));
        assert!(signals.contains(&Signal::Short));
        assert!(signals[..19].iter().all(|s| *s == Signal::Flat));
    }

    #[test]
    fn stored_values_survive_reload() {
        let records = generate_records("2024-01-01", 30, wave);
        let source = MockPriceSource::new().with_records("^GSPC", records.clone());
        let store = memory_store();
        let config = sample_run_config(PathBuf::from("unused.html"));

        ingest(&source, &store, &config).unwrap();
        let loaded = store.load_all().unwrap();

        assert_eq!(loaded, records);
    }

    #[test]
    fn date_range_is_filtered_by_source() {
        let source = wave_source(400);
        let store = memory_store();
        let mut config = sample_run_config(PathBuf::from("unused.html"));
        config.start_date = date(2024, 2, 1);
        config.end_date = date(2024, 3, 1);

        let written = ingest(&source, &store, &config).unwrap();

        // February 2024 has 29 days, end date excluded
        assert_eq!(written, 29);
        let (first, last, count) = store.date_range().unwrap().unwrap();
        assert_eq!(first, date(2024, 2, 1));
        assert_eq!(last, date(2024, 2, 29));
        assert_eq!(count, 29);
    }
}

mod append_only_store {
    use super::*;

    #[test]
    fn reingest_doubles_row_count() {
        let source = wave_source(60);
        let store = memory_store();
        let config = sample_run_config(PathBuf::from("unused.html"));

        ingest(&source, &store, &config).unwrap();
        ingest(&source, &store, &config).unwrap();

        assert_eq!(store.row_count().unwrap(), 120);
        let series = analyze(&store, &config).unwrap();
        assert_eq!(series.len(), 120);
    }

    #[test]
    fn dedupe_on_load_collapses_repeated_dates() {
        let source = wave_source(60);
        let store = memory_store();
        let mut config = sample_run_config(PathBuf::from("unused.html"));
        config.dedupe_on_load = true;

        ingest(&source, &store, &config).unwrap();
        ingest(&source, &store, &config).unwrap();

        assert_eq!(store.row_count().unwrap(), 120);
        let series = analyze(&store, &config).unwrap();
        assert_eq!(series.len(), 60);
        assert!(series.rows.windows(2).all(|w| w[0].date < w[1].date));
    }
}

mod failures {
    use super::*;

    #[test]
    fn empty_download_is_no_data() {
        let source = MockPriceSource::new();
        let store = memory_store();
        let config = sample_run_config(PathBuf::from("unused.html"));

        let err = ingest(&source, &store, &config).unwrap_err();

        assert!(matches!(err, TraderError::NoData { ref symbol } if symbol == "^GSPC"));
        assert_eq!(store.row_count().unwrap(), 0);
    }

    #[test]
    fn source_error_propagates() {
        let source = MockPriceSource::new().with_error("^GSPC", "connection refused");
        let store = memory_store();
        let config = sample_run_config(PathBuf::from("unused.html"));

        let err = ingest(&source, &store, &config).unwrap_err();

        assert!(matches!(err, TraderError::DataSource { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn analyze_empty_store_is_no_data() {
        let store = memory_store();
        let config = sample_run_config(PathBuf::from("unused.html"));

        let err = analyze(&store, &config).unwrap_err();
        assert!(matches!(err, TraderError::NoData { .. }));
    }

    #[test]
    fn short_history_still_analyzes() {
        let source = wave_source(10);
        let store = memory_store();
        let config = sample_run_config(PathBuf::from("unused.html"));

        ingest(&source, &store, &config).unwrap();
        let series = analyze(&store, &config).unwrap();

        assert_eq!(series.len(), 10);
        assert!(series.rows.iter().all(|r| r.ma_long.is_none()));
        assert!(series.signals().iter().all(|s| *s == Signal::Flat));
        // flat signals give zero strategy returns, which still have a quantile
        assert_eq!(series.value_at_risk().unwrap(), Some(0.0));
    }
}

mod chart_output {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn html_report_contains_charts_and_var() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("report.html");
        let source = wave_source(150);
        let store = memory_store();
        let config = sample_run_config(output.clone());

        ingest(&source, &store, &config).unwrap();
        let series = analyze(&store, &config).unwrap();
        let port = HtmlReportAdapter::new("^GSPC Indicator Report");
        let (risk, written) = render(&series, &config.symbol, &port, &output).unwrap();

        assert_eq!(written, vec![output.clone()]);
        assert!(risk.value_at_risk.is_some());
        assert!(
            risk.to_string()
                .starts_with("Value at Risk (VaR) at 95% confidence level: ")
        );

        let html = fs::read_to_string(&output).unwrap();
        assert_eq!(html.matches("<svg").count(), 4);
        assert!(html.contains("^GSPC Indicator Report"));
        assert!(html.contains("^GSPC Historical Prices with Moving Averages"));
    }

    #[test]
    fn svg_output_writes_four_files() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("charts");
        let source = wave_source(150);
        let store = memory_store();
        let config = sample_run_config(output.clone());

        ingest(&source, &store, &config).unwrap();
        let series = analyze(&store, &config).unwrap();
        let port = SvgChartAdapter::new();
        let (_, written) = render(&series, &config.symbol, &port, &output).unwrap();

        assert_eq!(written.len(), 4);
        assert!(written.iter().all(|p| p.exists()));
        assert!(output.join("03_signals.svg").exists());
    }
}

mod file_store {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn rows_persist_across_opens() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("prices.db");
        let db_path = db_path.to_str().unwrap();
        let source = wave_source(40);
        let config = sample_run_config(PathBuf::from("unused.html"));

        {
            let store = SqliteAdapter::open(db_path, 2).unwrap();
            store.initialize_schema().unwrap();
            ingest(&source, &store, &config).unwrap();
        }

        let store = SqliteAdapter::open(db_path, 2).unwrap();
        store.initialize_schema().unwrap();
        assert_eq!(store.row_count().unwrap(), 40);
        assert_eq!(analyze(&store, &config).unwrap().len(), 40);
    }
}
