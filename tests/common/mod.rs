#![allow(dead_code)]

use chrono::NaiveDate;
use idxtrader::domain::error::TraderError;
pub use idxtrader::domain::ohlcv::PriceRecord;
use idxtrader::domain::pipeline::PipelineParams;
use idxtrader::domain::returns::MissingPolicy;
use idxtrader::domain::run_config::{ReportFormat, RunConfig};
use idxtrader::ports::data_port::PriceSource;
use std::cell::Cell;
use std::collections::HashMap;
use std::path::PathBuf;

pub struct MockPriceSource {
    pub data: HashMap<String, Vec<PriceRecord>>,
    pub errors: HashMap<String, String>,
    pub calls: Cell<usize>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: Cell::new(0),
        }
    }

    pub fn with_records(mut self, symbol: &str, records: Vec<PriceRecord>) -> Self {
        self.data.insert(symbol.to_string(), records);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PriceSource for MockPriceSource {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceRecord>, TraderError> {
        self.calls.set(self.calls.get() + 1);
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TraderError::DataSource {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.date >= start_date && r.date < end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_record(date: &str, close: f64) -> PriceRecord {
    PriceRecord {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        adj_close: close,
        volume: 1000,
    }
}

/// `count` consecutive daily records following `closes(i)`.
pub fn generate_records(
    start_date: &str,
    count: usize,
    closes: impl Fn(usize) -> f64,
) -> Vec<PriceRecord> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| {
            let close = closes(i);
            PriceRecord {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                adj_close: close,
                volume: 1000 + i as i64,
            }
        })
        .collect()
}

/// A rising then falling price path, enough to flip a short/long crossover.
pub fn wave(i: usize) -> f64 {
    100.0 + 20.0 * (i as f64 / 15.0).sin() + i as f64 * 0.05
}

pub fn small_params() -> PipelineParams {
    PipelineParams {
        ma_short: 5,
        ma_long: 20,
        rsi_window: 14,
        var_confidence: 0.95,
        missing_policy: MissingPolicy::Skip,
    }
}

pub fn sample_run_config(report_output: PathBuf) -> RunConfig {
    RunConfig {
        symbol: "^GSPC".into(),
        start_date: date(2024, 1, 1),
        end_date: date(2025, 1, 1),
        base_url: "https://example.test".into(),
        db_path: ":memory:".into(),
        pool_size: 1,
        dedupe_on_load: false,
        pipeline: small_params(),
        report_format: ReportFormat::Html,
        report_output,
    }
}

pub fn records_to_csv(records: &[PriceRecord]) -> String {
    let mut out = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    for r in records {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            r.date, r.open, r.high, r.low, r.close, r.adj_close, r.volume
        ));
    }
    out
}
