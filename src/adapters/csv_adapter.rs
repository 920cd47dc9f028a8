//! CSV file price source.
//!
//! Reads `date,open,high,low,close,adj_close,volume` files, the layout of a
//! Yahoo Finance history export. `path` is either the file itself or a
//! directory holding `<SYMBOL>.csv` (a leading `^` is dropped from the name).

use crate::domain::error::TraderError;
use crate::domain::ohlcv::PriceRecord;
use crate::ports::data_port::PriceSource;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        if self.path.is_dir() {
            self.path
                .join(format!("{}.csv", symbol.trim_start_matches('^')))
        } else {
            self.path.clone()
        }
    }
}

fn source_err(symbol: &str, reason: String) -> TraderError {
    TraderError::DataSource {
        symbol: symbol.to_string(),
        reason,
    }
}

fn field<'r>(
    record: &'r csv::StringRecord,
    idx: usize,
    name: &str,
    symbol: &str,
) -> Result<&'r str, TraderError> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| source_err(symbol, format!("missing {} column", name)))
}

fn number<T: std::str::FromStr>(
    record: &csv::StringRecord,
    idx: usize,
    name: &str,
    symbol: &str,
) -> Result<T, TraderError>
where
    T::Err: std::fmt::Display,
{
    field(record, idx, name, symbol)?
        .parse()
        .map_err(|e: T::Err| source_err(symbol, format!("invalid {} value: {}", name, e)))
}

impl PriceSource for CsvAdapter {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceRecord>, TraderError> {
        let path = self.csv_path(symbol);
        debug!(path = %path.display(), "reading csv prices");
        let content = fs::read_to_string(&path).map_err(|e| {
            source_err(symbol, format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut records = Vec::new();
        let mut skipped = 0usize;

        for result in rdr.records() {
            let row = result.map_err(|e| source_err(symbol, format!("CSV parse error: {}", e)))?;

            let date_str = field(&row, 0, "date", symbol)?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                source_err(symbol, format!("invalid date format: {}", e))
            })?;

            if date < start_date || date >= end_date {
                continue;
            }

            // exports mark non-trading rows with "null"
            if row.iter().skip(1).any(|v| v.trim() == "null") {
                skipped += 1;
                continue;
            }

            let volume: f64 = number(&row, 6, "volume", symbol)?;
            records.push(PriceRecord {
                date,
                open: number(&row, 1, "open", symbol)?,
                high: number(&row, 2, "high", symbol)?,
                low: number(&row, 3, "low", symbol)?,
                close: number(&row, 4, "close", symbol)?,
                adj_close: number(&row, 5, "adj_close", symbol)?,
                volume: volume as i64,
            });
        }

        if skipped > 0 {
            warn!(symbol, skipped, "skipped rows with missing values");
        }

        records.sort_by_key(|r| r.date);
        Ok(records)
    }
}
