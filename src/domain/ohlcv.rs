//! Daily price records.

use chrono::NaiveDate;

/// One daily bar as stored: OHLCV plus the adjusted close.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: i64,
}

/// The slice of a record the indicator pipeline consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl From<&PriceRecord> for PricePoint {
    fn from(record: &PriceRecord) -> Self {
        PricePoint {
            date: record.date,
            close: record.close,
        }
    }
}

/// Project records onto the (date, close) points the pipeline reads.
pub fn to_points(records: &[PriceRecord]) -> Vec<PricePoint> {
    records.iter().map(PricePoint::from).collect()
}

/// Collapse rows sharing a date, keeping the last one seen.
///
/// Input must be sorted by date; the result keeps that order.
pub fn dedupe_by_date(records: Vec<PriceRecord>) -> Vec<PriceRecord> {
    let mut out: Vec<PriceRecord> = Vec::with_capacity(records.len());
    for record in records {
        match out.last_mut() {
            Some(last) if last.date == record.date => *last = record,
            _ => out.push(record),
        }
    }
    out
}
