//! Price store port trait.

use crate::domain::error::TraderError;
use crate::domain::ohlcv::PriceRecord;
use chrono::NaiveDate;

/// Append-only history of daily records.
///
/// Dates are not unique: appending the same range twice stores it twice.
pub trait PriceStore {
    /// Append every record; returns the number of rows written.
    fn append(&self, records: &[PriceRecord]) -> Result<usize, TraderError>;

    /// Every stored row, ordered by date and then by insertion order.
    fn load_all(&self) -> Result<Vec<PriceRecord>, TraderError>;

    fn row_count(&self) -> Result<usize, TraderError>;

    /// (first date, last date, row count), or `None` for an empty store.
    fn date_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, TraderError>;
}
