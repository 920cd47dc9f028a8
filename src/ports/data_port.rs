//! Price source port trait.

use crate::domain::error::TraderError;
use crate::domain::ohlcv::PriceRecord;
use chrono::NaiveDate;

pub trait PriceSource {
    /// Daily records for `symbol` with `start <= date < end`, ascending by date.
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceRecord>, TraderError>;
}
