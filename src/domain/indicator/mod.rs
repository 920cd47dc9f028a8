//! Technical indicator implementations.
//!
//! - `IndicatorPoint`: a single dated value, `None` while the indicator warms up
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: a time series of indicator values

pub mod rsi;
pub mod sma;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Values only, aligned with the input points.
    pub fn to_options(&self) -> Vec<Option<f64>> {
        self.values.iter().map(|p| p.value).collect()
    }

    /// Number of leading points without a value.
    pub fn warmup_len(&self) -> usize {
        self.values
            .iter()
            .take_while(|p| p.value.is_none())
            .count()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
        }
    }
}
