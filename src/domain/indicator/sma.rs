//! Simple Moving Average.
//!
//! SMA(n)[i] = sum(C[i-n+1..=i]) / n
//! Warmup: first (n-1) points have no value.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PricePoint;

pub fn calculate_sma(points: &[PricePoint], period: usize) -> IndicatorSeries {
    let closes: Vec<f64> = points.iter().map(|p| p.close).collect();
    let means = rolling_mean(&closes, period);

    let values = points
        .iter()
        .zip(means)
        .map(|(p, value)| IndicatorPoint {
            date: p.date,
            value,
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}

/// Trailing mean over `period` values; `None` until a full window exists.
pub(crate) fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    for (i, window) in values.windows(period).enumerate() {
        out[i + period - 1] = Some(window.iter().sum::<f64>() / period as f64);
    }
    out
}
