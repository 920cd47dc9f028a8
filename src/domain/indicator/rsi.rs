//! RSI (Relative Strength Index) using simple rolling averages.
//!
//! - delta[i] = C[i] - C[i-1]; the first point has no delta and counts as
//!   neither a gain nor a loss (gain = loss = 0)
//! - avg_gain / avg_loss: trailing mean of gains / losses over n points
//! - RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//!
//! If avg_loss == 0 the relative strength is undefined and so is the RSI.
//! Warmup: first (n-1) points have no value.

use crate::domain::indicator::sma::rolling_mean;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PricePoint;

pub fn calculate_rsi(points: &[PricePoint], period: usize) -> IndicatorSeries {
    let mut gains = Vec::with_capacity(points.len());
    let mut losses = Vec::with_capacity(points.len());

    for i in 0..points.len() {
        let delta = if i == 0 {
            None
        } else {
            Some(points[i].close - points[i - 1].close)
        };
        gains.push(match delta {
            Some(d) if d > 0.0 => d,
            _ => 0.0,
        });
        losses.push(match delta {
            Some(d) if d < 0.0 => -d,
            _ => 0.0,
        });
    }

    let avg_gains = rolling_mean(&gains, period);
    let avg_losses = rolling_mean(&losses, period);

    let values = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let value = match (avg_gains[i], avg_losses[i]) {
                (Some(gain), Some(loss)) => relative_strength(gain, loss).map(rsi_from_rs),
                _ => None,
            };
            IndicatorPoint {
                date: p.date,
                value,
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

fn relative_strength(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        None
    } else {
        Some(avg_gain / avg_loss)
    }
}

fn rsi_from_rs(rs: f64) -> f64 {
    100.0 - (100.0 / (1.0 + rs))
}
