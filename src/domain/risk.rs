//! Historical Value at Risk.

use crate::domain::error::TraderError;
use std::fmt;

pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// Empirical quantile with linear interpolation between order statistics,
/// position = (n - 1) * q.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let pos = (sorted.len() - 1) as f64 * q;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// The (1 - confidence) quantile of the defined returns.
///
/// Returns `Ok(None)` when there is nothing to measure.
pub fn value_at_risk(returns: &[Option<f64>], confidence: f64) -> Result<Option<f64>, TraderError> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(TraderError::InvalidParameter {
            name: "confidence".into(),
            reason: format!("{confidence} is outside (0, 1)"),
        });
    }

    let defined: Vec<f64> = returns.iter().flatten().copied().collect();
    Ok(quantile(&defined, 1.0 - confidence))
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskSummary {
    pub confidence: f64,
    pub value_at_risk: Option<f64>,
    pub observations: usize,
    pub final_return: Option<f64>,
    pub final_strategy_return: Option<f64>,
}

impl fmt::Display for RiskSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pct = self.confidence * 100.0;
        match self.value_at_risk {
            Some(var) => write!(
                f,
                "Value at Risk (VaR) at {pct:.0}% confidence level: {var:.4}"
            ),
            None => write!(
                f,
                "Value at Risk (VaR) at {pct:.0}% confidence level: n/a (no strategy returns)"
            ),
        }
    }
}
