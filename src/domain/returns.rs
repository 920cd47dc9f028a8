//! Simple, strategy and cumulative returns.

use crate::domain::ohlcv::PricePoint;
use crate::domain::signal::Signal;

/// How a running product treats an undefined input after it has started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPolicy {
    /// The gap is undefined at its own index; compounding resumes after it.
    #[default]
    Skip,
    /// The first gap makes every later value undefined.
    Propagate,
}

/// (C[i] - C[i-1]) / C[i-1]. Undefined for the first point and after a zero close.
pub fn pct_change(points: &[PricePoint]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(points.len());
    for i in 0..points.len() {
        if i == 0 {
            out.push(None);
            continue;
        }
        let prev = points[i - 1].close;
        out.push(if prev == 0.0 {
            None
        } else {
            Some((points[i].close - prev) / prev)
        });
    }
    out
}

/// Yesterday's signal applied to today's return.
pub fn strategy_returns(signals: &[Signal], returns: &[Option<f64>]) -> Vec<Option<f64>> {
    debug_assert_eq!(signals.len(), returns.len());
    returns
        .iter()
        .enumerate()
        .map(|(i, r)| {
            if i == 0 {
                return None;
            }
            r.map(|r| signals[i - 1].as_f64() * r)
        })
        .collect()
}

/// Running product of (1 + r) minus 1.
pub fn cumulative(returns: &[Option<f64>], policy: MissingPolicy) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(returns.len());
    let mut growth: Option<f64> = None;
    let mut poisoned = false;

    for r in returns {
        match (r, policy) {
            _ if poisoned => out.push(None),
            (Some(r), _) => {
                let g = growth.unwrap_or(1.0) * (1.0 + r);
                growth = Some(g);
                out.push(Some(g - 1.0));
            }
            (None, MissingPolicy::Propagate) if growth.is_some() => {
                poisoned = true;
                out.push(None);
            }
            (None, _) => out.push(None),
        }
    }
    out
}
