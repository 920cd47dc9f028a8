//! Indicator pipeline: closes in, enriched series out.
//!
//! Stages run in a fixed order: MA(short), MA(long), RSI, crossover signal,
//! simple return, strategy return, cumulative curves. Every derived column at
//! index i reads only indices <= i; the strategy return additionally lags the
//! signal by one point.

use chrono::NaiveDate;

use crate::domain::error::TraderError;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::ohlcv::PricePoint;
use crate::domain::returns::{self, MissingPolicy};
use crate::domain::risk::{self, RiskSummary};
use crate::domain::signal::{self, Signal};

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineParams {
    pub ma_short: usize,
    pub ma_long: usize,
    pub rsi_window: usize,
    pub var_confidence: f64,
    pub missing_policy: MissingPolicy,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            ma_short: 50,
            ma_long: 200,
            rsi_window: 14,
            var_confidence: risk::DEFAULT_CONFIDENCE,
            missing_policy: MissingPolicy::Skip,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRow {
    pub date: NaiveDate,
    pub close: f64,
    pub ma_short: Option<f64>,
    pub ma_long: Option<f64>,
    pub rsi: Option<f64>,
    pub signal: Signal,
    pub ret: Option<f64>,
    pub strategy_ret: Option<f64>,
    pub cum_ret: Option<f64>,
    pub cum_strategy_ret: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct EnrichedSeries {
    pub params: PipelineParams,
    pub rows: Vec<EnrichedRow>,
}

impl EnrichedSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn signals(&self) -> Vec<Signal> {
        self.rows.iter().map(|r| r.signal).collect()
    }

    pub fn strategy_returns(&self) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.strategy_ret).collect()
    }

    /// VaR of the strategy returns at the configured confidence.
    pub fn value_at_risk(&self) -> Result<Option<f64>, TraderError> {
        risk::value_at_risk(&self.strategy_returns(), self.params.var_confidence)
    }

    pub fn risk_summary(&self) -> Result<RiskSummary, TraderError> {
        let last = self.rows.last();
        Ok(RiskSummary {
            confidence: self.params.var_confidence,
            value_at_risk: self.value_at_risk()?,
            observations: self.rows.iter().filter(|r| r.strategy_ret.is_some()).count(),
            final_return: last.and_then(|r| r.cum_ret),
            final_strategy_return: last.and_then(|r| r.cum_strategy_ret),
        })
    }
}

/// Compute every derived column for a date-ordered close series.
pub fn compute_indicators(points: &[PricePoint], params: &PipelineParams) -> EnrichedSeries {
    let ma_short = calculate_sma(points, params.ma_short).to_options();
    let ma_long = calculate_sma(points, params.ma_long).to_options();
    let rsi = calculate_rsi(points, params.rsi_window).to_options();
    let signals = signal::crossover_signal(&ma_short, &ma_long);
    let rets = returns::pct_change(points);
    let strategy_rets = returns::strategy_returns(&signals, &rets);
    let cum = returns::cumulative(&rets, params.missing_policy);
    let cum_strategy = returns::cumulative(&strategy_rets, params.missing_policy);

    let rows = points
        .iter()
        .enumerate()
        .map(|(i, p)| EnrichedRow {
            date: p.date,
            close: p.close,
            ma_short: ma_short[i],
            ma_long: ma_long[i],
            rsi: rsi[i],
            signal: signals[i],
            ret: rets[i],
            strategy_ret: strategy_rets[i],
            cum_ret: cum[i],
            cum_strategy_ret: cum_strategy[i],
        })
        .collect();

    EnrichedSeries {
        params: params.clone(),
        rows,
    }
}
