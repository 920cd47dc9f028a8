//! Yahoo Finance price source (v8 chart endpoint).

use crate::domain::error::TraderError;
use crate::domain::ohlcv::PriceRecord;
use crate::ports::data_port::PriceSource;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<Meta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Meta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<i64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    adjclose: Vec<Option<f64>>,
}

pub struct YahooAdapter {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl YahooAdapter {
    pub fn new(base_url: &str) -> Result<Self, TraderError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("Mozilla/5.0")
            .build()
            .map_err(|e| TraderError::DataSource {
                symbol: String::new(),
                reason: format!("failed to build http client: {}", e),
            })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn chart_url(&self, symbol: &str, start_date: NaiveDate, end_date: NaiveDate) -> String {
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=div%2Csplits",
            self.base_url,
            symbol.replace('^', "%5E"),
            unix_midnight(start_date),
            unix_midnight(end_date),
        )
    }
}

/// Seconds since the epoch at 00:00 UTC of `date`.
fn unix_midnight(date: NaiveDate) -> i64 {
    (date - NaiveDate::default()).num_days() * 86_400
}

/// Decode a chart response body into records within `[start_date, end_date)`.
///
/// Bars with any missing field are dropped. The adjusted close falls back to
/// the close when the response carries none.
pub fn parse_chart(
    symbol: &str,
    body: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<PriceRecord>, TraderError> {
    let err = |reason: String| TraderError::DataSource {
        symbol: symbol.to_string(),
        reason,
    };

    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| err(format!("failed to parse response: {}", e)))?;

    if let Some(e) = response.chart.error {
        return Err(err(format!("{} - {}", e.code, e.description)));
    }

    let data = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| err("no data in response".into()))?;

    let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let timestamps = data.timestamp.unwrap_or_default();
    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| err("no quote data".into()))?;
    let adj = data
        .indicators
        .adjclose
        .and_then(|a| a.into_iter().next())
        .map(|a| a.adjclose)
        .unwrap_or_default();

    let mut records = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let Some(date) = DateTime::from_timestamp(ts + offset, 0).map(|dt| dt.date_naive()) else {
            continue;
        };
        if date < start_date || date >= end_date {
            continue;
        }

        let open = quote.open.get(i).copied().flatten();
        let high = quote.high.get(i).copied().flatten();
        let low = quote.low.get(i).copied().flatten();
        let close = quote.close.get(i).copied().flatten();
        let volume = quote.volume.get(i).copied().flatten();

        if let (Some(open), Some(high), Some(low), Some(close), Some(volume)) =
            (open, high, low, close, volume)
        {
            records.push(PriceRecord {
                date,
                open,
                high,
                low,
                close,
                adj_close: adj.get(i).copied().flatten().unwrap_or(close),
                volume,
            });
        }
    }

    Ok(records)
}

impl PriceSource for YahooAdapter {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceRecord>, TraderError> {
        let url = self.chart_url(symbol, start_date, end_date);
        debug!(%url, "requesting chart");

        let body = self
            .client
            .get(&url)
            .send()
            .and_then(|r| r.text())
            .map_err(|e| TraderError::DataSource {
                symbol: symbol.to_string(),
                reason: format!("request failed: {}", e),
            })?;

        let records = parse_chart(symbol, &body, start_date, end_date)?;
        info!(symbol, rows = records.len(), "downloaded daily prices");
        Ok(records)
    }
}
