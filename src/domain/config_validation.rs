//! Configuration validation.
//!
//! Every key is optional; absent keys fall back to the defaults in
//! [`crate::domain::run_config`]. Present keys must be well formed: numbers
//! parse and fit their target type, flags are a recognised boolean.

use crate::domain::error::TraderError;
use crate::domain::risk::DEFAULT_CONFIDENCE;
use crate::domain::run_config::{
    ReportFormat, DEFAULT_END_DATE, DEFAULT_START_DATE, DEFAULT_SYMBOL,
};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::str::FromStr;

pub fn validate_run_config(config: &dyn ConfigPort) -> Result<(), TraderError> {
    validate_symbol(config)?;
    validate_dates(config)?;
    validate_pool_size(config)?;
    validate_windows(config)?;
    validate_confidence(config)?;
    validate_flags(config)?;
    validate_report_format(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> TraderError {
    TraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), TraderError> {
    let symbol = config
        .get_string("source", "symbol")
        .unwrap_or_else(|| DEFAULT_SYMBOL.to_string());
    if symbol.trim().is_empty() {
        return Err(invalid("source", "symbol", "symbol must not be empty"));
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), TraderError> {
    let start = parse_date(config, "start_date", DEFAULT_START_DATE)?;
    let end = parse_date(config, "end_date", DEFAULT_END_DATE)?;

    if start >= end {
        return Err(invalid(
            "source",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

/// Read a `[source]` date, falling back to `default` when the key is absent.
pub fn parse_date(
    config: &dyn ConfigPort,
    key: &str,
    default: &str,
) -> Result<NaiveDate, TraderError> {
    let value = config
        .get_string("source", key)
        .unwrap_or_else(|| default.to_string());
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        invalid(
            "source",
            key,
            format!("invalid {} format, expected YYYY-MM-DD", key),
        )
    })
}

fn validate_pool_size(config: &dyn ConfigPort) -> Result<(), TraderError> {
    pool_size(config).map(|_| ())
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), TraderError> {
    windows(config).map(|_| ())
}

fn validate_confidence(config: &dyn ConfigPort) -> Result<(), TraderError> {
    confidence(config).map(|_| ())
}

fn validate_flags(config: &dyn ConfigPort) -> Result<(), TraderError> {
    for (section, key) in [("sqlite", "dedupe_on_load"), ("risk", "propagate_gaps")] {
        if let Some(raw) = config.get_string(section, key) {
            let value = raw.trim().to_lowercase();
            if !matches!(value.as_str(), "true" | "yes" | "1" | "false" | "no" | "0") {
                return Err(invalid(
                    section,
                    key,
                    format!("'{}' is not a boolean", raw.trim()),
                ));
            }
        }
    }
    Ok(())
}

/// Parse a key when present; `Ok(None)` when absent.
fn parse_key<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, TraderError> {
    config
        .get_string(section, key)
        .map(|raw| {
            let raw = raw.trim();
            raw.parse::<T>()
                .map_err(|_| invalid(section, key, format!("'{}' is not a valid number", raw)))
        })
        .transpose()
}

/// An integer key that must be at least 1 and fit in `T`.
pub fn positive_int<T: TryFrom<i64>>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<T, TraderError> {
    let value = parse_key::<i64>(config, section, key)?.unwrap_or(default);
    if value < 1 {
        return Err(invalid(section, key, format!("{} must be positive", key)));
    }
    T::try_from(value).map_err(|_| invalid(section, key, format!("{} is out of range", value)))
}

pub fn pool_size(config: &dyn ConfigPort) -> Result<u32, TraderError> {
    positive_int(config, "sqlite", "pool_size", 4)
}

/// (ma_short, ma_long, rsi_window); the short average must be the shorter one.
pub fn windows(config: &dyn ConfigPort) -> Result<(usize, usize, usize), TraderError> {
    let short: usize = positive_int(config, "strategy", "ma_short", 50)?;
    let long: usize = positive_int(config, "strategy", "ma_long", 200)?;
    let rsi: usize = positive_int(config, "strategy", "rsi_window", 14)?;

    if short >= long {
        return Err(invalid(
            "strategy",
            "ma_short",
            "ma_short must be less than ma_long",
        ));
    }
    Ok((short, long, rsi))
}

pub fn confidence(config: &dyn ConfigPort) -> Result<f64, TraderError> {
    let value = parse_key::<f64>(config, "risk", "confidence")?.unwrap_or(DEFAULT_CONFIDENCE);
    if !(value > 0.0 && value < 1.0) {
        return Err(invalid(
            "risk",
            "confidence",
            "confidence must be between 0 and 1 (exclusive)",
        ));
    }
    Ok(value)
}

fn validate_report_format(config: &dyn ConfigPort) -> Result<(), TraderError> {
    match config.get_string("report", "format") {
        Some(s) if ReportFormat::parse(&s).is_none() => Err(invalid(
            "report",
            "format",
            format!("unknown format '{}', expected html or svg", s.trim()),
        )),
        _ => Ok(()),
    }
}
