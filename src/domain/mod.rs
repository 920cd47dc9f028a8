//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod signal;
pub mod returns;
pub mod risk;
pub mod pipeline;
pub mod chart;
pub mod run_config;
pub mod config_validation;
pub mod error;
