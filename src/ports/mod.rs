//! Port traits implemented by the adapters.

pub mod chart_port;
pub mod config_port;
pub mod data_port;
pub mod store_port;
