//! Domain error types.

/// Top-level error type for idxtrader.
#[derive(Debug, thiserror::Error)]
pub enum TraderError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data source error for {symbol}: {reason}")]
    DataSource { symbol: String, reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("render error: {reason}")]
    Render { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TraderError> for std::process::ExitCode {
    fn from(err: &TraderError) -> Self {
        let code: u8 = match err {
            TraderError::Io(_) | TraderError::Render { .. } => 1,
            TraderError::ConfigParse { .. }
            | TraderError::ConfigMissing { .. }
            | TraderError::ConfigInvalid { .. }
            | TraderError::InvalidParameter { .. } => 2,
            TraderError::Database { .. } | TraderError::DatabaseQuery { .. } => 3,
            TraderError::DataSource { .. } => 4,
            TraderError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
