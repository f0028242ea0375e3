//! Domain error types.

/// Top-level error type for axiomquant.
#[derive(Debug, thiserror::Error)]
pub enum AxiomError {
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

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

    #[error("no price data for {ticker}")]
    NoData { ticker: String },

    #[error("market data error: {reason}")]
    MarketData { reason: String },

    #[error("backtest run {id} not found")]
    RunNotFound { id: i64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AxiomError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        AxiomError::InvalidArgument {
            reason: reason.into(),
        }
    }
}

impl From<&AxiomError> for std::process::ExitCode {
    fn from(err: &AxiomError) -> Self {
        let code: u8 = match err {
            AxiomError::Io(_) => 1,
            AxiomError::ConfigParse { .. }
            | AxiomError::ConfigMissing { .. }
            | AxiomError::ConfigInvalid { .. } => 2,
            AxiomError::Database { .. } | AxiomError::DatabaseQuery { .. } => 3,
            AxiomError::InvalidArgument { .. } => 4,
            AxiomError::NoData { .. } | AxiomError::RunNotFound { .. } => 5,
            AxiomError::MarketData { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
