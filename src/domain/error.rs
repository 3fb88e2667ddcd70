//! Domain error types.

/// Presentation category of an error, used by the CLI and web layers to pick
/// a user-facing message without inspecting error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Credentials,
    SymbolNotFound,
    InsufficientHistory,
    InvalidInput,
    DataSource,
    Config,
    Io,
}

/// Top-level error type for goldenstop.
#[derive(Debug, thiserror::Error)]
pub enum GoldenStopError {
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

    #[error("market data credentials rejected: {reason}")]
    Credentials { reason: String },

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no price data for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GoldenStopError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn data_source(reason: impl Into<String>) -> Self {
        Self::DataSource {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigParse { .. } | Self::ConfigMissing { .. } | Self::ConfigInvalid { .. } => {
                ErrorKind::Config
            }
            Self::Credentials { .. } => ErrorKind::Credentials,
            Self::SymbolNotFound { .. } | Self::NoData { .. } => ErrorKind::SymbolNotFound,
            Self::InsufficientData { .. } => ErrorKind::InsufficientHistory,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::DataSource { .. } => ErrorKind::DataSource,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Message shown to an end user. Details that only make sense to an
    /// operator (config keys, HTTP status lines) stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Credentials { .. } => {
                "Market data credentials are missing or invalid. Check the API key.".to_string()
            }
            Self::SymbolNotFound { symbol } => {
                format!("Symbol {symbol} was not found. Check the ticker and try again.")
            }
            Self::NoData { symbol } => {
                format!("No recent price data is available for {symbol}.")
            }
            Self::InsufficientData { bars, minimum } => format!(
                "Not enough trading history to compute the ATR ({bars} days available, {minimum} required)."
            ),
            Self::InvalidInput { reason } => format!("Invalid input: {reason}."),
            Self::DataSource { .. } => {
                "The market data provider is unavailable. Try again later.".to_string()
            }
            Self::ConfigParse { .. }
            | Self::ConfigMissing { .. }
            | Self::ConfigInvalid { .. }
            | Self::Io(_) => "The service is misconfigured. See the server logs.".to_string(),
        }
    }
}

impl From<&GoldenStopError> for std::process::ExitCode {
    fn from(err: &GoldenStopError) -> Self {
        let code: u8 = match err.kind() {
            ErrorKind::Io => 1,
            ErrorKind::Config => 2,
            ErrorKind::Credentials => 3,
            ErrorKind::SymbolNotFound => 4,
            ErrorKind::InsufficientHistory => 5,
            ErrorKind::InvalidInput => 6,
            ErrorKind::DataSource => 7,
        };
        std::process::ExitCode::from(code)
    }
}
