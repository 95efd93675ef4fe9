//! Error types for data retrieval and generation.

use thiserror::Error;

/// Errors that can occur when fetching or generating price data.
#[derive(Debug, Error)]
pub enum DataError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The response body could not be parsed.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The provider has no data for a symbol.
    #[error("No data available for {0}")]
    NoData(String),

    /// All retry attempts for a symbol failed.
    #[error("Gave up on {symbol} after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// Symbol that could not be fetched.
        symbol: String,
        /// Attempts made, including the first.
        attempts: usize,
        /// Message of the last failure.
        last_error: String,
    },

    /// Too few symbols survived fetching to build a usable universe.
    #[error("Only {got} of {requested} symbols fetched, need at least {min}")]
    InsufficientUniverse {
        /// Symbols successfully fetched.
        got: usize,
        /// Symbols requested.
        requested: usize,
        /// Minimum required.
        min: usize,
    },

    /// A generation parameter is out of range.
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl From<DataError> for zahara_traits::ZaharaError {
    fn from(e: DataError) -> Self {
        match e {
            DataError::Configuration(msg) => Self::Configuration(msg),
            DataError::NoData(symbol) => Self::SymbolNotFound(symbol),
            DataError::InsufficientUniverse { .. } => Self::InsufficientData(e.to_string()),
            other => Self::DataFetch(other.to_string()),
        }
    }
}

/// A specialized Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;
