//! Error types for the Zahara framework.
//!
//! The variants mirror the failure modes of the pipeline: data that is too
//! thin to use, statistics that are undefined for a particular window,
//! retrieval failures, and configurations that can never produce a valid run.

use thiserror::Error;

/// The main error type for Zahara operations.
#[derive(Debug, Error)]
pub enum ZaharaError {
    /// Data is insufficient for the requested operation (too few symbols,
    /// too few observations, or an empty window). The affected universe or
    /// window is skipped; callers should not abort a whole batch on this.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A statistic is mathematically undefined for a window (for example a
    /// coefficient of variation with non-positive mean). The rolling engine
    /// records the point as missing and continues.
    #[error("Statistic undefined for window: {0}")]
    UndefinedStatistic(String),

    /// A configuration that can never produce a valid run: empty training
    /// range, zero-variance threshold base, zero window or step. Fatal for
    /// the pipeline variant it belongs to.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Error fetching data from external sources after retries.
    #[error("Data fetch error: {0}")]
    DataFetch(String),

    /// Error due to invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error when a date is out of range or cannot be parsed.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Error when a symbol is unknown to the data provider or absent from
    /// the universe.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl From<String> for ZaharaError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for ZaharaError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for Zahara operations.
pub type Result<T> = std::result::Result<T, ZaharaError>;
