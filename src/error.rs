// src/error.rs

use thiserror::Error;

/// Result type alias for restock operations.
pub type Result<T> = std::result::Result<T, RestockError>;

/// Reasons a demand model could not be fitted to a series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("need at least {needed} observations, got {got}")]
    TooFewObservations { needed: usize, got: usize },

    #[error("non-finite value at observation {index}")]
    NonFinite { index: usize },

    /// Multiplicative seasonality is undefined when every value is zero.
    #[error("series has zero scale; multiplicative seasonality is undefined")]
    ZeroScale,

    #[error("fitted trend is not positive at observation {index}")]
    NonPositiveTrend { index: usize },

    #[error("normal equations are not positive definite")]
    Singular,
}

/// Errors surfaced by the restocking pipeline.
#[derive(Error, Debug)]
pub enum RestockError {
    /// A segment has too few observations to forecast at all.
    #[error("insufficient data for segment '{segment}': {observations} observations")]
    InsufficientData { segment: String, observations: usize },

    /// The final fit with the chosen parameters failed.
    #[error("model fit failed: {0}")]
    Fit(#[from] FitError),

    /// Caller programming error, e.g. a zero-length horizon or an empty grid.
    #[error("precondition violated: {0}")]
    Precondition(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("worker pool error: {0}")]
    ThreadPool(String),
}
