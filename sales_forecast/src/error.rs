//! Error types for the sales_forecast crate

use thiserror::Error;

/// Custom error types for the sales_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The record source returned nothing to aggregate
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Every configuration of the grid search failed to fit
    #[error("No converging model: all {attempted} grid points failed")]
    NoConvergingModel {
        /// Number of configurations that were tried
        attempted: usize,
    },

    /// Serving was requested before any model was trained
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Serving was requested without a usable series
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Malformed year/month request
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// A raw record could not be used
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Regressor columns differ from the ones the model was trained with
    #[error("Feature mismatch: expected {expected:?}, got {got:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        got: Vec<String>,
    },

    /// A single model configuration could not be fitted
    #[error("Fit error: {0}")]
    Fit(String),

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from JSON (de)serialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error from CSV reading or writing
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from numerical routines
    #[error("Math error: {0}")]
    Math(#[from] sales_math::MathError),
}

impl ForecastError {
    /// HTTP-equivalent status for the serving surface
    pub fn status_code(&self) -> u16 {
        match self {
            ForecastError::InvalidPeriod(_)
            | ForecastError::InsufficientData(_)
            | ForecastError::EmptyInput(_) => 400,
            ForecastError::ModelNotFound(_) => 503,
            _ => 500,
        }
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<tempfile::PersistError> for ForecastError {
    fn from(err: tempfile::PersistError) -> Self {
        ForecastError::Io(err.error)
    }
}
