//! # Sales Math
//!
//! Numerical building blocks for the sales forecasting pipeline.
//! This crate provides the lag-polynomial algebra used by seasonal
//! autoregressive models, a bounded Nelder-Mead simplex optimizer and
//! regularised least squares.

use thiserror::Error;

pub mod lag;
pub mod optimize;
pub mod regression;

/// Errors that can occur in numerical routines
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Singular system: {0}")]
    Singular(String),

    #[error("Non-finite value encountered: {0}")]
    NonFinite(String),
}

/// Result type for numerical operations
pub type Result<T> = std::result::Result<T, MathError>;

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
