//! Error types for gas quote handling.

use thiserror::Error;

/// Errors raised while interpreting a gas oracle quote.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QuoteError {
    #[error("Unexpected status from gas oracle: {status} ({message}) {detail}")]
    UnexpectedStatus {
        status: String,
        message: String,
        detail: String,
    },

    #[error("Gas oracle returned no prices: {0}")]
    MissingPrices(String),

    #[error("Invalid gas price {value:?}: {reason}")]
    InvalidPrice { value: String, reason: String },
}

/// Errors raised while parsing a gas threshold.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ThresholdError {
    #[error("Threshold is empty")]
    Empty,

    #[error("Threshold {0:?} is not a number")]
    NotANumber(String),

    #[error("Threshold {0:?} is not finite")]
    NotFinite(String),
}
