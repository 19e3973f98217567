//! Validation errors for inbound commands

use thiserror::Error;

/// Reasons a StartCommand is rejected before any session exists
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("instId must not be empty")]
    EmptyInstrument,

    #[error("invalid instId '{0}': expected BASE-QUOTE[-TYPE]")]
    InvalidInstrument(String),

    #[error("percent must be in (0, 100], got {0}")]
    PercentOutOfRange(f64),

    #[error("slices must be at least 1, got {0}")]
    InvalidSlices(i64),

    #[error("slices must not exceed {max}, got {got}")]
    TooManySlices { got: i64, max: u32 },

    #[error("interval must be a positive number of seconds, got {0}")]
    InvalidInterval(f64),

    #[error("no available {0} balance to size the order")]
    NoReferenceSize(String),

    #[error("target of {target} {quote} over {slices} slices rounds to a zero slice size")]
    SliceSizeTooSmall {
        target: String,
        quote: String,
        slices: u32,
    },

    #[error("malformed start command: {0}")]
    Malformed(String),
}
