use thiserror::Error;

/// Failures reported by an order executor or balance source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("order rejected: {0}")]
    Rejected(String),

    #[error("insufficient {asset} balance: required {required}, available {available}")]
    InsufficientBalance {
        asset: String,
        required: String,
        available: String,
    },

    #[error("unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("executor unavailable: {0}")]
    Unavailable(String),
}

pub type ExecutorResult<T> = std::result::Result<T, ExecutorError>;
