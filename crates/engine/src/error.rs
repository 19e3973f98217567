//! Registry errors

use thiserror::Error;
use twap_core::{ProgressEvent, ValidationError};
use twap_ports::ExecutorError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("a TWAP session is already running for this connection")]
    SessionAlreadyActive,

    #[error("nothing to cancel")]
    NoActiveSession,

    #[error("reference size unavailable: {0}")]
    ReferenceUnavailable(ExecutorError),
}

impl RegistryError {
    /// The single outbound event reporting this error to the owner
    pub fn to_event(&self) -> ProgressEvent {
        match self {
            RegistryError::NoActiveSession => ProgressEvent::info(self.to_string()),
            _ => ProgressEvent::error(self.to_string()),
        }
    }
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use twap_core::ProgressStatus;

    #[test]
    fn test_error_events() {
        let event = RegistryError::NoActiveSession.to_event();
        assert_eq!(event.status, ProgressStatus::Info);
        assert_eq!(event.message.as_deref(), Some("nothing to cancel"));

        let event = RegistryError::from(ValidationError::InvalidSlices(0)).to_event();
        assert_eq!(event.status, ProgressStatus::Error);
        assert_eq!(
            event.message.as_deref(),
            Some("slices must be at least 1, got 0")
        );
        assert!(event.slice.is_none());
    }
}
