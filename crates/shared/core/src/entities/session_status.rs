use serde::{Deserialize, Serialize};

/// TWAP session lifecycle status
///
/// ```text
/// Pending ──► Running ──┬──► Completed
///                       ├──► Cancelled
///                       └──► Error
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Session has been created but its loop has not started
    #[default]
    Pending,
    /// Slices are being dispatched
    Running,
    /// Every slice was executed
    Completed,
    /// Stopped by a cancel signal
    Cancelled,
    /// Stopped by an executor failure
    Error,
}

impl SessionStatus {
    /// Returns true if no further slices will ever be dispatched
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Cancelled | SessionStatus::Error
        )
    }

    /// Returns true if the session still occupies its owner's slot
    pub fn is_active(&self) -> bool {
        matches!(self, SessionStatus::Pending | SessionStatus::Running)
    }

    /// Whether `next` is a legal successor of this status
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        matches!(
            (self, next),
            (SessionStatus::Pending, SessionStatus::Running)
                | (
                    SessionStatus::Running,
                    SessionStatus::Completed | SessionStatus::Cancelled | SessionStatus::Error
                )
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
