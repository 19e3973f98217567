use serde::{Deserialize, Serialize};

use crate::values::{Price, Quantity};

/// Status carried by a progress event
///
/// Mirrors the session status at emission time, plus the intra-slice
/// `slice_started` and `partial_fill` markers and the adapter-level `info`
/// acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Running,
    Completed,
    Cancelled,
    Error,
    SliceStarted,
    PartialFill,
    Info,
}

/// Outbound progress message
///
/// Wire shape: `{ status, slice?, total_slices?, message?, size?, price?, order_id? }`.
/// Absent fields are omitted rather than sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub status: ProgressStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slice: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_slices: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Filled base quantity of the slice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Quantity>,
    /// Execution price of the slice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

impl ProgressEvent {
    fn bare(status: ProgressStatus) -> Self {
        Self {
            status,
            slice: None,
            total_slices: None,
            message: None,
            size: None,
            price: None,
            order_id: None,
        }
    }

    fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn with_slice(mut self, slice: u32, total_slices: u32) -> Self {
        self.slice = Some(slice);
        self.total_slices = Some(total_slices);
        self
    }

    /// `{status: "running", message: "started"}`
    pub fn started() -> Self {
        Self::bare(ProgressStatus::Running).with_message("started")
    }

    pub fn slice_started(slice: u32, total_slices: u32) -> Self {
        Self::bare(ProgressStatus::SliceStarted).with_slice(slice, total_slices)
    }

    pub fn slice_filled(
        slice: u32,
        total_slices: u32,
        size: Quantity,
        price: Price,
        order_id: impl Into<String>,
    ) -> Self {
        let mut event = Self::bare(ProgressStatus::Running)
            .with_slice(slice, total_slices)
            .with_message("slice filled");
        event.size = Some(size);
        event.price = Some(price);
        event.order_id = Some(order_id.into());
        event
    }

    /// Intra-slice progress; `size` is cumulative within the slice
    pub fn partial_fill(slice: u32, total_slices: u32, size: Quantity, price: Price) -> Self {
        let mut event = Self::bare(ProgressStatus::PartialFill).with_slice(slice, total_slices);
        event.size = Some(size);
        event.price = Some(price);
        event
    }

    pub fn completed() -> Self {
        Self::bare(ProgressStatus::Completed).with_message("all slices executed")
    }

    /// `slice` is the number of slices attempted before the cancel took effect
    pub fn cancelled(slice: u32, total_slices: u32) -> Self {
        Self::bare(ProgressStatus::Cancelled)
            .with_slice(slice, total_slices)
            .with_message("TWAP cancelled by user")
    }

    /// Session-level failure of one slice
    pub fn slice_error(slice: u32, total_slices: u32, reason: impl Into<String>) -> Self {
        Self::bare(ProgressStatus::Error)
            .with_slice(slice, total_slices)
            .with_message(reason)
    }

    /// Rejection that happened before or outside any session
    pub fn error(reason: impl Into<String>) -> Self {
        Self::bare(ProgressStatus::Error).with_message(reason)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::bare(ProgressStatus::Info).with_message(message)
    }

    /// Slice-level `running` event (a filled slice, not the start notice)
    pub fn is_slice_fill(&self) -> bool {
        self.status == ProgressStatus::Running && self.slice.is_some()
    }

    /// Whether this event closes a session
    pub fn is_terminal(&self) -> bool {
        match self.status {
            ProgressStatus::Completed | ProgressStatus::Cancelled => true,
            // Pre-session rejections carry no slice and end nothing
            ProgressStatus::Error => self.slice.is_some(),
            _ => false,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
