//! TWAP Core Domain
//!
//! Pure domain types for the TWAP execution service.
//! This crate contains no async, no I/O, and is 100% unit testable.
//!
//! - **Entities**: session parameters and the session status state machine
//! - **Messages**: inbound commands and outbound progress events, in their wire shape
//! - **Values**: identifiers and numeric aliases shared by every crate

pub mod entities;
pub mod error;
pub mod messages;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{SessionStatus, TwapParams};
pub use error::ValidationError;
pub use messages::{CancelCommand, InboundMessage, ProgressEvent, ProgressStatus, StartCommand};
pub use values::{OwnerId, Price, Quantity, SessionId, Timestamp, split_instrument};
