//! Wire messages exchanged with a session owner
//!
//! Inbound: [`StartCommand`] and [`CancelCommand`], decoded by [`InboundMessage::parse`].
//! Outbound: [`ProgressEvent`], one per meaningful transition.

mod command;
mod progress;

pub use command::{CancelCommand, InboundMessage, StartCommand};
pub use progress::{ProgressEvent, ProgressStatus};
