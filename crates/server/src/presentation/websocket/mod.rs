//! TWAP channel over WebSocket
//!
//! One connection is one owner. Text frames carry start and cancel commands;
//! progress events flow back as JSON text frames in emission order.

mod handler;

pub use handler::{WsState, ws_handler};
