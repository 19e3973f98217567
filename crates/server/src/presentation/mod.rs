//! HTTP and WebSocket surface

pub mod router;
pub mod websocket;

pub use router::{HealthResponse, create_router};
pub use websocket::{WsState, ws_handler};
