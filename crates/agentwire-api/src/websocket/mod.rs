//! WebSocket transport.
//!
//! Each connection gets a [`WsChannel`] for outbound messages and a
//! [`RunTracker`] that owns the cancellation tokens of its in-flight runs.

mod channel;
mod frame;
mod handler;
mod tracker;

pub use channel::WsChannel;
pub use frame::{InboundFrame, INVALID_MESSAGE};
pub use handler::ws_handler;
pub use tracker::RunTracker;
