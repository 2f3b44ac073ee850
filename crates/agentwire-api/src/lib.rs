//! # agentwire API
//!
//! Client-facing transport for the session orchestrator.
//!
//! - **WebSocket** (`/ws`): one duplex channel per connection. Every inbound
//!   run request is spawned as its own task; the orchestrator's connection
//!   lock keeps them in order.
//! - **HTTP**: chat history reads, workflow listing and a health check.

pub mod error;
pub mod http;
pub mod server;
pub mod state;
pub mod websocket;

pub use error::ApiError;
pub use http::routes::create_router;
pub use server::{ApiServer, ServerOptions};
pub use state::AppState;
pub use websocket::{InboundFrame, RunTracker, WsChannel, INVALID_MESSAGE};
