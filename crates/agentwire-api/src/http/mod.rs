//! HTTP interface module.
//!
//! Side reads that do not go through a WebSocket connection:
//! - Chat history per thread
//! - Configured workflows
//! - Health check

pub mod handlers;
pub mod routes;
