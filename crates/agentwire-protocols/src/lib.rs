//! # agentwire Protocols
//!
//! Shared protocol definitions for the agentwire session backend.
//! Contains types and interface definitions only - no orchestration logic.
//!
//! ## Core Traits
//!
//! - [`ExecutionEngine`] - A runnable workflow that streams raw events
//! - [`DuplexChannel`] - The outbound half of a client connection
//!
//! ## Core Types
//!
//! - [`RunRequest`] - An inbound chat turn addressed to a workflow
//! - [`RawEvent`] / [`StreamEvent`] - Engine output before and after classification
//! - [`OutboundMessage`] - The stable wire shape clients consume

pub mod channel;
pub mod engine;
pub mod error;
pub mod event;
pub mod request;
pub mod types;
pub mod wire;

pub use channel::{ConnectionId, DuplexChannel};
pub use engine::{ExecutionEngine, RawEventStream, RunConfig};
pub use error::{ChannelError, EngineError, RequestError};
pub use event::{RawEvent, StreamEvent, StreamMode};
pub use request::{RunRequest, RESERVED_KEYS};
pub use types::*;
pub use wire::{OutboundMessage, CANCELLED_CONTENT};
