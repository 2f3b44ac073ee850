//! Error types for the agentwire protocol layer.

mod channel;
mod engine;
mod request;

pub use channel::*;
pub use engine::*;
pub use request::*;
