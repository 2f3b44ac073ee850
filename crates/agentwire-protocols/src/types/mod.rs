//! Common types used across agentwire.

mod content;
mod message;
mod state;

pub use content::*;
pub use message::*;
pub use state::*;
