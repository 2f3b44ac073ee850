//! # agentwire Runtime
//!
//! Session orchestration for streaming workflow runs.
//!
//! - [`SessionOrchestrator`] serializes requests per connection and forwards
//!   engine output to the client
//! - [`WorkflowRegistry`] maps agent names to engine factories
//! - [`classify`] and [`encode`] turn raw engine events into wire messages
//! - [`StepGraph`] is a small checkpointing engine used by the built-in
//!   workflows

pub mod classifier;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod locks;
pub mod registry;
pub mod session;
pub mod workflows;

pub use classifier::{classify, extract_tool_calls};
pub use encoder::encode;
pub use engine::{merge_state, Node, NodeContext, NodeOutput, StepGraph};
pub use error::{RegistryError, SessionError};
pub use locks::ConnectionLocks;
pub use registry::{ResolvedWorkflow, WorkflowCatalog, WorkflowFactory, WorkflowRegistry};
pub use session::{RunSummary, SessionOrchestrator};
pub use workflows::echo::ECHO_LOCATOR;

// Re-export CancellationToken for convenience
pub use tokio_util::sync::CancellationToken;
