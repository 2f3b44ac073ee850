//! A minimal step-graph execution engine.

mod graph;
mod reducer;

pub use graph::{Node, NodeContext, NodeOutput, StepGraph};
pub use reducer::merge_state;
