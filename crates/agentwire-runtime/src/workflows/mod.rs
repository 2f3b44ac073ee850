//! Built-in workflows.

pub mod echo;
