//! Workflow schema validation and execution.

pub mod engine;
pub mod schema;

pub use engine::WorkflowEngine;
pub use schema::{validate_str, validate_value};
