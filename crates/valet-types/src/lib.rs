//! Shared domain types for Valet.
//!
//! Contains the workflow wire schema, step execution results, conversation
//! memory entries, LLM request/response shapes, configuration, and the
//! cross-crate error taxonomy.

pub mod config;
pub mod error;
pub mod llm;
pub mod memory;
pub mod workflow;
