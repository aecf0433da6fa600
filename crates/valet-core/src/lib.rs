//! Core engine for Valet.
//!
//! Contains schema validation, the action registry and dispatch shim, the
//! workflow execution state machine, the platform-open fallback, the intent
//! planner, session state, and the collaborator traits (completion provider,
//! calculator, app launcher, mailer, memory store, tool synthesizer) whose
//! implementations live in `valet-infra`.

pub mod llm;
pub mod mail;
pub mod memory;
pub mod planner;
pub mod platform;
pub mod registry;
pub mod session;
pub mod synth;
pub mod workflow;
