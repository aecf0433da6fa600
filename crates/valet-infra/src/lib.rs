//! Infrastructure implementations for Valet.
//!
//! Concrete collaborators behind the traits `valet-core` defines: the
//! OpenAI completion provider, the Wolfram|Alpha calculator, the process
//! app launcher, the AppleScript mailer, the JSONL memory store, the
//! manifest-based tool synthesizer, and the builtin action handlers.

pub mod actions;
pub mod calc;
pub mod config;
pub mod launcher;
pub mod llm;
pub mod mail;
pub mod memory;
pub mod synth;
