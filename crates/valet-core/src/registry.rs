//! Action registry and dispatch shim.
//!
//! Maps action names to handlers with declared parameter schemas. The
//! schema is first-class data: the dispatcher selects the subset of a
//! step's populated fields the handler accepts, reports the subset it
//! drops, and checks required parameters before the handler ever runs --
//! no reflection, no error-text parsing.
//!
//! The registry is effectively append-only shared state: `register` is the
//! only mutation and the single entry point for new capability, which is
//! why every registration is logged with its provenance.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use valet_types::error::{DispatchError, HandlerError};
use valet_types::workflow::Step;

use crate::session::SessionContext;

// ---------------------------------------------------------------------------
// Parameter schema
// ---------------------------------------------------------------------------

/// Arguments passed to a handler: populated step fields the handler accepts.
pub type ArgMap = BTreeMap<String, Value>;

/// One declared handler parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub required: bool,
}

impl ParamSpec {
    pub fn required(name: impl Into<String>) -> Self {
        ParamSpec {
            name: name.into(),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        ParamSpec {
            name: name.into(),
            required: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Handler trait
// ---------------------------------------------------------------------------

/// The executable logic behind one action name.
///
/// Object-safe (boxed future) because the registry stores handlers behind
/// `Arc<dyn ActionHandler>`.
pub trait ActionHandler: Send + Sync {
    fn call<'a>(
        &'a self,
        args: &'a ArgMap,
        session: &'a SessionContext,
    ) -> Pin<Box<dyn Future<Output = Result<String, HandlerError>> + Send + 'a>>;
}

/// Where a registry entry came from. Synthesized entries record who asked,
/// since registration is the system's most security-sensitive operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    Builtin,
    Synthesized { requested_by: String },
}

/// One registered action: handler plus declared parameter schema.
#[derive(Clone)]
pub struct RegistryEntry {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
    pub provenance: Provenance,
    pub handler: Arc<dyn ActionHandler>,
}

impl RegistryEntry {
    /// Accepted parameter names, in declaration order.
    pub fn accepted_parameters(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// Invocation outcome
// ---------------------------------------------------------------------------

/// The outcome of dispatching one step, including the extra-parameter
/// diagnostics. `dropped` lists fields that were populated on the step but
/// not accepted by the handler; it is reported even when dispatch fails.
#[derive(Debug)]
pub struct Invocation {
    pub result: Result<String, DispatchError>,
    pub dropped: Vec<String>,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Name → handler lookup. Entries are never removed during a run; the only
/// writer after startup is the tool synthesizer.
#[derive(Default)]
pub struct ActionRegistry {
    entries: DashMap<String, RegistryEntry>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        ActionRegistry::default()
    }

    /// Register (or replace) an entry. Idempotent per name: re-registering
    /// the same name replaces the previous handler, never removes it.
    pub fn register(&self, entry: RegistryEntry) {
        tracing::info!(
            action = %entry.name,
            provenance = ?entry.provenance,
            params = ?entry.accepted_parameters(),
            "registering action handler"
        );
        self.entries.insert(entry.name.clone(), entry);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Resolve an action name to its entry.
    pub fn resolve(&self, name: &str) -> Option<RegistryEntry> {
        self.entries.get(name).map(|e| e.clone())
    }

    /// The accepted parameter names for a registered action.
    pub fn accepted_parameters(&self, name: &str) -> Option<Vec<String>> {
        self.entries
            .get(name)
            .map(|e| e.params.iter().map(|p| p.name.clone()).collect())
    }

    /// All registered entries, sorted by name.
    pub fn snapshot(&self) -> Vec<RegistryEntry> {
        let mut entries: Vec<RegistryEntry> =
            self.entries.iter().map(|e| e.value().clone()).collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    /// Split a step's populated fields into the accepted argument map and
    /// the dropped field names, per the entry's declared parameters.
    pub fn partition_args(entry: &RegistryEntry, step: &Step) -> (ArgMap, Vec<String>) {
        let accepted_names = entry.accepted_parameters();
        let mut args = ArgMap::new();
        let mut dropped = Vec::new();
        for (name, value) in step.populated_fields() {
            if accepted_names.contains(&name.as_str()) {
                args.insert(name, value);
            } else {
                dropped.push(name);
            }
        }
        (args, dropped)
    }

    /// Dispatch a step to its handler.
    ///
    /// Selects exactly the populated fields the handler accepts, reports the
    /// rest as dropped, verifies required parameters up front, and maps
    /// handler failures to [`DispatchError::Handler`] with the message
    /// preserved verbatim.
    pub async fn invoke(&self, name: &str, step: &Step, session: &SessionContext) -> Invocation {
        let Some(entry) = self.resolve(name) else {
            return Invocation {
                result: Err(DispatchError::UnknownAction(name.to_string())),
                dropped: Vec::new(),
            };
        };

        let (args, dropped) = Self::partition_args(&entry, step);
        if !dropped.is_empty() {
            tracing::warn!(
                action = name,
                dropped = ?dropped,
                "extra parameters dropped"
            );
        }

        let missing: Vec<String> = entry
            .params
            .iter()
            .filter(|p| p.required && !args.contains_key(&p.name))
            .map(|p| p.name.clone())
            .collect();
        if !missing.is_empty() {
            tracing::warn!(action = name, missing = ?missing, "missing required arguments");
            return Invocation {
                result: Err(DispatchError::MissingArguments { missing }),
                dropped,
            };
        }

        let result = entry
            .handler
            .call(&args, session)
            .await
            .map_err(DispatchError::Handler);
        Invocation { result, dropped }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
