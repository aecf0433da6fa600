//! Workflow schema validation.
//!
//! Accepts a workflow payload as either a serialized JSON string or an
//! already-parsed value, and checks it against the closed action set before
//! anything executes. Validation is deterministic, side-effect free, and
//! collects every violation (each with a dotted field path) rather than
//! stopping at the first.

use serde_json::Value;
use valet_types::error::{ValidationFailure, Violation};
use valet_types::workflow::{KnownAction, STEP_FIELD_NAMES, Workflow};

/// Validate a serialized workflow payload.
pub fn validate_str(raw: &str) -> Result<Workflow, ValidationFailure> {
    let value: Value = serde_json::from_str(raw).map_err(|e| {
        ValidationFailure::new(vec![Violation {
            path: String::new(),
            reason: format!("invalid JSON: {e}"),
        }])
    })?;
    validate_value(&value)
}

/// Validate an already-parsed workflow payload.
///
/// A payload parses into a [`Workflow`] exactly when the top level is an
/// object with a `steps` array (possibly empty) and each element's `action`
/// is one of the enumerated action names. Unknown top-level fields are
/// ignored; an unknown `action` is a violation, not a silent drop.
pub fn validate_value(value: &Value) -> Result<Workflow, ValidationFailure> {
    let mut violations = Vec::new();

    let Some(root) = value.as_object() else {
        return Err(ValidationFailure::new(vec![Violation {
            path: String::new(),
            reason: "payload must be a JSON object".to_string(),
        }]));
    };

    match root.get("steps") {
        None => violations.push(Violation {
            path: "steps".to_string(),
            reason: "missing required field".to_string(),
        }),
        Some(steps) => match steps.as_array() {
            None => violations.push(Violation {
                path: "steps".to_string(),
                reason: "must be an array".to_string(),
            }),
            Some(steps) => {
                for (i, step) in steps.iter().enumerate() {
                    check_step(i, step, &mut violations);
                }
            }
        },
    }

    if let Some(description) = root.get("description") {
        if !description.is_string() && !description.is_null() {
            violations.push(Violation {
                path: "description".to_string(),
                reason: "must be a string".to_string(),
            });
        }
    }

    if !violations.is_empty() {
        tracing::debug!(count = violations.len(), "workflow payload rejected");
        return Err(ValidationFailure::new(violations));
    }

    serde_json::from_value(value.clone()).map_err(|e| {
        ValidationFailure::new(vec![Violation {
            path: String::new(),
            reason: format!("payload did not deserialize: {e}"),
        }])
    })
}

fn check_step(index: usize, step: &Value, violations: &mut Vec<Violation>) {
    let Some(obj) = step.as_object() else {
        violations.push(Violation {
            path: format!("steps.{index}"),
            reason: "must be an object".to_string(),
        });
        return;
    };

    match obj.get("action") {
        None => violations.push(Violation {
            path: format!("steps.{index}.action"),
            reason: "missing required field".to_string(),
        }),
        Some(action) => match action.as_str() {
            None => violations.push(Violation {
                path: format!("steps.{index}.action"),
                reason: "must be a string".to_string(),
            }),
            Some("") => violations.push(Violation {
                path: format!("steps.{index}.action"),
                reason: "must not be empty".to_string(),
            }),
            Some(name) => {
                if name.parse::<KnownAction>().is_err() {
                    violations.push(Violation {
                        path: format!("steps.{index}.action"),
                        reason: format!("unknown action: '{name}'"),
                    });
                }
            }
        },
    }

    for field in STEP_FIELD_NAMES {
        if let Some(v) = obj.get(field) {
            if !v.is_string() && !v.is_null() {
                violations.push(Violation {
                    path: format!("steps.{index}.{field}"),
                    reason: "must be a string".to_string(),
                });
            }
        }
    }

    if let Some(params) = obj.get("params") {
        if !params.is_object() && !params.is_null() {
            violations.push(Violation {
                path: format!("steps.{index}.params"),
                reason: "must be an object".to_string(),
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
