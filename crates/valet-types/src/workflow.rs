//! Workflow domain types for Valet.
//!
//! Defines the wire schema for assistant workflows: an ordered sequence of
//! [`Step`]s, each naming an action from the closed [`KnownAction`] set and
//! carrying action-specific optional parameters. Also contains the execution
//! report types ([`StepResult`], [`WorkflowReport`]).
//!
//! A `Step` keeps the flat optional-field shape of the wire format so that
//! absent fields stay distinguishable from empty strings; the flattened
//! `populated_fields` view is what the dispatcher and the extra-parameter
//! diagnostics operate on.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// KnownAction (closed set accepted by schema validation)
// ---------------------------------------------------------------------------

/// The closed set of action names the workflow schema accepts.
///
/// Steps constructed directly (bypassing schema validation) may carry any
/// non-empty action string; the engine treats names outside this set as
/// unknown and routes them through keyword fallback or tool synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnownAction {
    CreateLetter,
    EditLetter,
    ReadLetter,
    ClearLetter,
    SendLetterViaEmailMacos,
    WebSearch,
    TranscribeExactly,
    PerformCalculation,
    HandleGeneralChat,
    OpenApplication,
    SystemCommand,
    DiscussProgramming,
}

impl KnownAction {
    /// All schema-accepted actions, in declaration order.
    pub const ALL: [KnownAction; 12] = [
        KnownAction::CreateLetter,
        KnownAction::EditLetter,
        KnownAction::ReadLetter,
        KnownAction::ClearLetter,
        KnownAction::SendLetterViaEmailMacos,
        KnownAction::WebSearch,
        KnownAction::TranscribeExactly,
        KnownAction::PerformCalculation,
        KnownAction::HandleGeneralChat,
        KnownAction::OpenApplication,
        KnownAction::SystemCommand,
        KnownAction::DiscussProgramming,
    ];

    /// The snake_case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownAction::CreateLetter => "create_letter",
            KnownAction::EditLetter => "edit_letter",
            KnownAction::ReadLetter => "read_letter",
            KnownAction::ClearLetter => "clear_letter",
            KnownAction::SendLetterViaEmailMacos => "send_letter_via_email_macos",
            KnownAction::WebSearch => "web_search",
            KnownAction::TranscribeExactly => "transcribe_exactly",
            KnownAction::PerformCalculation => "perform_calculation",
            KnownAction::HandleGeneralChat => "handle_general_chat",
            KnownAction::OpenApplication => "open_application",
            KnownAction::SystemCommand => "system_command",
            KnownAction::DiscussProgramming => "discuss_programming",
        }
    }
}

impl fmt::Display for KnownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KnownAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KnownAction::ALL
            .iter()
            .find(|a| a.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown action: '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// One instruction within a workflow.
///
/// Which of the optional fields are meaningful depends on `action`. Absent
/// fields serialize as absent (never as `null` or `""`), so the dispatcher
/// can tell "not provided" from "provided empty".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// The action name. Non-empty; value equality only.
    pub action: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_instruction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,

    /// Generic key→value parameters for actions whose inputs fall outside
    /// the named fields (synthesized tools in particular).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, Value>>,
}

/// The named optional fields of a [`Step`], in wire order.
pub const STEP_FIELD_NAMES: [&str; 8] = [
    "subject",
    "body",
    "edit_instruction",
    "to_email",
    "query",
    "text",
    "command",
    "app_name",
];

impl Step {
    /// Create a step carrying only an action name.
    pub fn new(action: impl Into<String>) -> Self {
        Step {
            action: action.into(),
            subject: None,
            body: None,
            edit_instruction: None,
            to_email: None,
            query: None,
            text: None,
            command: None,
            app_name: None,
            params: None,
        }
    }

    /// The flattened `field name -> value` view of every populated field,
    /// excluding `action`: named fields first (wire order), then the keys of
    /// the generic `params` map.
    pub fn populated_fields(&self) -> Vec<(String, Value)> {
        let named: [(&str, &Option<String>); 8] = [
            ("subject", &self.subject),
            ("body", &self.body),
            ("edit_instruction", &self.edit_instruction),
            ("to_email", &self.to_email),
            ("query", &self.query),
            ("text", &self.text),
            ("command", &self.command),
            ("app_name", &self.app_name),
        ];

        let mut fields: Vec<(String, Value)> = named
            .iter()
            .filter_map(|(name, value)| {
                value
                    .as_ref()
                    .map(|v| (name.to_string(), Value::String(v.clone())))
            })
            .collect();

        if let Some(params) = &self.params {
            for (k, v) in params {
                fields.push((k.clone(), v.clone()));
            }
        }

        fields
    }

    /// Names of the populated fields, in the same order as
    /// [`Step::populated_fields`].
    pub fn populated_field_names(&self) -> Vec<String> {
        self.populated_fields().into_iter().map(|(k, _)| k).collect()
    }
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// An ordered sequence of steps submitted for execution.
///
/// Sequence order is execution order. A workflow with zero steps is valid
/// and executes to an empty result sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub steps: Vec<Step>,
    /// High-level description of the workflow's purpose.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Execution report
// ---------------------------------------------------------------------------

/// Per-step outcome classification.
///
/// The narrative contract still appends the confirmation-request suffix to
/// the message; the status field makes the same signal machine-readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Ok,
    NeedsConfirmation,
}

/// The result of executing one step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// The step's action name, echoed back.
    pub action: String,
    /// Human-readable result message. Always present, whatever happened.
    pub result: String,
    /// Whether the user should confirm this step's outcome.
    pub status: StepStatus,
    /// Populated step fields the resolved handler did not accept.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropped_params: Vec<String>,
}

impl StepResult {
    /// Whether the step was flagged for user confirmation.
    pub fn needs_confirmation(&self) -> bool {
        self.status == StepStatus::NeedsConfirmation
    }
}

/// The full execution report: the validated workflow plus one result per
/// step, in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowReport {
    pub workflow: Workflow,
    pub results: Vec<StepResult>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -----------------------------------------------------------------------
    // KnownAction
    // -----------------------------------------------------------------------

    #[test]
    fn test_known_action_wire_names_roundtrip() {
        for action in KnownAction::ALL {
            let parsed: KnownAction = action.as_str().parse().unwrap();
            assert_eq!(parsed, action);

            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.as_str()));
        }
    }

    #[test]
    fn test_known_action_rejects_unlisted_name() {
        assert!("summon_butler".parse::<KnownAction>().is_err());
        assert!("".parse::<KnownAction>().is_err());
    }

    // -----------------------------------------------------------------------
    // Step: absence vs emptiness
    // -----------------------------------------------------------------------

    #[test]
    fn test_step_absent_fields_not_serialized() {
        let step = Step::new("read_letter");
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json, json!({"action": "read_letter"}));
    }

    #[test]
    fn test_step_empty_string_distinct_from_absent() {
        let mut step = Step::new("create_letter");
        step.subject = Some(String::new());

        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["subject"], json!(""));

        let parsed: Step = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.subject.as_deref(), Some(""));
        assert!(parsed.body.is_none());
    }

    // -----------------------------------------------------------------------
    // Step: populated_fields ordering
    // -----------------------------------------------------------------------

    #[test]
    fn test_populated_fields_named_before_params() {
        let mut step = Step::new("web_search");
        step.query = Some("rust workspaces".to_string());
        step.subject = Some("ignored by handler".to_string());
        step.params = Some(BTreeMap::from([(
            "locale".to_string(),
            json!("en-GB"),
        )]));

        let names = step.populated_field_names();
        assert_eq!(names, vec!["subject", "query", "locale"]);
    }

    #[test]
    fn test_populated_fields_empty_for_bare_step() {
        let step = Step::new("read_letter");
        assert!(step.populated_fields().is_empty());
    }

    // -----------------------------------------------------------------------
    // Workflow roundtrip
    // -----------------------------------------------------------------------

    #[test]
    fn test_workflow_json_roundtrip() {
        let wf = Workflow {
            steps: vec![
                {
                    let mut s = Step::new("create_letter");
                    s.subject = Some("Greetings".to_string());
                    s.body = Some("Hello there.".to_string());
                    s
                },
                {
                    let mut s = Step::new("send_letter_via_email_macos");
                    s.to_email = Some("friend@example.com".to_string());
                    s
                },
            ],
            description: Some("Draft and send a letter".to_string()),
        };

        let json_str = serde_json::to_string(&wf).unwrap();
        let parsed: Workflow = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed, wf);
    }

    #[test]
    fn test_workflow_ignores_unknown_top_level_fields() {
        let wf: Workflow = serde_json::from_value(json!({
            "steps": [],
            "confidence": 0.93
        }))
        .unwrap();
        assert!(wf.steps.is_empty());
        assert!(wf.description.is_none());
    }

    // -----------------------------------------------------------------------
    // StepResult serialization
    // -----------------------------------------------------------------------

    #[test]
    fn test_step_result_omits_empty_dropped_params() {
        let result = StepResult {
            action: "read_letter".to_string(),
            result: "Here is your current letter:".to_string(),
            status: StepStatus::Ok,
            dropped_params: vec![],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("dropped_params").is_none());
        assert_eq!(json["status"], "ok");
    }

    #[test]
    fn test_step_result_needs_confirmation() {
        let result = StepResult {
            action: "system_command".to_string(),
            result: "not executed".to_string(),
            status: StepStatus::NeedsConfirmation,
            dropped_params: vec!["subject".to_string()],
        };
        assert!(result.needs_confirmation());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "needs_confirmation");
        assert_eq!(json["dropped_params"], json!(["subject"]));
    }
}
