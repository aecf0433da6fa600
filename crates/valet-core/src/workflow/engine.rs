//! Workflow execution engine.
//!
//! A sequential, partial-failure-tolerant interpreter: steps run one at a
//! time in input order, every step terminates in a result string, and no
//! per-step failure ever propagates out of `execute`. Failures self-heal by
//! asking the user (missing arguments, handler errors) or by asking the
//! tool synthesizer for a brand-new handler (unknown actions).
//!
//! Per step: `Init -> SpecialCase? -> RegistryDispatch | PlatformOpen |
//! UnknownRecovery -> (ConfirmationNeeded?) -> Done`.

use std::sync::{Arc, LazyLock, Mutex};

use regex::Regex;
use valet_types::error::DispatchError;
use valet_types::workflow::{Step, StepResult, StepStatus, Workflow, WorkflowReport};

use crate::platform::{FAILURE_MARKER, PlatformOpener};
use crate::registry::ActionRegistry;
use crate::session::SessionContext;
use crate::synth::ToolSynthesizer;

/// Appended to (never replacing) a step's result whenever the user should
/// confirm the outcome.
pub const CONFIRMATION_SUFFIX: &str = " [Please confirm: Did this step succeed? \
If not, would you like to retry, clarify, or try an alternative?]";

/// Well-known application keywords scanned against the originating
/// utterance when an action is unknown.
const FALLBACK_APP_KEYWORDS: [&str; 6] = [
    "terminal",
    "photo booth",
    "camera",
    "reminders",
    "safari",
    "settings",
];

/// Matches an "open/launch/start <app>" verb phrase in a system command.
static OPEN_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(open|launch|start)\s+['"]?([a-zA-Z0-9 ._-]+)['"]?"#)
        .expect("open-command pattern is valid")
});

/// The most recent run, kept for diagnostics only (never consulted for
/// control decisions).
#[derive(Debug, Clone)]
pub struct LastRun {
    pub workflow: Workflow,
    pub results: Vec<StepResult>,
}

/// Validates and executes workflows against the action registry, with
/// platform-open and tool-synthesis fallbacks.
pub struct WorkflowEngine {
    registry: Arc<ActionRegistry>,
    opener: PlatformOpener,
    synthesizer: Arc<dyn ToolSynthesizer>,
    last: Mutex<Option<LastRun>>,
}

impl WorkflowEngine {
    pub fn new(
        registry: Arc<ActionRegistry>,
        opener: PlatformOpener,
        synthesizer: Arc<dyn ToolSynthesizer>,
    ) -> Self {
        tracing::info!("workflow engine initialized");
        WorkflowEngine {
            registry,
            opener,
            synthesizer,
            last: Mutex::new(None),
        }
    }

    pub fn registry(&self) -> &Arc<ActionRegistry> {
        &self.registry
    }

    /// The most recent workflow and its results, if any run has completed.
    pub fn last_run(&self) -> Option<LastRun> {
        self.last.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Execute every step of `workflow` in order.
    ///
    /// Returns exactly one [`StepResult`] per step, in input order. One
    /// step's failure never aborts the workflow; retry is always deferred
    /// to the user via the confirmation prompt.
    pub async fn execute(
        &self,
        workflow: &Workflow,
        utterance: Option<&str>,
        session: &SessionContext,
    ) -> WorkflowReport {
        tracing::info!(steps = workflow.steps.len(), "executing workflow");
        let mut results = Vec::with_capacity(workflow.steps.len());

        for step in &workflow.steps {
            tracing::info!(action = %step.action, "executing step");
            let outcome = self.execute_step(step, utterance, session).await;

            let mut result = outcome.message;
            if outcome.needs_confirmation {
                result.push_str(CONFIRMATION_SUFFIX);
            }
            results.push(StepResult {
                action: step.action.clone(),
                result,
                status: if outcome.needs_confirmation {
                    StepStatus::NeedsConfirmation
                } else {
                    StepStatus::Ok
                },
                dropped_params: outcome.dropped,
            });
        }

        let report = WorkflowReport {
            workflow: workflow.clone(),
            results,
        };
        *self.last.lock().unwrap_or_else(|e| e.into_inner()) = Some(LastRun {
            workflow: report.workflow.clone(),
            results: report.results.clone(),
        });
        report
    }

    async fn execute_step(
        &self,
        step: &Step,
        utterance: Option<&str>,
        session: &SessionContext,
    ) -> StepOutcome {
        // Special-case OS-launch detection. These claim the step before the
        // registry is ever consulted, even when the name is also registered.
        if step.action == "open_application" {
            // Provided-but-empty counts as provided: only absent fields fall
            // through to the registry's missing-argument self-healing.
            let hint = step
                .app_name
                .as_deref()
                .or(step.subject.as_deref())
                .or(step.body.as_deref());
            if let Some(hint) = hint {
                return self.open_via_platform(hint, step).await;
            }
            // No app hint at all: fall through to registry dispatch so the
            // missing-argument self-healing asks for one.
        } else if step.action == "system_command" {
            let command = step.command.as_deref().unwrap_or_default();
            if let Some(app) = extract_open_target(command) {
                return self.open_via_platform(&app, step).await;
            }
            // System commands are never actually run.
            tracing::warn!(command, "system command refused");
            return StepOutcome::confirm(format!(
                "System command '{command}' received (not executed for safety)."
            ));
        }

        // Registry dispatch.
        if self.registry.contains(&step.action) {
            return self.dispatch(step, session).await;
        }

        // Unknown-action recovery.
        self.recover_unknown(step, utterance, session).await
    }

    async fn open_via_platform(&self, hint: &str, step: &Step) -> StepOutcome {
        let message = self.opener.open(hint, step.subject.as_deref()).await;
        if message.contains(FAILURE_MARKER) {
            StepOutcome::confirm(message)
        } else {
            StepOutcome::ok(message)
        }
    }

    async fn dispatch(&self, step: &Step, session: &SessionContext) -> StepOutcome {
        let invocation = self.registry.invoke(&step.action, step, session).await;
        let dropped = invocation.dropped;
        match invocation.result {
            Ok(message) => StepOutcome {
                message,
                needs_confirmation: false,
                dropped,
            },
            Err(DispatchError::MissingArguments { missing }) => StepOutcome {
                message: format!(
                    "Step '{}' failed: missing required arguments: {}. \
                     Please provide the missing information to continue.",
                    step.action,
                    missing.join(", ")
                ),
                needs_confirmation: true,
                dropped,
            },
            Err(DispatchError::Handler(err)) => StepOutcome {
                message: format!("Error executing {}: {err}", step.action),
                needs_confirmation: true,
                dropped,
            },
            // The registry was consulted only after `contains`, but entries
            // are shared state; treat a lost race like any unknown action.
            Err(DispatchError::UnknownAction(_)) => StepOutcome::confirm(format!(
                "Auto-generated tool {} could not be loaded.",
                step.action
            )),
        }
    }

    async fn recover_unknown(
        &self,
        step: &Step,
        utterance: Option<&str>,
        session: &SessionContext,
    ) -> StepOutcome {
        tracing::warn!(action = %step.action, "unknown action");

        // Keyword fallback: infer a well-known app from the originating
        // utterance before resorting to synthesis.
        if let Some(utterance) = utterance {
            let lowered = utterance.to_lowercase();
            for app in FALLBACK_APP_KEYWORDS {
                if lowered.contains(app) {
                    tracing::info!(app, "keyword fallback from user utterance");
                    let message = self.opener.open(app, step.subject.as_deref()).await;
                    return StepOutcome::confirm(message);
                }
            }
        }

        // Auto-tool synthesis.
        let params = step.populated_field_names();
        let description = format!(
            "Auto-generated tool for action '{}' with parameters {params:?}.",
            step.action
        );
        match self
            .synthesizer
            .synthesize(&step.action, &params, &description)
            .await
        {
            Ok(marker) => {
                tracing::info!(action = %step.action, result = %marker, "tool synthesis succeeded");
                if self.registry.contains(&step.action) {
                    let invocation = self.registry.invoke(&step.action, step, session).await;
                    let dropped = invocation.dropped;
                    let message = match invocation.result {
                        Ok(message) => message,
                        Err(err) => {
                            format!("Auto-generated tool {} failed: {err}", step.action)
                        }
                    };
                    StepOutcome {
                        message,
                        needs_confirmation: true,
                        dropped,
                    }
                } else {
                    StepOutcome::confirm(format!(
                        "Auto-generated tool {} could not be loaded.",
                        step.action
                    ))
                }
            }
            Err(err) => {
                tracing::error!(action = %step.action, error = %err, "tool synthesis failed");
                StepOutcome::confirm(format!(
                    "Auto-generated tool {} could not be loaded.",
                    step.action
                ))
            }
        }
    }
}

/// Extract the app token from an "open/launch/start <app>" command phrase.
fn extract_open_target(command: &str) -> Option<String> {
    OPEN_COMMAND
        .captures(command)
        .map(|caps| caps[2].trim().to_string())
}

struct StepOutcome {
    message: String,
    needs_confirmation: bool,
    dropped: Vec<String>,
}

impl StepOutcome {
    fn ok(message: String) -> Self {
        StepOutcome {
            message,
            needs_confirmation: false,
            dropped: Vec::new(),
        }
    }

    fn confirm(message: String) -> Self {
        StepOutcome {
            message,
            needs_confirmation: true,
            dropped: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use valet_types::error::{HandlerError, SynthesisError};

    use crate::platform::{AppLauncher, LaunchCommand, LaunchError, Platform};
    use crate::registry::{ActionHandler, ArgMap, ParamSpec, Provenance, RegistryEntry};

    // -- Fakes ----------------------------------------------------------

    struct FakeLauncher {
        launched: Mutex<Vec<LaunchCommand>>,
        fail: bool,
    }

    impl FakeLauncher {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(FakeLauncher {
                launched: Mutex::new(Vec::new()),
                fail,
            })
        }

        fn launched_apps(&self) -> Vec<String> {
            self.launched
                .lock()
                .unwrap()
                .iter()
                .map(|c| c.args.last().cloned().unwrap_or_default())
                .collect()
        }
    }

    impl AppLauncher for FakeLauncher {
        fn launch<'a>(
            &'a self,
            command: &'a LaunchCommand,
        ) -> Pin<Box<dyn Future<Output = Result<(), LaunchError>> + Send + 'a>> {
            Box::pin(async move {
                self.launched.lock().unwrap().push(command.clone());
                if self.fail {
                    Err(LaunchError::Spawn("command not found".to_string()))
                } else {
                    Ok(())
                }
            })
        }
    }

    /// Counts invocations and echoes its `text` argument.
    struct Echo {
        calls: AtomicUsize,
    }

    impl Echo {
        fn new() -> Arc<Self> {
            Arc::new(Echo {
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl ActionHandler for Echo {
        fn call<'a>(
            &'a self,
            args: &'a ArgMap,
            _session: &'a SessionContext,
        ) -> Pin<Box<dyn Future<Output = Result<String, HandlerError>> + Send + 'a>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                let text = args.get("text").and_then(|v| v.as_str()).unwrap_or("");
                Ok(format!("echo: {text}"))
            })
        }
    }

    struct Failing;

    impl ActionHandler for Failing {
        fn call<'a>(
            &'a self,
            _args: &'a ArgMap,
            _session: &'a SessionContext,
        ) -> Pin<Box<dyn Future<Output = Result<String, HandlerError>> + Send + 'a>> {
            Box::pin(async { Err(HandlerError::new("upstream service unavailable")) })
        }
    }

    /// On success, registers an `Echo` handler for the requested action.
    struct ScriptedSynthesizer {
        registry: Arc<ActionRegistry>,
        succeed: bool,
        register: bool,
        requests: Mutex<Vec<String>>,
    }

    impl ToolSynthesizer for ScriptedSynthesizer {
        fn synthesize<'a>(
            &'a self,
            action: &'a str,
            params: &'a [String],
            _description: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<String, SynthesisError>> + Send + 'a>> {
            Box::pin(async move {
                self.requests.lock().unwrap().push(action.to_string());
                if !self.succeed {
                    return Err(SynthesisError::Generation("model refused".to_string()));
                }
                if self.register {
                    self.registry.register(RegistryEntry {
                        name: action.to_string(),
                        description: "synthesized".to_string(),
                        params: params.iter().map(ParamSpec::optional).collect(),
                        provenance: Provenance::Synthesized {
                            requested_by: "test".to_string(),
                        },
                        handler: Echo::new(),
                    });
                }
                Ok(format!("Synthesized and registered new tool: {action}"))
            })
        }
    }

    // -- Harness --------------------------------------------------------

    struct Harness {
        engine: WorkflowEngine,
        launcher: Arc<FakeLauncher>,
        registry: Arc<ActionRegistry>,
        session: SessionContext,
    }

    fn harness(synth_succeeds: bool, synth_registers: bool, launcher_fails: bool) -> Harness {
        let registry = Arc::new(ActionRegistry::new());
        let launcher = FakeLauncher::new(launcher_fails);
        let opener = PlatformOpener::new(Platform::MacOs, launcher.clone());
        let synthesizer = Arc::new(ScriptedSynthesizer {
            registry: registry.clone(),
            succeed: synth_succeeds,
            register: synth_registers,
            requests: Mutex::new(Vec::new()),
        });
        Harness {
            engine: WorkflowEngine::new(registry.clone(), opener, synthesizer),
            launcher,
            registry,
            session: SessionContext::new(),
        }
    }

    fn echo_entry(name: &str, required: &[&str]) -> RegistryEntry {
        let mut params = vec![ParamSpec::optional("text")];
        params.extend(required.iter().map(|n| ParamSpec::required(*n)));
        RegistryEntry {
            name: name.to_string(),
            description: "test echo".to_string(),
            params,
            provenance: Provenance::Builtin,
            handler: Echo::new(),
        }
    }

    fn workflow(steps: Vec<Step>) -> Workflow {
        Workflow {
            steps,
            description: None,
        }
    }

    // -----------------------------------------------------------------------
    // Result cardinality and ordering
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_n_steps_yield_n_results_in_order() {
        let h = harness(false, false, false);
        h.registry.register(echo_entry("handle_general_chat", &[]));
        h.registry.register(RegistryEntry {
            name: "perform_calculation".to_string(),
            description: "always fails".to_string(),
            params: vec![],
            provenance: Provenance::Builtin,
            handler: Arc::new(Failing),
        });

        let wf = workflow(vec![
            {
                let mut s = Step::new("handle_general_chat");
                s.text = Some("hi".to_string());
                s
            },
            Step::new("perform_calculation"),
            Step::new("handle_general_chat"),
        ]);

        let report = h.engine.execute(&wf, None, &h.session).await;
        assert_eq!(report.results.len(), 3);
        assert_eq!(report.results[0].action, "handle_general_chat");
        assert_eq!(report.results[0].result, "echo: hi");
        assert_eq!(report.results[1].action, "perform_calculation");
        assert!(report.results[1].needs_confirmation());
        assert_eq!(report.results[2].result, "echo: ");
    }

    #[tokio::test]
    async fn test_empty_workflow_executes_to_empty_results() {
        let h = harness(false, false, false);
        let report = h.engine.execute(&workflow(vec![]), None, &h.session).await;
        assert!(report.results.is_empty());
    }

    // -----------------------------------------------------------------------
    // Special case: open_application
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_open_application_bypasses_registered_handler() {
        let h = harness(false, false, false);
        // Even with a registered handler of the same name, the special case
        // routes through the platform opener.
        let counter = Echo::new();
        h.registry.register(RegistryEntry {
            name: "open_application".to_string(),
            description: "should not run".to_string(),
            params: vec![ParamSpec::optional("app_name")],
            provenance: Provenance::Builtin,
            handler: counter.clone(),
        });

        let mut step = Step::new("open_application");
        step.app_name = Some("Terminal".to_string());
        let report = h.engine.execute(&workflow(vec![step]), None, &h.session).await;

        assert_eq!(counter.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.launcher.launched_apps(), vec!["Terminal"]);
        assert_eq!(
            report.results[0].result,
            "Opened Terminal on your macOS system."
        );
        assert!(!report.results[0].needs_confirmation());
    }

    #[tokio::test]
    async fn test_open_application_hint_falls_back_to_subject() {
        let h = harness(false, false, false);
        let mut step = Step::new("open_application");
        step.subject = Some("camera".to_string());
        let report = h.engine.execute(&workflow(vec![step]), None, &h.session).await;
        assert!(report.results[0].result.contains("Photo Booth"));
    }

    #[tokio::test]
    async fn test_open_application_failure_asks_for_confirmation() {
        let h = harness(false, false, true);
        let mut step = Step::new("open_application");
        step.app_name = Some("Safari".to_string());
        let report = h.engine.execute(&workflow(vec![step]), None, &h.session).await;

        let result = &report.results[0];
        assert!(result.result.contains(FAILURE_MARKER));
        assert!(result.result.ends_with(CONFIRMATION_SUFFIX));
        assert!(result.needs_confirmation());
    }

    #[tokio::test]
    async fn test_open_application_empty_hint_is_still_a_hint() {
        let h = harness(false, false, false);
        // A registered handler must not be consulted: empty is provided.
        let counter = Echo::new();
        h.registry.register(RegistryEntry {
            name: "open_application".to_string(),
            description: "should not run".to_string(),
            params: vec![ParamSpec::required("app_name")],
            provenance: Provenance::Builtin,
            handler: counter.clone(),
        });

        let mut step = Step::new("open_application");
        step.app_name = Some(String::new());
        let report = h.engine.execute(&workflow(vec![step]), None, &h.session).await;

        assert_eq!(counter.calls.load(Ordering::SeqCst), 0);
        assert!(h.launcher.launched_apps().is_empty());
        assert!(
            report.results[0].result.starts_with("Unknown action:"),
            "got: {}",
            report.results[0].result
        );
    }

    #[tokio::test]
    async fn test_open_application_without_hint_self_heals_via_registry() {
        let h = harness(false, false, false);
        h.registry.register(RegistryEntry {
            name: "open_application".to_string(),
            description: "opens an app".to_string(),
            params: vec![ParamSpec::required("app_name")],
            provenance: Provenance::Builtin,
            handler: Echo::new(),
        });

        let report = h
            .engine
            .execute(&workflow(vec![Step::new("open_application")]), None, &h.session)
            .await;
        assert!(report.results[0].result.contains("app_name"));
        assert!(report.results[0].needs_confirmation());
    }

    // -----------------------------------------------------------------------
    // Special case: system_command
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_system_command_open_phrase_extracts_app() {
        let h = harness(false, false, false);
        let mut step = Step::new("system_command");
        step.command = Some("open Safari".to_string());
        let report = h.engine.execute(&workflow(vec![step]), None, &h.session).await;

        assert_eq!(h.launcher.launched_apps(), vec!["Safari"]);
        assert!(report.results[0].result.contains("Safari (web browser)"));
    }

    #[tokio::test]
    async fn test_system_command_refuses_everything_else() {
        let h = harness(false, false, false);
        let mut step = Step::new("system_command");
        step.command = Some("rm -rf /".to_string());
        let report = h.engine.execute(&workflow(vec![step]), None, &h.session).await;

        let result = &report.results[0];
        assert_eq!(
            result.result,
            format!(
                "System command 'rm -rf /' received (not executed for safety).{CONFIRMATION_SUFFIX}"
            )
        );
        assert!(result.needs_confirmation());
        assert!(h.launcher.launched_apps().is_empty());
    }

    #[test]
    fn test_extract_open_target_patterns() {
        assert_eq!(extract_open_target("open Safari").as_deref(), Some("Safari"));
        assert_eq!(
            extract_open_target("please LAUNCH 'Photo Booth'").as_deref(),
            Some("Photo Booth")
        );
        assert_eq!(extract_open_target("start cmd").as_deref(), Some("cmd"));
        assert_eq!(extract_open_target("rm -rf /"), None);
        assert_eq!(extract_open_target(""), None);
    }

    // -----------------------------------------------------------------------
    // Self-healing: missing arguments and handler errors
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_missing_argument_names_listed() {
        let h = harness(false, false, false);
        h.registry.register(echo_entry("create_letter", &["subject"]));

        let report = h
            .engine
            .execute(&workflow(vec![Step::new("create_letter")]), None, &h.session)
            .await;

        let result = &report.results[0];
        assert!(result.result.contains("subject"), "got: {}", result.result);
        assert!(result.result.ends_with(CONFIRMATION_SUFFIX));
    }

    #[tokio::test]
    async fn test_handler_error_preserved_and_flagged() {
        let h = harness(false, false, false);
        h.registry.register(RegistryEntry {
            name: "perform_calculation".to_string(),
            description: "fails".to_string(),
            params: vec![ParamSpec::optional("query")],
            provenance: Provenance::Builtin,
            handler: Arc::new(Failing),
        });

        let report = h
            .engine
            .execute(
                &workflow(vec![Step::new("perform_calculation")]),
                None,
                &h.session,
            )
            .await;

        let result = &report.results[0];
        assert!(
            result
                .result
                .starts_with("Error executing perform_calculation: upstream service unavailable")
        );
        assert!(result.needs_confirmation());
    }

    #[tokio::test]
    async fn test_dropped_params_surfaced_in_result() {
        let h = harness(false, false, false);
        h.registry.register(echo_entry("handle_general_chat", &[]));

        let mut step = Step::new("handle_general_chat");
        step.text = Some("hello".to_string());
        step.subject = Some("unrelated".to_string());
        let report = h.engine.execute(&workflow(vec![step]), None, &h.session).await;

        assert_eq!(report.results[0].dropped_params, vec!["subject"]);
        assert_eq!(report.results[0].result, "echo: hello");
    }

    // -----------------------------------------------------------------------
    // Unknown-action recovery
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_keyword_fallback_from_utterance() {
        let h = harness(true, true, false);
        let report = h
            .engine
            .execute(
                &workflow(vec![Step::new("snap_a_picture")]),
                Some("hey, open Photo Booth for me"),
                &h.session,
            )
            .await;

        assert_eq!(h.launcher.launched_apps(), vec!["Photo Booth"]);
        let result = &report.results[0];
        assert!(result.result.contains("Photo Booth"));
        assert!(result.needs_confirmation());
    }

    #[tokio::test]
    async fn test_synthesis_success_invokes_new_handler() {
        let h = harness(true, true, false);
        let mut step = Step::new("fetch_stock_price");
        step.text = Some("AAPL".to_string());

        let report = h.engine.execute(&workflow(vec![step]), None, &h.session).await;

        assert!(h.registry.contains("fetch_stock_price"));
        let result = &report.results[0];
        assert!(result.result.starts_with("echo: AAPL"), "got: {}", result.result);
        assert!(result.needs_confirmation());
    }

    #[tokio::test]
    async fn test_synthesis_success_but_unresolvable_reports_not_loaded() {
        let h = harness(true, false, false);
        let report = h
            .engine
            .execute(&workflow(vec![Step::new("fetch_stock_price")]), None, &h.session)
            .await;

        assert!(
            report.results[0]
                .result
                .contains("Auto-generated tool fetch_stock_price could not be loaded.")
        );
    }

    #[tokio::test]
    async fn test_synthesis_failure_reports_not_loaded() {
        let h = harness(false, false, false);
        let report = h
            .engine
            .execute(&workflow(vec![Step::new("fetch_stock_price")]), None, &h.session)
            .await;

        let result = &report.results[0];
        assert!(result.result.contains("could not be loaded"));
        assert!(result.result.ends_with(CONFIRMATION_SUFFIX));
    }

    // -----------------------------------------------------------------------
    // Diagnostics
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_last_run_retained() {
        let h = harness(false, false, false);
        h.registry.register(echo_entry("handle_general_chat", &[]));

        assert!(h.engine.last_run().is_none());
        let wf = workflow(vec![Step::new("handle_general_chat")]);
        h.engine.execute(&wf, None, &h.session).await;

        let last = h.engine.last_run().unwrap();
        assert_eq!(last.workflow, wf);
        assert_eq!(last.results.len(), 1);
    }
}
