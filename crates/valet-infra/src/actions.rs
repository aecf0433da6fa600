//! Builtin action handlers.
//!
//! One handler per schema-accepted action, wired into a fresh
//! [`ActionRegistry`] by [`builtin_registry`]. Handlers that depend on an
//! unconfigured collaborator (missing API key, no mail client) fail with a
//! user-facing message instead of being left out of the registry, so the
//! capability listing stays stable across machines.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use valet_core::llm::{CalculatorDyn, CompletionProviderDyn};
use valet_core::mail::{EmailDraft, Mailer};
use valet_core::platform::{AppLauncher, FAILURE_MARKER, LaunchCommand, Platform, PlatformOpener};
use valet_core::registry::{ActionHandler, ActionRegistry, ArgMap, ParamSpec, Provenance, RegistryEntry};
use valet_core::session::SessionContext;
use valet_types::error::HandlerError;
use valet_types::llm::CompletionRequest;

const NO_MODEL_MESSAGE: &str =
    "The language model is not configured. Set OPENAI_API_KEY to enable this action.";

/// Everything the builtin handlers need from the outside world.
pub struct ActionDeps {
    pub completion: Option<Arc<dyn CompletionProviderDyn>>,
    pub calculator: Option<Arc<dyn CalculatorDyn>>,
    pub mailer: Arc<dyn Mailer>,
    pub launcher: Arc<dyn AppLauncher>,
    pub platform: Platform,
    pub search_url: String,
}

/// Build the registry of builtin actions.
pub fn builtin_registry(deps: ActionDeps) -> ActionRegistry {
    let registry = ActionRegistry::new();
    let completion = deps.completion;

    registry.register(RegistryEntry {
        name: "create_letter".to_string(),
        description: "Draft a new letter from a subject and body.".to_string(),
        params: vec![ParamSpec::required("subject"), ParamSpec::required("body")],
        provenance: Provenance::Builtin,
        handler: Arc::new(CreateLetter),
    });
    registry.register(RegistryEntry {
        name: "edit_letter".to_string(),
        description: "Revise the current letter per an instruction.".to_string(),
        params: vec![ParamSpec::required("edit_instruction")],
        provenance: Provenance::Builtin,
        handler: Arc::new(EditLetter {
            completion: completion.clone(),
        }),
    });
    registry.register(RegistryEntry {
        name: "read_letter".to_string(),
        description: "Read back the current letter.".to_string(),
        params: vec![],
        provenance: Provenance::Builtin,
        handler: Arc::new(ReadLetter),
    });
    registry.register(RegistryEntry {
        name: "clear_letter".to_string(),
        description: "Discard the current letter.".to_string(),
        params: vec![],
        provenance: Provenance::Builtin,
        handler: Arc::new(ClearLetter),
    });
    registry.register(RegistryEntry {
        name: "send_letter_via_email_macos".to_string(),
        description: "Create a Mail.app draft of the current letter.".to_string(),
        params: vec![ParamSpec::required("to_email"), ParamSpec::optional("subject")],
        provenance: Provenance::Builtin,
        handler: Arc::new(SendLetter { mailer: deps.mailer }),
    });
    registry.register(RegistryEntry {
        name: "web_search".to_string(),
        description: "Open a web search for a query in the default browser.".to_string(),
        params: vec![ParamSpec::required("query")],
        provenance: Provenance::Builtin,
        handler: Arc::new(WebSearch {
            launcher: deps.launcher.clone(),
            platform: deps.platform,
            search_url: deps.search_url,
        }),
    });
    registry.register(RegistryEntry {
        name: "transcribe_exactly".to_string(),
        description: "Take dictated text down verbatim as the current letter.".to_string(),
        params: vec![ParamSpec::required("text")],
        provenance: Provenance::Builtin,
        handler: Arc::new(TranscribeExactly),
    });
    registry.register(RegistryEntry {
        name: "perform_calculation".to_string(),
        description: "Evaluate a computation or factual query.".to_string(),
        params: vec![ParamSpec::required("query")],
        provenance: Provenance::Builtin,
        handler: Arc::new(Calculate {
            calculator: deps.calculator,
        }),
    });
    registry.register(RegistryEntry {
        name: "handle_general_chat".to_string(),
        description: "Answer general conversation.".to_string(),
        params: vec![ParamSpec::required("text")],
        provenance: Provenance::Builtin,
        handler: Arc::new(Chat {
            completion: completion.clone(),
            system: "You are Valet, a concise and helpful personal assistant.",
        }),
    });
    registry.register(RegistryEntry {
        name: "discuss_programming".to_string(),
        description: "Answer programming questions.".to_string(),
        params: vec![ParamSpec::required("text")],
        provenance: Provenance::Builtin,
        handler: Arc::new(Chat {
            completion,
            system: "You are Valet, a pragmatic programming mentor. Prefer concrete \
                     examples over theory.",
        }),
    });
    registry.register(RegistryEntry {
        name: "open_application".to_string(),
        description: "Open an application by name.".to_string(),
        params: vec![ParamSpec::required("app_name")],
        provenance: Provenance::Builtin,
        handler: Arc::new(OpenApplication {
            opener: PlatformOpener::new(deps.platform, deps.launcher),
        }),
    });
    registry.register(RegistryEntry {
        name: "system_command".to_string(),
        description: "Receive a system command (never executed).".to_string(),
        params: vec![ParamSpec::optional("command")],
        provenance: Provenance::Builtin,
        handler: Arc::new(SystemCommand),
    });

    registry
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

fn arg<'a>(args: &'a ArgMap, name: &str) -> Option<&'a str> {
    args.get(name).and_then(|v| v.as_str())
}

fn required<'a>(args: &'a ArgMap, name: &str) -> Result<&'a str, HandlerError> {
    arg(args, name).ok_or_else(|| HandlerError::new(format!("argument '{name}' must be a string")))
}

// ---------------------------------------------------------------------------
// Letter actions
// ---------------------------------------------------------------------------

struct CreateLetter;

impl ActionHandler for CreateLetter {
    fn call<'a>(
        &'a self,
        args: &'a ArgMap,
        session: &'a SessionContext,
    ) -> Pin<Box<dyn Future<Output = Result<String, HandlerError>> + Send + 'a>> {
        Box::pin(async move {
            let subject = required(args, "subject")?;
            let body = required(args, "body")?;
            let letter = format!("Subject: {subject}\n\n{body}");
            session.set_letter(&letter);
            Ok(format!("Here is your draft letter:\n\n{letter}"))
        })
    }
}

struct EditLetter {
    completion: Option<Arc<dyn CompletionProviderDyn>>,
}

impl ActionHandler for EditLetter {
    fn call<'a>(
        &'a self,
        args: &'a ArgMap,
        session: &'a SessionContext,
    ) -> Pin<Box<dyn Future<Output = Result<String, HandlerError>> + Send + 'a>> {
        Box::pin(async move {
            let instruction = required(args, "edit_instruction")?;
            let letter = session.letter();
            if letter.is_empty() {
                return Err(HandlerError::new(
                    "There is no letter to edit. Create one first.",
                ));
            }
            let Some(completion) = &self.completion else {
                return Err(HandlerError::new(NO_MODEL_MESSAGE));
            };

            let request = CompletionRequest::user(format!(
                "Current letter:\n{letter}\n\nEdit instruction: {instruction}\n\n\
                 Respond with the complete revised letter only."
            ))
            .with_system(
                "You revise letters. Keep the 'Subject:' first line unless told otherwise.",
            );
            let revised = completion
                .complete_boxed(&request)
                .await
                .map_err(|e| HandlerError::new(e.to_string()))?;

            session.set_letter(revised.trim());
            Ok(format!("Here is the revised letter:\n\n{}", revised.trim()))
        })
    }
}

struct ReadLetter;

impl ActionHandler for ReadLetter {
    fn call<'a>(
        &'a self,
        _args: &'a ArgMap,
        session: &'a SessionContext,
    ) -> Pin<Box<dyn Future<Output = Result<String, HandlerError>> + Send + 'a>> {
        Box::pin(async move {
            let letter = session.letter();
            if letter.is_empty() {
                Ok("There is no letter yet. Ask me to create one.".to_string())
            } else {
                Ok(format!("Here is the current letter:\n\n{letter}"))
            }
        })
    }
}

struct ClearLetter;

impl ActionHandler for ClearLetter {
    fn call<'a>(
        &'a self,
        _args: &'a ArgMap,
        session: &'a SessionContext,
    ) -> Pin<Box<dyn Future<Output = Result<String, HandlerError>> + Send + 'a>> {
        Box::pin(async move {
            session.clear_letter();
            Ok("The letter has been discarded.".to_string())
        })
    }
}

struct SendLetter {
    mailer: Arc<dyn Mailer>,
}

impl ActionHandler for SendLetter {
    fn call<'a>(
        &'a self,
        args: &'a ArgMap,
        session: &'a SessionContext,
    ) -> Pin<Box<dyn Future<Output = Result<String, HandlerError>> + Send + 'a>> {
        Box::pin(async move {
            let to = required(args, "to_email")?;
            let letter = session.letter();
            if letter.is_empty() {
                return Err(HandlerError::new(
                    "There is no letter to send. Create one first.",
                ));
            }

            // The letter's own subject line wins unless the step overrides it.
            let (letter_subject, body) = split_subject(&letter);
            let subject = arg(args, "subject")
                .or(letter_subject)
                .unwrap_or("Letter from Valet");

            self.mailer
                .compose(&EmailDraft::new(to, subject, body))
                .await
                .map_err(|e| HandlerError::new(e.to_string()))?;
            Ok(format!(
                "Created an email draft to {to} in Mail. Review it and press send when ready."
            ))
        })
    }
}

/// Split a "Subject: ..." first line off a letter, if present.
fn split_subject(letter: &str) -> (Option<&str>, &str) {
    let Some(rest) = letter.strip_prefix("Subject: ") else {
        return (None, letter);
    };
    match rest.split_once('\n') {
        Some((subject, body)) => (Some(subject.trim_end()), body.trim_start()),
        None => (Some(rest.trim_end()), ""),
    }
}

struct TranscribeExactly;

impl ActionHandler for TranscribeExactly {
    fn call<'a>(
        &'a self,
        args: &'a ArgMap,
        session: &'a SessionContext,
    ) -> Pin<Box<dyn Future<Output = Result<String, HandlerError>> + Send + 'a>> {
        Box::pin(async move {
            let text = required(args, "text")?;
            session.set_letter(text);
            Ok(format!("Transcribed exactly as dictated:\n\n{text}"))
        })
    }
}

// ---------------------------------------------------------------------------
// Search and calculation
// ---------------------------------------------------------------------------

struct WebSearch {
    launcher: Arc<dyn AppLauncher>,
    platform: Platform,
    search_url: String,
}

impl ActionHandler for WebSearch {
    fn call<'a>(
        &'a self,
        args: &'a ArgMap,
        _session: &'a SessionContext,
    ) -> Pin<Box<dyn Future<Output = Result<String, HandlerError>> + Send + 'a>> {
        Box::pin(async move {
            let query = required(args, "query")?;
            // Url parsing percent-encodes the query portion.
            let url = reqwest::Url::parse(&format!("{}{query}", self.search_url))
                .map_err(|e| HandlerError::new(format!("invalid search URL: {e}")))?;

            let command = LaunchCommand::open_url(self.platform, url.as_str());
            self.launcher
                .launch(&command)
                .await
                .map_err(|e| HandlerError::new(format!("could not open the browser: {e}")))?;
            Ok(format!("Opened a web search for '{query}' in your browser."))
        })
    }
}

struct Calculate {
    calculator: Option<Arc<dyn CalculatorDyn>>,
}

impl ActionHandler for Calculate {
    fn call<'a>(
        &'a self,
        args: &'a ArgMap,
        _session: &'a SessionContext,
    ) -> Pin<Box<dyn Future<Output = Result<String, HandlerError>> + Send + 'a>> {
        Box::pin(async move {
            let query = required(args, "query")?;
            let Some(calculator) = &self.calculator else {
                return Err(HandlerError::new(
                    "The calculation service is not configured. Set WOLFRAM_APP_ID to enable it.",
                ));
            };
            let answer = calculator
                .query_boxed(query)
                .await
                .map_err(|e| HandlerError::new(e.to_string()))?;
            Ok(answer)
        })
    }
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

struct Chat {
    completion: Option<Arc<dyn CompletionProviderDyn>>,
    system: &'static str,
}

impl ActionHandler for Chat {
    fn call<'a>(
        &'a self,
        args: &'a ArgMap,
        _session: &'a SessionContext,
    ) -> Pin<Box<dyn Future<Output = Result<String, HandlerError>> + Send + 'a>> {
        Box::pin(async move {
            let text = required(args, "text")?;
            let Some(completion) = &self.completion else {
                return Err(HandlerError::new(NO_MODEL_MESSAGE));
            };
            let request = CompletionRequest::user(text)
                .with_system(self.system)
                .with_temperature(0.7);
            completion
                .complete_boxed(&request)
                .await
                .map_err(|e| HandlerError::new(e.to_string()))
        })
    }
}

// ---------------------------------------------------------------------------
// System actions
// ---------------------------------------------------------------------------

struct OpenApplication {
    opener: PlatformOpener,
}

impl ActionHandler for OpenApplication {
    fn call<'a>(
        &'a self,
        args: &'a ArgMap,
        _session: &'a SessionContext,
    ) -> Pin<Box<dyn Future<Output = Result<String, HandlerError>> + Send + 'a>> {
        Box::pin(async move {
            let app = required(args, "app_name")?;
            let message = self.opener.open(app, None).await;
            if message.contains(FAILURE_MARKER) {
                Err(HandlerError::new(message))
            } else {
                Ok(message)
            }
        })
    }
}

struct SystemCommand;

impl ActionHandler for SystemCommand {
    fn call<'a>(
        &'a self,
        args: &'a ArgMap,
        _session: &'a SessionContext,
    ) -> Pin<Box<dyn Future<Output = Result<String, HandlerError>> + Send + 'a>> {
        Box::pin(async move {
            let command = arg(args, "command").unwrap_or_default();
            Ok(format!(
                "System command '{command}' received (not executed for safety)."
            ))
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use valet_core::llm::CompletionProvider;
    use valet_core::mail::MailError;
    use valet_core::platform::LaunchError;
    use valet_types::error::DispatchError;
    use valet_types::llm::CompletionError;
    use valet_types::workflow::{KnownAction, Step};

    struct Canned(&'static str);

    impl CompletionProvider for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, _request: &CompletionRequest) -> Result<String, CompletionError> {
            Ok(self.0.to_string())
        }
    }

    #[derive(Default)]
    struct FakeMailer {
        drafts: Mutex<Vec<EmailDraft>>,
    }

    impl Mailer for FakeMailer {
        fn compose<'a>(
            &'a self,
            draft: &'a EmailDraft,
        ) -> Pin<Box<dyn Future<Output = Result<(), MailError>> + Send + 'a>> {
            Box::pin(async move {
                self.drafts.lock().unwrap().push(draft.clone());
                Ok(())
            })
        }
    }

    #[derive(Default)]
    struct FakeLauncher {
        launched: Mutex<Vec<LaunchCommand>>,
    }

    impl AppLauncher for FakeLauncher {
        fn launch<'a>(
            &'a self,
            command: &'a LaunchCommand,
        ) -> Pin<Box<dyn Future<Output = Result<(), LaunchError>> + Send + 'a>> {
            Box::pin(async move {
                self.launched.lock().unwrap().push(command.clone());
                Ok(())
            })
        }
    }

    struct Fixture {
        registry: ActionRegistry,
        mailer: Arc<FakeMailer>,
        launcher: Arc<FakeLauncher>,
        session: SessionContext,
    }

    fn fixture(completion: Option<Arc<dyn CompletionProviderDyn>>) -> Fixture {
        let mailer = Arc::new(FakeMailer::default());
        let launcher = Arc::new(FakeLauncher::default());
        let registry = builtin_registry(ActionDeps {
            completion,
            calculator: None,
            mailer: mailer.clone(),
            launcher: launcher.clone(),
            platform: Platform::MacOs,
            search_url: "https://www.google.com/search?q=".to_string(),
        });
        Fixture {
            registry,
            mailer,
            launcher,
            session: SessionContext::new(),
        }
    }

    async fn run(f: &Fixture, step: &Step) -> Result<String, DispatchError> {
        f.registry.invoke(&step.action, step, &f.session).await.result
    }

    #[test]
    fn test_every_known_action_is_registered() {
        let f = fixture(None);
        for action in KnownAction::ALL {
            assert!(f.registry.contains(action.as_str()), "missing {action}");
        }
    }

    #[tokio::test]
    async fn test_letter_lifecycle() {
        let f = fixture(None);

        let mut create = Step::new("create_letter");
        create.subject = Some("Hello".to_string());
        create.body = Some("How are you?".to_string());
        let out = run(&f, &create).await.unwrap();
        assert!(out.contains("Subject: Hello"));
        assert!(out.contains("How are you?"));

        let out = run(&f, &Step::new("read_letter")).await.unwrap();
        assert!(out.contains("Subject: Hello"));

        run(&f, &Step::new("clear_letter")).await.unwrap();
        let out = run(&f, &Step::new("read_letter")).await.unwrap();
        assert!(out.contains("no letter"));
    }

    #[tokio::test]
    async fn test_edit_letter_without_model_errors() {
        let f = fixture(None);
        f.session.set_letter("Subject: Hi\n\nDraft.");

        let mut edit = Step::new("edit_letter");
        edit.edit_instruction = Some("make it formal".to_string());
        let err = run(&f, &edit).await.unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[tokio::test]
    async fn test_edit_letter_replaces_document() {
        let f = fixture(Some(Arc::new(Canned("Subject: Hi\n\nDear colleague,"))));
        f.session.set_letter("Subject: Hi\n\nhey");

        let mut edit = Step::new("edit_letter");
        edit.edit_instruction = Some("make it formal".to_string());
        let out = run(&f, &edit).await.unwrap();
        assert!(out.contains("Dear colleague,"));
        assert_eq!(f.session.letter(), "Subject: Hi\n\nDear colleague,");
    }

    #[tokio::test]
    async fn test_send_letter_uses_letter_subject() {
        let f = fixture(None);
        f.session.set_letter("Subject: Quarterly update\n\nAll good.");

        let mut send = Step::new("send_letter_via_email_macos");
        send.to_email = Some("boss@example.com".to_string());
        let out = run(&f, &send).await.unwrap();
        assert!(out.contains("boss@example.com"));

        let drafts = f.mailer.drafts.lock().unwrap();
        assert_eq!(drafts[0].subject, "Quarterly update");
        assert_eq!(drafts[0].body, "All good.");
    }

    #[tokio::test]
    async fn test_send_letter_without_letter_errors() {
        let f = fixture(None);
        let mut send = Step::new("send_letter_via_email_macos");
        send.to_email = Some("boss@example.com".to_string());
        let err = run(&f, &send).await.unwrap_err();
        assert!(err.to_string().contains("no letter"));
        assert!(f.mailer.drafts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transcribe_exactly_is_verbatim() {
        let f = fixture(None);
        let mut step = Step::new("transcribe_exactly");
        step.text = Some("word for word, as spoken".to_string());
        let out = run(&f, &step).await.unwrap();
        assert!(out.contains("word for word, as spoken"));
        assert_eq!(f.session.letter(), "word for word, as spoken");
    }

    #[tokio::test]
    async fn test_web_search_encodes_query() {
        let f = fixture(None);
        let mut step = Step::new("web_search");
        step.query = Some("rust async traits".to_string());
        let out = run(&f, &step).await.unwrap();
        assert!(out.contains("rust async traits"));

        let launched = f.launcher.launched.lock().unwrap();
        assert_eq!(launched[0].program, "open");
        assert!(launched[0].args[0].contains("q=rust%20async%20traits"));
    }

    #[tokio::test]
    async fn test_calculation_without_provider_errors() {
        let f = fixture(None);
        let mut step = Step::new("perform_calculation");
        step.query = Some("2+2".to_string());
        let err = run(&f, &step).await.unwrap_err();
        assert!(err.to_string().contains("WOLFRAM_APP_ID"));
    }

    #[tokio::test]
    async fn test_chat_consults_model() {
        let f = fixture(Some(Arc::new(Canned("Happy to help."))));
        let mut step = Step::new("handle_general_chat");
        step.text = Some("hello".to_string());
        assert_eq!(run(&f, &step).await.unwrap(), "Happy to help.");
    }

    #[tokio::test]
    async fn test_open_application_handler_launches() {
        let f = fixture(None);
        let mut step = Step::new("open_application");
        step.app_name = Some("terminal".to_string());
        let out = run(&f, &step).await.unwrap();
        assert!(out.contains("Terminal"));
        assert!(!f.launcher.launched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_system_command_handler_refuses() {
        let f = fixture(None);
        let mut step = Step::new("system_command");
        step.command = Some("shutdown now".to_string());
        let out = run(&f, &step).await.unwrap();
        assert!(out.contains("not executed for safety"));
    }
}
