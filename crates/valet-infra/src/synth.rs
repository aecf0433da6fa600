//! Manifest-based tool synthesis.
//!
//! Unknown actions are healed by asking the completion provider for a JSON
//! tool manifest, not for code. A manifest declares the action's parameter
//! schema and a response template; [`TemplateTool`] renders the template by
//! substituting `{param}` placeholders with the invocation's arguments.
//! Manifests are persisted to `{data_dir}/tools/{name}.json` so a
//! synthesized capability survives restarts, and every registration is
//! logged with synthesized provenance.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use valet_core::llm::CompletionProviderDyn;
use valet_core::registry::{ActionHandler, ActionRegistry, ArgMap, ParamSpec, Provenance, RegistryEntry};
use valet_core::session::SessionContext;
use valet_core::synth::ToolSynthesizer;
use valet_types::error::{HandlerError, SynthesisError};
use valet_types::llm::CompletionRequest;

// ---------------------------------------------------------------------------
// Manifest and template tool
// ---------------------------------------------------------------------------

/// A declarative tool definition: parameter schema plus response template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolManifest {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub params: Vec<ParamSpec>,
    /// Response text with `{param}` placeholders.
    pub template: String,
}

impl ToolManifest {
    /// Convert into a registry entry with the given provenance.
    pub fn into_entry(self, provenance: Provenance) -> RegistryEntry {
        RegistryEntry {
            name: self.name.clone(),
            description: self.description.clone(),
            params: self.params.clone(),
            provenance,
            handler: Arc::new(TemplateTool { manifest: self }),
        }
    }
}

/// Handler that renders a manifest's template against the invocation
/// arguments. Deliberately side-effect free.
pub struct TemplateTool {
    manifest: ToolManifest,
}

impl TemplateTool {
    fn render(&self, args: &ArgMap) -> String {
        let mut out = self.manifest.template.clone();
        for (name, value) in args {
            let text = match value.as_str() {
                Some(s) => s.to_string(),
                None => value.to_string(),
            };
            out = out.replace(&format!("{{{name}}}"), &text);
        }
        out
    }
}

impl ActionHandler for TemplateTool {
    fn call<'a>(
        &'a self,
        args: &'a ArgMap,
        _session: &'a SessionContext,
    ) -> Pin<Box<dyn Future<Output = Result<String, HandlerError>> + Send + 'a>> {
        Box::pin(async move { Ok(self.render(args)) })
    }
}

// ---------------------------------------------------------------------------
// Synthesizer
// ---------------------------------------------------------------------------

/// Generates tool manifests with the completion provider, persists them,
/// and registers the resulting template tools.
pub struct LlmToolSynthesizer {
    provider: Arc<dyn CompletionProviderDyn>,
    registry: Arc<ActionRegistry>,
    tools_dir: PathBuf,
}

impl LlmToolSynthesizer {
    pub fn new(
        provider: Arc<dyn CompletionProviderDyn>,
        registry: Arc<ActionRegistry>,
        tools_dir: impl Into<PathBuf>,
    ) -> Self {
        LlmToolSynthesizer {
            provider,
            registry,
            tools_dir: tools_dir.into(),
        }
    }

    fn generation_prompt(action: &str, params: &[String], description: &str) -> String {
        format!(
            "Define a tool as a single JSON object with fields \"name\", \
             \"description\", \"params\" (array of {{\"name\", \"required\"}} \
             objects), and \"template\" (the response text, which may \
             reference parameters as {{param}} placeholders).\n\
             Tool name: {action}\n\
             Parameters: {params:?}\n\
             Purpose: {description}\n\
             Respond with the JSON object only."
        )
    }

    async fn persist(&self, manifest: &ToolManifest) -> Result<PathBuf, std::io::Error> {
        tokio::fs::create_dir_all(&self.tools_dir).await?;
        let path = self.tools_dir.join(format!("{}.json", manifest.name));
        let body = serde_json::to_string_pretty(manifest).map_err(std::io::Error::other)?;
        tokio::fs::write(&path, body).await?;
        Ok(path)
    }
}

impl ToolSynthesizer for LlmToolSynthesizer {
    fn synthesize<'a>(
        &'a self,
        action: &'a str,
        params: &'a [String],
        description: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, SynthesisError>> + Send + 'a>> {
        Box::pin(async move {
            tracing::info!(action, ?params, "synthesizing tool manifest");

            let request = CompletionRequest::user(Self::generation_prompt(
                action,
                params,
                description,
            ))
            .with_system("You define safe, declarative assistant tools.");
            let raw = self
                .provider
                .complete_boxed(&request)
                .await
                .map_err(|e| SynthesisError::Generation(e.to_string()))?;

            let mut manifest: ToolManifest = serde_json::from_str(strip_code_fences(&raw))
                .map_err(|e| SynthesisError::MalformedManifest(e.to_string()))?;

            // The model's name is advisory; the registered name must be the
            // action the workflow asked for.
            manifest.name = action.to_string();
            // Requested parameters the model omitted are still accepted.
            for param in params {
                if !manifest.params.iter().any(|p| &p.name == param) {
                    manifest.params.push(ParamSpec::optional(param));
                }
            }

            let path = self.persist(&manifest).await?;
            tracing::info!(
                action,
                manifest = %path.display(),
                "persisted synthesized tool manifest"
            );

            self.registry.register(manifest.into_entry(Provenance::Synthesized {
                requested_by: "workflow-engine".to_string(),
            }));

            Ok(format!("Synthesized and registered tool '{action}'."))
        })
    }
}

/// Register every persisted manifest under `tools_dir`. Returns how many
/// tools were loaded; unreadable or malformed manifests are skipped with a
/// warning.
pub async fn load_persisted_tools(tools_dir: &std::path::Path, registry: &ActionRegistry) -> usize {
    let mut dir = match tokio::fs::read_dir(tools_dir).await {
        Ok(dir) => dir,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return 0,
        Err(err) => {
            tracing::warn!(dir = %tools_dir.display(), error = %err, "cannot read tools directory");
            return 0;
        }
    };

    let mut loaded = 0;
    loop {
        let entry = match dir.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(err) => {
                tracing::warn!(error = %err, "error listing tools directory");
                break;
            }
        };
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let manifest = match tokio::fs::read_to_string(&path).await {
            Ok(body) => match serde_json::from_str::<ToolManifest>(&body) {
                Ok(manifest) => manifest,
                Err(err) => {
                    tracing::warn!(file = %path.display(), error = %err, "skipping malformed manifest");
                    continue;
                }
            },
            Err(err) => {
                tracing::warn!(file = %path.display(), error = %err, "skipping unreadable manifest");
                continue;
            }
        };

        registry.register(manifest.into_entry(Provenance::Synthesized {
            requested_by: "persisted".to_string(),
        }));
        loaded += 1;
    }

    tracing::info!(count = loaded, "loaded persisted tools");
    loaded
}

/// Strip a surrounding markdown code fence, if the model added one.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
