//! Application state wiring the engine and its collaborators together.
//!
//! Collaborators that need credentials (OpenAI, Wolfram|Alpha) degrade
//! gracefully: when a key is missing the corresponding actions fail with a
//! configuration message at invocation time, and tool synthesis is
//! disabled, but the assistant still starts.

use std::path::PathBuf;
use std::sync::Arc;

use valet_core::llm::{CalculatorDyn, CompletionProviderDyn};
use valet_core::planner::Planner;
use valet_core::platform::{Platform, PlatformOpener};
use valet_core::registry::ActionRegistry;
use valet_core::synth::{NullSynthesizer, ToolSynthesizer};
use valet_core::workflow::WorkflowEngine;
use valet_infra::actions::{ActionDeps, builtin_registry};
use valet_infra::calc::WolframCalculator;
use valet_infra::config::{default_data_dir, load_config};
use valet_infra::launcher::ProcessLauncher;
use valet_infra::llm::OpenAiProvider;
use valet_infra::mail::AppleScriptMailer;
use valet_infra::memory::JsonlMemoryStore;
use valet_infra::synth::{LlmToolSynthesizer, load_persisted_tools};
use valet_types::config::ValetConfig;

/// Shared application state holding the engine and collaborators.
pub struct AppState {
    pub config: ValetConfig,
    pub data_dir: PathBuf,
    pub registry: Arc<ActionRegistry>,
    pub engine: Arc<WorkflowEngine>,
    pub memory: JsonlMemoryStore,
    pub planner: Option<Planner>,
}

impl AppState {
    /// Initialize application state: load config, wire collaborators,
    /// restore persisted synthesized tools, build the engine.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = default_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await;
        let platform = Platform::from_override(config.platform.as_deref());

        let completion: Option<Arc<dyn CompletionProviderDyn>> =
            OpenAiProvider::from_env(&config.model)
                .map(|p| Arc::new(p) as Arc<dyn CompletionProviderDyn>);
        let calculator: Option<Arc<dyn CalculatorDyn>> =
            WolframCalculator::from_env().map(|c| Arc::new(c) as Arc<dyn CalculatorDyn>);
        let launcher = Arc::new(ProcessLauncher);

        let registry = Arc::new(builtin_registry(ActionDeps {
            completion: completion.clone(),
            calculator,
            mailer: Arc::new(AppleScriptMailer),
            launcher: launcher.clone(),
            platform,
            search_url: config.search_url.clone(),
        }));

        // Synthesized tools from previous runs come back at startup.
        let tools_dir = data_dir.join("tools");
        load_persisted_tools(&tools_dir, &registry).await;

        let synthesizer: Arc<dyn ToolSynthesizer> = match &completion {
            Some(provider) => Arc::new(LlmToolSynthesizer::new(
                provider.clone(),
                registry.clone(),
                tools_dir,
            )),
            None => Arc::new(NullSynthesizer),
        };

        let engine = Arc::new(WorkflowEngine::new(
            registry.clone(),
            PlatformOpener::new(platform, launcher),
            synthesizer,
        ));

        let memory = JsonlMemoryStore::new(data_dir.join("memory.jsonl"));
        let planner = completion.map(Planner::new);

        tracing::info!(
            data_dir = %data_dir.display(),
            platform = %platform,
            planner = planner.is_some(),
            "application state initialized"
        );

        Ok(AppState {
            config,
            data_dir,
            registry,
            engine,
            memory,
            planner,
        })
    }
}
