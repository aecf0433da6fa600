//! `valet ask`: natural language in, executed workflow out.

use std::collections::BTreeMap;

use anyhow::Context;
use valet_core::memory::MemoryStore;
use valet_core::session::SessionContext;
use valet_core::workflow::validate_value;
use valet_types::memory::MemoryRole;

use crate::cli::run::print_report;
use crate::state::AppState;

pub async fn ask(state: &AppState, utterance: &str, json: bool) -> anyhow::Result<()> {
    let Some(planner) = &state.planner else {
        anyhow::bail!("`valet ask` needs a language model; set OPENAI_API_KEY");
    };

    state
        .memory
        .append(MemoryRole::User, utterance, BTreeMap::new())
        .await?;

    // Give the planner recent conversation for context.
    let recent = state.memory.summarize(state.config.memory_limit).await?;
    let prompt = if recent.is_empty() {
        utterance.to_string()
    } else {
        format!("Recent conversation:\n{recent}\n\nRequest: {utterance}")
    };

    let candidate = planner
        .plan(&prompt)
        .await
        .context("the planner could not produce a workflow")?;

    let workflow = match validate_value(&candidate) {
        Ok(workflow) => workflow,
        Err(failure) => {
            tracing::warn!(
                violations = failure.violations.len(),
                "planner produced an invalid workflow"
            );
            let reply = format!(
                "I couldn't turn that into a valid workflow:\n{}",
                failure
                    .violations
                    .iter()
                    .map(|v| format!("  - {v}"))
                    .collect::<Vec<_>>()
                    .join("\n")
            );
            state
                .memory
                .append(MemoryRole::Assistant, &reply, BTreeMap::new())
                .await?;
            println!("{reply}");
            return Ok(());
        }
    };

    let session = SessionContext::new();
    let report = state
        .engine
        .execute(&workflow, Some(utterance), &session)
        .await;

    let reply = report
        .results
        .iter()
        .map(|r| r.result.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let mut meta = BTreeMap::new();
    meta.insert("workflow".to_string(), candidate);
    state
        .memory
        .append(MemoryRole::Assistant, &reply, meta)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}
