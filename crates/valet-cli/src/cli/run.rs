//! `valet run` and `valet validate`.

use std::path::Path;

use anyhow::Context;
use valet_core::session::SessionContext;
use valet_core::workflow::validate_str;
use valet_types::error::ValidationFailure;
use valet_types::workflow::{Workflow, WorkflowReport};

use crate::state::AppState;

/// Validate and execute a workflow document.
pub async fn run_workflow(
    state: &AppState,
    path: &Path,
    utterance: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let workflow = load_and_validate(path, json).await?;
    tracing::debug!(steps = workflow.steps.len(), source = %path.display(), "workflow validated");

    let session = SessionContext::new();
    let report = state.engine.execute(&workflow, utterance, &session).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Validate a workflow document without executing it.
pub async fn validate_workflow(path: &Path, json: bool) -> anyhow::Result<()> {
    let workflow = load_and_validate(path, json).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "valid": true, "steps": workflow.steps.len() })
        );
    } else {
        println!(
            "  {} Workflow is valid ({} step{}).",
            console::style("✓").green(),
            workflow.steps.len(),
            if workflow.steps.len() == 1 { "" } else { "s" },
        );
    }
    Ok(())
}

async fn load_and_validate(path: &Path, json: bool) -> anyhow::Result<Workflow> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut tokio::io::stdin(), &mut buf)
            .await
            .context("cannot read workflow from stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("cannot read {}", path.display()))?
    };

    match validate_str(&raw) {
        Ok(workflow) => Ok(workflow),
        Err(failure) => {
            print_violations(&failure, json);
            anyhow::bail!(
                "workflow failed validation with {} violation(s)",
                failure.violations.len()
            );
        }
    }
}

fn print_violations(failure: &ValidationFailure, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({ "valid": false, "violations": failure.violations })
        );
    } else {
        println!("  {} Workflow is invalid:", console::style("✗").red());
        for violation in &failure.violations {
            println!(
                "    {} {}",
                console::style(&violation.path).cyan(),
                violation.reason
            );
        }
    }
}

/// Render per-step results as styled blocks.
pub fn print_report(report: &WorkflowReport) {
    for (index, result) in report.results.iter().enumerate() {
        let mark = if result.needs_confirmation() {
            console::style("?").yellow()
        } else {
            console::style("✓").green()
        };
        println!();
        println!(
            "  {mark} Step {} · {}",
            index + 1,
            console::style(&result.action).cyan()
        );
        for line in result.result.lines() {
            println!("    {line}");
        }
        if !result.dropped_params.is_empty() {
            println!(
                "    {} ignored parameters: {}",
                console::style("note").dim(),
                result.dropped_params.join(", ")
            );
        }
    }
    println!();
}
