//! `valet tools`: list registered actions.

use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use valet_core::registry::Provenance;

use crate::state::AppState;

pub fn list_tools(state: &AppState, json: bool) -> anyhow::Result<()> {
    let entries = state.registry.snapshot();

    if json {
        let listing: Vec<_> = entries
            .iter()
            .map(|e| {
                serde_json::json!({
                    "name": e.name,
                    "description": e.description,
                    "params": e.params,
                    "synthesized": matches!(e.provenance, Provenance::Synthesized { .. }),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Action", "Parameters", "Origin", "Description"]);

    for entry in &entries {
        // Required parameters are marked with a trailing `*`.
        let params = entry
            .params
            .iter()
            .map(|p| {
                if p.required {
                    format!("{}*", p.name)
                } else {
                    p.name.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        let origin = match &entry.provenance {
            Provenance::Builtin => "builtin".to_string(),
            Provenance::Synthesized { requested_by } => format!("synthesized ({requested_by})"),
        };
        table.add_row(vec![
            Cell::new(&entry.name),
            Cell::new(params),
            Cell::new(origin),
            Cell::new(&entry.description),
        ]);
    }

    println!("{table}");
    Ok(())
}
