//! `lineage cycles` — list parent loops (strongly connected components).

use std::collections::HashMap;
use std::io::Write;

use clap::Args;
use lineage_core::config::ProjectConfig;
use lineage_core::graph::{DirectRelation, find_cycles};
use lineage_core::load_records;
use lineage_core::model::{Record, identity_key};
use serde::Serialize;

use super::source::SourceArgs;
use crate::output::{OutputMode, fail, render};

/// Arguments for `lineage cycles`.
#[derive(Args, Debug, Clone)]
pub struct CyclesArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Serialize)]
struct CyclesOutput {
    sheet: String,
    cycles: Vec<Vec<String>>,
}

/// Execute `lineage cycles`.
///
/// Finding loops is the point of this command, so unlike `resolve` a loop
/// is reported rather than treated as a failure.
pub fn run_cycles(
    args: &CyclesArgs,
    config: &ProjectConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let opened = args.source.open(config, output)?;
    let ingestion = load_records(&opened.workbook, &opened.options)
        .map_err(|err| fail(output, err.error_code(), &err))?;

    let (relation, _) = DirectRelation::from_records(&ingestion.records);
    let payload = CyclesOutput {
        sheet: opened.options.sheet.clone(),
        cycles: find_cycles(&relation),
    };
    let names = entity_names(&ingestion.records);

    render(output, &payload, |report, w| {
        render_cycles_human(report, &names, w)
    })
}

/// Display name per entity identity, taken from the last row naming it.
fn entity_names(records: &[Record]) -> HashMap<String, String> {
    records
        .iter()
        .filter_map(|record| {
            let id = record.id.as_deref()?;
            let name = record.name.as_deref()?;
            Some((identity_key(id), name.to_string()))
        })
        .collect()
}

fn render_cycles_human(
    payload: &CyclesOutput,
    names: &HashMap<String, String>,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    if payload.cycles.is_empty() {
        writeln!(w, "No parent cycles found.")?;
        return Ok(());
    }

    writeln!(w, "Parent cycles ({})", payload.cycles.len())?;

    for (idx, cycle) in payload.cycles.iter().enumerate() {
        writeln!(w, "\nCycle {}:", idx + 1)?;
        for id in cycle {
            if let Some(name) = names.get(&identity_key(id)) {
                writeln!(w, "  - {id} — {name}")?;
            } else {
                writeln!(w, "  - {id}")?;
            }
        }
    }

    Ok(())
}
