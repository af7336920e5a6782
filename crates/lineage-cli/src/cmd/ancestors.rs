//! `lineage ancestors` — walk one entity up to its root.

use std::collections::BTreeSet;
use std::io::{self, Write};

use clap::Args;
use lineage_core::config::ProjectConfig;
use lineage_core::error::ErrorCode;
use lineage_core::graph::{DirectRelation, accumulated_ancestors, ancestor_chain};
use lineage_core::load_records;
use lineage_core::model::same_identity;
use serde::Serialize;

use super::source::SourceArgs;
use crate::output::{OutputMode, fail, pretty_kv, pretty_section, render_mode};

/// Arguments for `lineage ancestors`.
#[derive(Args, Debug, Clone)]
pub struct AncestorsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Entity id to walk from (matched trimmed, case-insensitive).
    #[arg(value_name = "ID")]
    pub id: String,
}

#[derive(Debug, Serialize)]
struct AncestorsOutput {
    id: String,
    /// Nearest parent first, root last, following the current parent only.
    chain: Vec<String>,
    /// Every ancestor, as `lineage resolve` reports it (includes parents
    /// from earlier rows for the same id).
    ancestors: BTreeSet<String>,
}

impl AncestorsOutput {
    /// Ancestors reached only through earlier rows for the same id.
    fn inherited(&self) -> impl Iterator<Item = &String> {
        self.ancestors
            .iter()
            .filter(|ancestor| !self.chain.contains(*ancestor))
    }
}

/// Execute `lineage ancestors`.
pub fn run_ancestors(
    args: &AncestorsArgs,
    config: &ProjectConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let opened = args.source.open(config, output)?;
    let ingestion = load_records(&opened.workbook, &opened.options)
        .map_err(|err| fail(output, err.error_code(), &err))?;

    let Some(id) = ingestion
        .records
        .iter()
        .filter_map(|record| record.id.as_deref())
        .find(|candidate| same_identity(candidate, &args.id))
        .map(str::to_string)
    else {
        return Err(fail(
            output,
            ErrorCode::EntityNotFound,
            format!(
                "entity '{}' not found in sheet '{}'",
                args.id, opened.options.sheet
            ),
        ));
    };

    let (relation, _) = DirectRelation::from_records(&ingestion.records);
    let chain = ancestor_chain(&id, &relation)
        .map_err(|err| fail(output, ErrorCode::CycleDetected, &err))?;
    let ancestors = accumulated_ancestors(&id, &ingestion.records, &relation)
        .map_err(|err| fail(output, ErrorCode::CycleDetected, &err))?;

    render_mode(
        output,
        &AncestorsOutput {
            id,
            chain,
            ancestors,
        },
        render_text,
        render_pretty,
    )
}

fn render_text(payload: &AncestorsOutput, w: &mut dyn Write) -> io::Result<()> {
    for ancestor in payload.chain.iter().chain(payload.inherited()) {
        writeln!(w, "{ancestor}")?;
    }
    Ok(())
}

fn render_pretty(payload: &AncestorsOutput, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Lineage of {}", payload.id))?;
    if payload.ancestors.is_empty() {
        writeln!(w, "{} is a root.", payload.id)?;
        return Ok(());
    }

    writeln!(w, "{}", payload.id)?;
    for (depth, ancestor) in payload.chain.iter().enumerate() {
        writeln!(w, "{:indent$}└─ {ancestor}", "", indent = depth * 2)?;
    }
    writeln!(w)?;
    pretty_kv(w, "Depth", payload.chain.len().to_string())?;

    let inherited: Vec<&str> = payload.inherited().map(String::as_str).collect();
    if !inherited.is_empty() {
        pretty_kv(w, "Earlier rows", inherited.join(", "))?;
    }
    Ok(())
}
