//! `lineage resolve` — print every entity with its full set of ancestors.

use std::io::{self, Write};

use clap::Args;
use lineage_core::config::ProjectConfig;
use lineage_core::{Resolution, resolve};

use super::source::SourceArgs;
use crate::output::{OutputMode, fail, pretty_kv, pretty_section, render_mode};

/// Arguments for `lineage resolve`.
#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Also list rows that contributed nothing, and why.
    #[arg(long)]
    pub diagnostics: bool,
}

/// Execute `lineage resolve`.
pub fn run_resolve(
    args: &ResolveArgs,
    config: &ProjectConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let opened = args.source.open(config, output)?;
    let resolution = resolve(&opened.workbook, &opened.options)
        .map_err(|err| fail(output, err.error_code(), &err))?;

    if args.diagnostics && !output.is_json() {
        render_diagnostics(&resolution, &mut io::stderr().lock())?;
    }

    render_mode(output, &resolution, render_text, render_pretty)
}

fn render_text(resolution: &Resolution, w: &mut dyn Write) -> io::Result<()> {
    for line in resolution.lines() {
        writeln!(w, "{line}")?;
    }
    Ok(())
}

fn render_pretty(resolution: &Resolution, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(
        w,
        &format!(
            "Ancestors — {} ({} entities)",
            resolution.sheet,
            resolution.ancestors.len()
        ),
    )?;

    let width = resolution
        .ancestors
        .iter()
        .map(|(id, _)| id.chars().count())
        .max()
        .unwrap_or(0);

    for (id, ancestors) in resolution.ancestors.iter() {
        if ancestors.is_empty() {
            writeln!(w, "{id:<width$}  (root)")?;
        } else {
            let joined: Vec<&str> = ancestors.iter().map(String::as_str).collect();
            writeln!(w, "{id:<width$}  {}", joined.join(", "))?;
        }
    }

    writeln!(w)?;
    pretty_kv(w, "Rows", resolution.rows_read.to_string())?;
    pretty_kv(w, "Records", resolution.records.to_string())?;
    pretty_kv(w, "Relations", resolution.relation.len().to_string())?;
    let skipped = resolution
        .diagnostics
        .iter()
        .filter(|diag| diag.reason.drops_row())
        .count();
    pretty_kv(w, "Skipped", skipped.to_string())?;
    pretty_kv(
        w,
        "Notes",
        (resolution.diagnostics.len() - skipped).to_string(),
    )
}

fn render_diagnostics(resolution: &Resolution, w: &mut dyn Write) -> io::Result<()> {
    if resolution.diagnostics.is_empty() {
        return writeln!(w, "No rows skipped.");
    }
    for diag in &resolution.diagnostics {
        writeln!(w, "skip: {diag}")?;
    }
    Ok(())
}
