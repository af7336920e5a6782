//! `lineage find` — locate a row by its leading cell and show its contents.

use std::io::Write;

use clap::Args;
use lineage_core::config::ProjectConfig;
use lineage_core::error::ErrorCode;
use lineage_core::source::RowSource;
use serde::Serialize;

use super::source::SourceArgs;
use crate::output::{OutputMode, fail, render};

/// Arguments for `lineage find`.
#[derive(Args, Debug, Clone)]
pub struct FindArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Exact value of the leading cell to look for.
    #[arg(value_name = "KEY")]
    pub key: String,

    /// Number of cells to show after the leading cell (defaults to the
    /// configured column layout).
    #[arg(long, value_name = "N")]
    pub width: Option<usize>,
}

#[derive(Debug, Serialize)]
struct FindOutput {
    sheet: String,
    key: String,
    row: usize,
    cells: Vec<Option<String>>,
}

/// Execute `lineage find`.
pub fn run_find(args: &FindArgs, config: &ProjectConfig, output: OutputMode) -> anyhow::Result<()> {
    let opened = args.source.open(config, output)?;
    let sheet = opened.options.sheet.as_str();
    if !opened.workbook.sheet_exists(sheet) {
        return Err(fail(
            output,
            ErrorCode::SheetNotFound,
            format!("sheet '{sheet}' is not found"),
        ));
    }

    let row = opened
        .workbook
        .row_index(sheet, &args.key, opened.options.marker)
        .map_err(|err| fail(output, err.error_code(), &err))?;
    let Some(row) = row else {
        return Err(fail(
            output,
            ErrorCode::EntityNotFound,
            format!("no row in sheet '{sheet}' starts with '{}'", args.key),
        ));
    };

    let width = args
        .width
        .unwrap_or_else(|| opened.options.layout.width().saturating_sub(1));
    let cells = opened
        .workbook
        .row_contents(sheet, row, width)
        .map_err(|err| fail(output, err.error_code(), &err))?;

    let payload = FindOutput {
        sheet: sheet.to_string(),
        key: args.key.clone(),
        row,
        cells,
    };
    render(output, &payload, render_find_human)
}

fn render_find_human(payload: &FindOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let cells: Vec<&str> = payload
        .cells
        .iter()
        .map(|cell| cell.as_deref().unwrap_or(""))
        .collect();
    writeln!(w, "row {}: {} | {}", payload.row, payload.key, cells.join(" | "))
}
