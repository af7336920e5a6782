//! `lineage sheets` — list the sheets of a workbook.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use lineage_core::source::{CsvWorkbook, RowSource};
use serde::Serialize;

use crate::output::{OutputMode, fail, render};

/// Arguments for `lineage sheets`.
#[derive(Args, Debug, Clone)]
pub struct SheetsArgs {
    /// A .csv file, or a directory with one .csv file per sheet.
    #[arg(value_name = "WORKBOOK")]
    pub workbook: PathBuf,
}

#[derive(Debug, Serialize)]
struct SheetsOutput {
    workbook: String,
    sheets: Vec<String>,
}

/// Execute `lineage sheets`.
pub fn run_sheets(args: &SheetsArgs, output: OutputMode) -> anyhow::Result<()> {
    let workbook = CsvWorkbook::open(&args.workbook)
        .map_err(|err| fail(output, err.error_code(), &err))?;

    let payload = SheetsOutput {
        workbook: workbook.root().display().to_string(),
        sheets: workbook.sheet_names(),
    };

    render(output, &payload, render_sheets_human)
}

fn render_sheets_human(payload: &SheetsOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if payload.sheets.is_empty() {
        return writeln!(w, "No sheets in {}.", payload.workbook);
    }
    for sheet in &payload.sheets {
        writeln!(w, "{sheet}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_one_sheet_per_line() {
        let payload = SheetsOutput {
            workbook: "book".to_string(),
            sheets: vec!["Accounts".to_string(), "Regions".to_string()],
        };
        let mut out = Vec::new();
        render_sheets_human(&payload, &mut out).expect("render");
        assert_eq!(String::from_utf8(out).expect("utf8"), "Accounts\nRegions\n");
    }

    #[test]
    fn empty_workbook_says_so() {
        let payload = SheetsOutput {
            workbook: "book".to_string(),
            sheets: Vec::new(),
        };
        let mut out = Vec::new();
        render_sheets_human(&payload, &mut out).expect("render");
        assert!(String::from_utf8(out).expect("utf8").contains("No sheets in book."));
    }
}
