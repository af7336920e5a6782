//! Workbook arguments shared by every command that reads a sheet.

use std::path::PathBuf;

use clap::Args;
use lineage_core::config::ProjectConfig;
use lineage_core::error::ErrorCode;
use lineage_core::source::{CsvOptions, CsvWorkbook, RowSource};
use lineage_core::ResolveOptions;
use tracing::debug;

use crate::output::{OutputMode, fail};

#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// A .csv file, or a directory with one .csv file per sheet.
    #[arg(value_name = "WORKBOOK")]
    pub workbook: PathBuf,

    /// Sheet to read (defaults to config, then to the only sheet).
    #[arg(long, short)]
    pub sheet: Option<String>,

    /// Treat the first row as data rather than a header.
    #[arg(long)]
    pub include_header: bool,

    /// Exclusion marker in the leading cell.
    #[arg(long, value_name = "CHAR")]
    pub marker: Option<char>,

    /// Field delimiter.
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,
}

/// An opened workbook with the options to resolve one of its sheets.
#[derive(Debug)]
pub struct OpenedSource {
    pub workbook: CsvWorkbook,
    pub options: ResolveOptions,
}

impl SourceArgs {
    /// Open the workbook and settle the sheet and row options.
    ///
    /// Flags win over `lineage.toml`; the sheet falls back to the only sheet
    /// of the workbook.
    ///
    /// # Errors
    ///
    /// Renders and returns the error when the workbook cannot be opened or no
    /// sheet can be selected.
    pub fn open(&self, config: &ProjectConfig, output: OutputMode) -> anyhow::Result<OpenedSource> {
        let delimiter = self.delimiter.unwrap_or(config.source.delimiter);
        let delimiter = u8::try_from(delimiter).map_err(|_| {
            fail(
                output,
                ErrorCode::ConfigParseError,
                format!("delimiter '{delimiter}' is not a single-byte character"),
            )
        })?;

        let csv_options = CsvOptions {
            delimiter,
            trim: config.source.trim,
        };
        let workbook = CsvWorkbook::open_with(&self.workbook, csv_options)
            .map_err(|err| fail(output, err.error_code(), &err))?;

        let sheet = self.select_sheet(&workbook, config, output)?;

        let options = ResolveOptions {
            sheet,
            include_header: self.include_header || config.source.header,
            marker: self.marker.unwrap_or(config.source.marker),
            layout: config.columns,
        };

        debug!(
            workbook = %self.workbook.display(),
            sheet = %options.sheet,
            include_header = options.include_header,
            "opened source"
        );
        Ok(OpenedSource { workbook, options })
    }

    fn select_sheet(
        &self,
        workbook: &CsvWorkbook,
        config: &ProjectConfig,
        output: OutputMode,
    ) -> anyhow::Result<String> {
        if let Some(sheet) = self.sheet.as_ref().or(config.source.sheet.as_ref()) {
            return Ok(sheet.clone());
        }

        let names = workbook.sheet_names();
        match names.as_slice() {
            [only] => Ok(only.clone()),
            [] => Err(fail(
                output,
                ErrorCode::SheetNotFound,
                format!("workbook {} has no .csv sheets", self.workbook.display()),
            )),
            _ => Err(fail(
                output,
                ErrorCode::SheetNotFound,
                format!(
                    "workbook has {} sheets ({}); pick one with --sheet",
                    names.len(),
                    names.join(", ")
                ),
            )),
        }
    }
}
