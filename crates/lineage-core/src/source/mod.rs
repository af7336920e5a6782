//! Row sources: named sheets of positional rows.
//!
//! The resolver only needs two things from a workbook: whether a sheet
//! exists, and the rows of that sheet. [`RowSource`] captures that boundary;
//! the lookup helpers (`row`, `row_contents`, `row_index`) are provided on
//! top of it so every implementation gets them for free.
//!
//! ## Implementations
//!
//! - [`csv::CsvWorkbook`] — a `.csv` file, or a directory of them, one sheet
//!   per file.
//! - [`memory::MemoryWorkbook`] — in-memory sheets for tests and embedding.

use std::io;
use std::path::PathBuf;

use crate::error::ErrorCode;
use crate::model::Row;

pub mod csv;
pub mod memory;

pub use self::csv::{CsvOptions, CsvWorkbook};
pub use self::memory::MemoryWorkbook;

/// Errors raised while opening a workbook or reading a sheet.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The workbook path does not exist.
    #[error("workbook not found: {}", .0.display())]
    WorkbookNotFound(PathBuf),

    /// The requested sheet is not part of the workbook.
    #[error("sheet '{0}' is not found")]
    SheetNotFound(String),

    /// Reading a sheet file failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A row could not be decoded.
    #[error("failed to parse sheet '{sheet}': {source}")]
    Parse {
        sheet: String,
        #[source]
        source: ::csv::Error,
    },
}

impl SourceError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::WorkbookNotFound(_) | Self::Io { .. } => ErrorCode::WorkbookNotFound,
            Self::SheetNotFound(_) => ErrorCode::SheetNotFound,
            Self::Parse { .. } => ErrorCode::RowReadFailed,
        }
    }
}

/// A workbook of named sheets.
pub trait RowSource {
    /// Names of all sheets, in a stable order.
    fn sheet_names(&self) -> Vec<String>;

    /// Every physical row of `sheet`, header row included, in sheet order.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::SheetNotFound`] if the sheet does not exist, or
    /// a read/parse error from the backing store.
    fn physical_rows(&self, sheet: &str) -> Result<Vec<Row>, SourceError>;

    fn sheet_exists(&self, sheet: &str) -> bool {
        self.sheet_names().iter().any(|name| name == sheet)
    }

    /// Rows of `sheet`, optionally without the header row.
    ///
    /// The header is physical row 1. A sheet whose row 1 is absent has no
    /// header to drop, so every row it does have is kept.
    ///
    /// # Errors
    ///
    /// Same as [`RowSource::physical_rows`].
    fn rows(&self, sheet: &str, include_header: bool) -> Result<Vec<Row>, SourceError> {
        let mut rows = self.physical_rows(sheet)?;
        if !include_header {
            rows.retain(|row| row.number != 1);
        }
        Ok(rows)
    }

    /// The row with physical number `number`, or `None` for an absent row.
    ///
    /// # Errors
    ///
    /// Same as [`RowSource::physical_rows`].
    fn row(&self, sheet: &str, number: usize) -> Result<Option<Row>, SourceError> {
        Ok(self
            .physical_rows(sheet)?
            .into_iter()
            .find(|row| row.number == number))
    }

    /// Cells `1..=width` of row `number` as strings.
    ///
    /// An absent row yields an empty vector rather than an error.
    ///
    /// # Errors
    ///
    /// Same as [`RowSource::physical_rows`].
    fn row_contents(
        &self,
        sheet: &str,
        number: usize,
        width: usize,
    ) -> Result<Vec<Option<String>>, SourceError> {
        Ok(self
            .row(sheet, number)?
            .map(|row| row.contents(width))
            .unwrap_or_default())
    }

    /// Physical number of the first row whose leading cell equals `key`.
    ///
    /// Rows whose leading cell carries `marker` never match.
    ///
    /// # Errors
    ///
    /// Same as [`RowSource::physical_rows`].
    fn row_index(&self, sheet: &str, key: &str, marker: char) -> Result<Option<usize>, SourceError> {
        Ok(self
            .physical_rows(sheet)?
            .iter()
            .find(|row| row.leading() == Some(key) && !row.is_excluded(marker))
            .map(|row| row.number))
    }
}
