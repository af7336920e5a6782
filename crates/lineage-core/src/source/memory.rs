//! In-memory workbook.

use std::collections::BTreeMap;

use super::{RowSource, SourceError};
use crate::model::Row;

/// Sheets held in memory, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryWorkbook {
    sheets: BTreeMap<String, Vec<Row>>,
}

impl MemoryWorkbook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dense sheet; row `i` of `rows` becomes physical row `i + 1`.
    #[must_use]
    pub fn with_sheet(mut self, name: &str, rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .enumerate()
            .map(|(idx, cells)| Row::from_strs(idx + 1, cells))
            .collect();
        self.sheets.insert(name.to_string(), rows);
        self
    }

    /// Add a sheet from prebuilt rows, which may be sparse.
    #[must_use]
    pub fn with_rows(mut self, name: &str, rows: Vec<Row>) -> Self {
        self.insert_rows(name, rows);
        self
    }

    pub fn insert_rows(&mut self, name: &str, mut rows: Vec<Row>) {
        rows.sort_by_key(|row| row.number);
        self.sheets.insert(name.to_string(), rows);
    }
}

impl RowSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.keys().cloned().collect()
    }

    fn sheet_exists(&self, sheet: &str) -> bool {
        self.sheets.contains_key(sheet)
    }

    fn physical_rows(&self, sheet: &str) -> Result<Vec<Row>, SourceError> {
        self.sheets
            .get(sheet)
            .cloned()
            .ok_or_else(|| SourceError::SheetNotFound(sheet.to_string()))
    }
}
