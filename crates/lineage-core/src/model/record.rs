//! Typed records validated once at ingestion.
//!
//! Rows arrive as positional cells. [`ingest`] maps them through a
//! [`ColumnLayout`] into [`Record`]s with named optional fields, dropping
//! excluded and blank rows on the way. Downstream code never inspects raw
//! cells again.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::diagnostic::{Diagnostic, SkipReason};
use super::row::Row;

/// Default exclusion marker for the leading cell.
pub const DEFAULT_MARKER: char = '#';

/// Errors raised by an invalid [`ColumnLayout`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// Two logical columns were mapped to the same position.
    #[error("columns '{first}' and '{second}' both read position {index}")]
    DuplicateIndex {
        first: &'static str,
        second: &'static str,
        index: usize,
    },
}

/// Positions of the logical columns within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    pub name: usize,
    pub id: usize,
    pub region: usize,
    pub parent_name: usize,
    pub parent_id: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            name: 0,
            id: 1,
            region: 2,
            parent_name: 3,
            parent_id: 4,
        }
    }
}

impl ColumnLayout {
    fn named(&self) -> [(&'static str, usize); 5] {
        [
            ("name", self.name),
            ("id", self.id),
            ("region", self.region),
            ("parent_name", self.parent_name),
            ("parent_id", self.parent_id),
        ]
    }

    /// Reject layouts where two logical columns share a position.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::DuplicateIndex`] for the first clash found.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let mut seen: BTreeMap<usize, &'static str> = BTreeMap::new();
        for (column, index) in self.named() {
            if let Some(first) = seen.insert(index, column) {
                return Err(LayoutError::DuplicateIndex {
                    first,
                    second: column,
                    index,
                });
            }
        }
        Ok(())
    }

    /// Number of cells a row needs to fill every logical column.
    #[must_use]
    pub fn width(&self) -> usize {
        self.named()
            .iter()
            .map(|(_, index)| index + 1)
            .max()
            .unwrap_or(0)
    }
}

/// One non-excluded row, with its cells bound to named fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Physical row number this record was read from.
    pub row: usize,
    pub name: Option<String>,
    pub id: Option<String>,
    pub region: Option<String>,
    pub parent_name: Option<String>,
    pub parent_id: Option<String>,
}

impl Record {
    /// Bind a row's cells through `layout`.
    pub fn from_row(row: &Row, layout: &ColumnLayout) -> Self {
        let take = |index: usize| row.cell(index).map(str::to_string);
        Self {
            row: row.number,
            name: take(layout.name),
            id: take(layout.id),
            region: take(layout.region),
            parent_name: take(layout.parent_name),
            parent_id: take(layout.parent_id),
        }
    }
}

/// Output of [`ingest`]: the surviving records plus why the rest were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ingestion {
    pub rows_read: usize,
    pub records: Vec<Record>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Filter and type a row sequence.
///
/// A row is dropped when its leading cell is blank (absent rows in sparse
/// sheets included) or contains `marker`. Every drop is recorded.
pub fn ingest(rows: &[Row], layout: &ColumnLayout, marker: char) -> Ingestion {
    let mut ingestion = Ingestion {
        rows_read: rows.len(),
        ..Ingestion::default()
    };

    for row in rows {
        let reason = match row.leading() {
            None => Some(SkipReason::BlankLeadingCell),
            Some(_) if row.is_excluded(marker) => Some(SkipReason::Excluded),
            Some(_) => None,
        };

        if let Some(reason) = reason {
            debug!(row = row.number, %reason, "dropping row");
            ingestion
                .diagnostics
                .push(Diagnostic::new(row.number, row.cell(layout.id), reason));
            continue;
        }

        ingestion.records.push(Record::from_row(row, layout));
    }

    ingestion
}

/// Comparison key for entity identity: trimmed and lowercased.
#[must_use]
pub fn identity_key(id: &str) -> String {
    id.trim().to_lowercase()
}

/// Returns `true` when two identifiers name the same entity.
#[must_use]
pub fn same_identity(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
