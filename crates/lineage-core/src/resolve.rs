//! One resolution run: load, build the direct relation, build the ancestor
//! map, hand back everything plus the diagnostics.
//!
//! ```text
//! RowSource::rows(sheet)
//!        ↓  model::ingest()            excluded / blank rows dropped
//! Vec<Record>
//!        ↓  DirectRelation::from_records()
//! DirectRelation                       child → parent, last write wins
//!        ↓  AncestorMap::build()
//! AncestorMap                          child → all ancestors, accumulated
//! ```
//!
//! A missing sheet or invalid layout fails before any map is built. Bad rows
//! never fail the run; they only show up in [`Resolution::diagnostics`].

use serde::Serialize;
use tracing::{info, instrument};

use crate::error::ErrorCode;
use crate::graph::{AncestorMap, CycleError, DirectRelation};
use crate::model::{ColumnLayout, DEFAULT_MARKER, Diagnostic, Ingestion, LayoutError, ingest};
use crate::source::{RowSource, SourceError};

/// Fatal errors of a resolution run.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Cycle(#[from] CycleError),
}

impl ResolveError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Source(err) => err.error_code(),
            Self::Layout(_) => ErrorCode::InvalidColumnLayout,
            Self::Cycle(_) => ErrorCode::CycleDetected,
        }
    }
}

/// What to read and how to interpret it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    pub sheet: String,
    pub include_header: bool,
    pub marker: char,
    pub layout: ColumnLayout,
}

impl ResolveOptions {
    /// Options for `sheet` with a header row, `#` marker and default layout.
    pub fn new(sheet: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            include_header: false,
            marker: DEFAULT_MARKER,
            layout: ColumnLayout::default(),
        }
    }
}

/// Result of a resolution run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub sheet: String,
    pub rows_read: usize,
    pub records: usize,
    pub relation: DirectRelation,
    pub ancestors: AncestorMap,
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    /// Resolve already-ingested records.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] if any parent chain loops.
    pub fn from_ingestion(sheet: &str, ingestion: Ingestion) -> Result<Self, CycleError> {
        let Ingestion {
            rows_read,
            records,
            mut diagnostics,
        } = ingestion;

        let (relation, relation_diags) = DirectRelation::from_records(&records);
        let (ancestors, ancestor_diags) = AncestorMap::build(&records, &relation)?;

        diagnostics.extend(relation_diags);
        diagnostics.extend(ancestor_diags);
        diagnostics.sort_by_key(|diag| diag.row);

        Ok(Self {
            sheet: sheet.to_string(),
            rows_read,
            records: records.len(),
            relation,
            ancestors,
            diagnostics,
        })
    }

    /// Report lines, `entityId : a1,a2,...`, in entity order.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.ancestors.lines()
    }
}

/// Check the sheet and layout, then read and ingest its rows.
///
/// # Errors
///
/// Returns [`ResolveError::Layout`] for an invalid layout and
/// [`ResolveError::Source`] if the sheet is missing or unreadable.
pub fn load_records<S: RowSource + ?Sized>(
    source: &S,
    options: &ResolveOptions,
) -> Result<Ingestion, ResolveError> {
    options.layout.validate()?;
    if !source.sheet_exists(&options.sheet) {
        return Err(SourceError::SheetNotFound(options.sheet.clone()).into());
    }

    let rows = source.rows(&options.sheet, options.include_header)?;
    Ok(ingest(&rows, &options.layout, options.marker))
}

/// Run a full resolution over one sheet of `source`.
///
/// # Errors
///
/// Configuration problems (missing sheet, invalid layout) and parent cycles
/// are fatal; see [`ResolveError`].
#[instrument(skip(source, options), fields(sheet = %options.sheet))]
pub fn resolve<S: RowSource + ?Sized>(
    source: &S,
    options: &ResolveOptions,
) -> Result<Resolution, ResolveError> {
    let ingestion = load_records(source, options)?;
    let resolution = Resolution::from_ingestion(&options.sheet, ingestion)?;

    info!(
        rows = resolution.rows_read,
        records = resolution.records,
        entities = resolution.ancestors.len(),
        relations = resolution.relation.len(),
        skipped = resolution.diagnostics.len(),
        "resolved hierarchy"
    );

    Ok(resolution)
}
