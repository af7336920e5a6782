//! CSV-backed workbook.
//!
//! A workbook is either a single `.csv` file (one sheet, named after the file
//! stem) or a directory whose `*.csv` files are its sheets. Spreadsheet
//! exports usually produce exactly this shape: one file per tab.
//!
//! Rows keep the physical line they started on, so blank lines show up as
//! gaps in [`Row::number`] rather than shifting later rows. Cells that are not
//! valid UTF-8 (a cp1252 export, say) are decoded lossily so one bad row never
//! costs the rest of the sheet.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ::csv::{ReaderBuilder, Trim};
use tracing::{debug, warn};

use super::{RowSource, SourceError};
use crate::model::Row;

/// Reader settings shared by every sheet of a [`CsvWorkbook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    /// Trim whitespace around every cell.
    pub trim: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            trim: true,
        }
    }
}

/// A workbook whose sheets are CSV files on disk.
#[derive(Debug, Clone)]
pub struct CsvWorkbook {
    root: PathBuf,
    sheets: BTreeMap<String, PathBuf>,
    options: CsvOptions,
}

impl CsvWorkbook {
    /// Open `path` with default [`CsvOptions`].
    ///
    /// # Errors
    ///
    /// See [`CsvWorkbook::open_with`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        Self::open_with(path, CsvOptions::default())
    }

    /// Open a `.csv` file or a directory of `.csv` files.
    ///
    /// Only the sheet index is built here; rows are read on demand.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::WorkbookNotFound`] if `path` does not exist, or
    /// [`SourceError::Io`] if the directory cannot be listed.
    pub fn open_with(path: impl AsRef<Path>, options: CsvOptions) -> Result<Self, SourceError> {
        let root = path.as_ref().to_path_buf();
        if !root.exists() {
            return Err(SourceError::WorkbookNotFound(root));
        }

        let mut sheets = BTreeMap::new();
        if root.is_dir() {
            let entries = fs::read_dir(&root).map_err(|source| SourceError::Io {
                path: root.clone(),
                source,
            })?;
            for entry in entries {
                let entry = entry.map_err(|source| SourceError::Io {
                    path: root.clone(),
                    source,
                })?;
                let path = entry.path();
                if is_csv(&path) {
                    if let Some(name) = sheet_name(&path) {
                        sheets.insert(name, path);
                    }
                }
            }
        } else if let Some(name) = sheet_name(&root) {
            sheets.insert(name, root.clone());
        }

        debug!(root = %root.display(), sheets = sheets.len(), "opened csv workbook");
        Ok(Self {
            root,
            sheets,
            options,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl RowSource for CsvWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.keys().cloned().collect()
    }

    fn sheet_exists(&self, sheet: &str) -> bool {
        self.sheets.contains_key(sheet)
    }

    fn physical_rows(&self, sheet: &str) -> Result<Vec<Row>, SourceError> {
        let path = self
            .sheets
            .get(sheet)
            .ok_or_else(|| SourceError::SheetNotFound(sheet.to_string()))?;

        let bytes = fs::read(path).map_err(|source| SourceError::Io {
            path: path.clone(),
            source,
        })?;
        let lines = LineIndex::new(&bytes);

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.options.delimiter)
            .trim(if self.options.trim { Trim::All } else { Trim::None })
            .from_reader(bytes.as_slice());

        let mut rows = Vec::new();
        for result in reader.byte_records() {
            let record = result.map_err(|source| SourceError::Parse {
                sheet: sheet.to_string(),
                source,
            })?;
            let number = record
                .position()
                .map_or(rows.len() + 1, |pos| lines.record_line(pos.byte()));

            let mut lossy = false;
            let cells: Vec<String> = record
                .iter()
                .map(|cell| match String::from_utf8_lossy(cell) {
                    Cow::Borrowed(text) => text.to_string(),
                    Cow::Owned(text) => {
                        lossy = true;
                        text
                    }
                })
                .collect();
            if lossy {
                warn!(sheet, row = number, "row is not valid UTF-8; undecodable bytes replaced");
            }

            rows.push(Row::new(number, cells.into_iter().map(Some)));
        }

        Ok(rows)
    }
}

/// Byte offsets where each physical line starts.
struct LineIndex<'a> {
    bytes: &'a [u8],
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        let starts = std::iter::once(0)
            .chain(after_newlines(bytes))
            .collect();
        Self { bytes, starts }
    }

    /// 1-based line of the record whose read began at `offset`.
    ///
    /// The reader reports the offset where it started looking, which sits
    /// before any blank lines it skipped on the way to the record.
    fn record_line(&self, offset: u64) -> usize {
        let mut start = usize::try_from(offset).unwrap_or(self.bytes.len());
        while self
            .bytes
            .get(start)
            .is_some_and(|byte| matches!(byte, b'\r' | b'\n'))
        {
            start += 1;
        }
        self.starts.partition_point(|&line| line <= start)
    }
}

fn after_newlines(bytes: &[u8]) -> impl Iterator<Item = usize> + '_ {
    bytes
        .iter()
        .enumerate()
        .filter(|(_, byte)| **byte == b'\n')
        .map(|(idx, _)| idx + 1)
}

fn is_csv(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn sheet_name(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
}
