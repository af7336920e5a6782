//! Raw rows as handed over by a [`RowSource`](crate::source::RowSource).

use serde::Serialize;

/// One physical row of a sheet.
///
/// `number` is the 1-based physical row number in the underlying sheet, so
/// sparse sheets keep their gaps visible. Blank cells are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Row {
    pub number: usize,
    pub cells: Vec<Option<String>>,
}

impl Row {
    /// Build a row, normalizing whitespace-only cells to `None`.
    pub fn new<I, S>(number: usize, cells: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let cells = cells
            .into_iter()
            .map(|cell| {
                cell.map(Into::into)
                    .filter(|value: &String| !value.trim().is_empty())
            })
            .collect();
        Self { number, cells }
    }

    /// Build a row from plain strings; empty strings become blank cells.
    pub fn from_strs(number: usize, cells: &[&str]) -> Self {
        Self::new(number, cells.iter().map(|cell| Some(*cell)))
    }

    /// An absent row in a sparse sheet.
    #[must_use]
    pub const fn empty(number: usize) -> Self {
        Self {
            number,
            cells: Vec::new(),
        }
    }

    /// Value at `index`, or `None` when the cell is absent or blank.
    #[must_use]
    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells.get(index).and_then(Option::as_deref)
    }

    /// The leading (position 0) cell.
    #[must_use]
    pub fn leading(&self) -> Option<&str> {
        self.cell(0)
    }

    /// Returns `true` if the leading cell carries the exclusion `marker`.
    #[must_use]
    pub fn is_excluded(&self, marker: char) -> bool {
        self.leading().is_some_and(|cell| cell.contains(marker))
    }

    /// Cells `1..=width` as owned strings, skipping the leading cell.
    ///
    /// Positions past the end of the row are reported as `None` so the
    /// result always has `width` entries.
    #[must_use]
    pub fn contents(&self, width: usize) -> Vec<Option<String>> {
        (1..=width)
            .map(|index| self.cell(index).map(str::to_string))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_cells_become_blank() {
        let row = Row::from_strs(3, &["Acme", "  ", "", "US"]);
        assert_eq!(row.cell(0), Some("Acme"));
        assert_eq!(row.cell(1), None);
        assert_eq!(row.cell(2), None);
        assert_eq!(row.cell(3), Some("US"));
        assert_eq!(row.cell(9), None);
    }

    #[test]
    fn marker_anywhere_in_leading_cell_excludes() {
        assert!(Row::from_strs(1, &["#Acme"]).is_excluded('#'));
        assert!(Row::from_strs(1, &["Acme #old"]).is_excluded('#'));
        assert!(!Row::from_strs(1, &["Acme", "#1"]).is_excluded('#'));
        assert!(!Row::empty(1).is_excluded('#'));
    }

    #[test]
    fn contents_skip_leading_cell_and_pad() {
        let row = Row::from_strs(2, &["Acme", "1", "US"]);
        assert_eq!(
            row.contents(4),
            vec![Some("1".to_string()), Some("US".to_string()), None, None]
        );
        assert!(Row::empty(5).contents(2).iter().all(Option::is_none));
    }
}
