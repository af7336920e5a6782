//! Skip-with-reason channel for rows that contributed nothing.
//!
//! Malformed rows never fail a resolution run. Instead every row (or cell)
//! that is dropped is recorded here so callers and tests can ask *why* a row
//! had no effect, not only *that* it had none.

use serde::Serialize;
use std::fmt;

/// Why a row was skipped, or only partly used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The leading cell carries the exclusion marker.
    Excluded,
    /// The row has no leading cell at all (absent or blank row).
    BlankLeadingCell,
    /// No entity identifier in the child id column.
    MissingChildId,
    /// The entity has no parent id; it is a root of the hierarchy.
    MissingParentId,
    /// The declared parent is the entity itself (trimmed, case-insensitive).
    SelfReference,
    /// A later row for the same entity replaced an earlier, different parent
    /// in the direct relation.
    ParentOverridden { previous: String, replacement: String },
}

impl SkipReason {
    /// Returns `true` when the row was rejected rather than merely noted.
    ///
    /// Roots (`MissingParentId`) and overridden parents are ordinary data;
    /// they are reported for reference only.
    #[must_use]
    pub const fn drops_row(&self) -> bool {
        matches!(
            self,
            Self::Excluded | Self::BlankLeadingCell | Self::MissingChildId | Self::SelfReference
        )
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Excluded => write!(f, "excluded by marker"),
            Self::BlankLeadingCell => write!(f, "blank leading cell"),
            Self::MissingChildId => write!(f, "missing child id"),
            Self::MissingParentId => write!(f, "no parent id"),
            Self::SelfReference => write!(f, "declares itself as parent"),
            Self::ParentOverridden {
                previous,
                replacement,
            } => write!(f, "parent '{previous}' overridden by '{replacement}'"),
        }
    }
}

/// A single skip record, tied to the physical row it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(flatten)]
    pub reason: SkipReason,
}

impl Diagnostic {
    pub fn new(row: usize, entity: Option<&str>, reason: SkipReason) -> Self {
        Self {
            row,
            entity: entity.map(str::to_string),
            reason,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entity {
            Some(entity) => write!(f, "row {} ({entity}): {}", self.row, self.reason),
            None => write!(f, "row {}: {}", self.row, self.reason),
        }
    }
}
