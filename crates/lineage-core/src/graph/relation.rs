//! Direct child → parent relation.
//!
//! Built from every record that carries both a child id and a parent id.
//! Each child keeps at most one parent: when the same child id shows up
//! again, the later row wins. Overwrites with a *different* parent (compared
//! trimmed and case-insensitive) are reported as
//! [`SkipReason::ParentOverridden`] so the loss is visible.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::model::{Diagnostic, Record, SkipReason, same_identity};

/// Immediate parent per entity id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DirectRelation {
    parents: BTreeMap<String, String>,
}

impl DirectRelation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the relation from `records`, returning it with the rows that
    /// contributed nothing (or overrode an earlier parent).
    pub fn from_records(records: &[Record]) -> (Self, Vec<Diagnostic>) {
        let mut relation = Self::new();
        let mut diagnostics = Vec::new();

        for record in records {
            let Some(child) = record.id.as_deref() else {
                debug!(row = record.row, "row has no child id");
                diagnostics.push(Diagnostic::new(
                    record.row,
                    None,
                    SkipReason::MissingChildId,
                ));
                continue;
            };

            let Some(parent) = record.parent_id.as_deref() else {
                diagnostics.push(Diagnostic::new(
                    record.row,
                    Some(child),
                    SkipReason::MissingParentId,
                ));
                continue;
            };

            if let Some(previous) = relation.insert(child, parent) {
                if !same_identity(&previous, parent) {
                    warn!(
                        row = record.row,
                        child,
                        previous = %previous,
                        replacement = parent,
                        "parent overridden by later row"
                    );
                    diagnostics.push(Diagnostic::new(
                        record.row,
                        Some(child),
                        SkipReason::ParentOverridden {
                            previous,
                            replacement: parent.to_string(),
                        },
                    ));
                }
            }
        }

        (relation, diagnostics)
    }

    /// Set `child`'s parent, returning the previous one if any.
    pub fn insert(&mut self, child: &str, parent: &str) -> Option<String> {
        self.parents.insert(child.to_string(), parent.to_string())
    }

    /// Immediate parent of `child`, matched exactly.
    #[must_use]
    pub fn parent_of(&self, child: &str) -> Option<&str> {
        self.parents.get(child).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, child: &str) -> bool {
        self.parents.contains_key(child)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// `(child, parent)` pairs in child order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parents
            .iter()
            .map(|(child, parent)| (child.as_str(), parent.as_str()))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for DirectRelation {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut relation = Self::new();
        for (child, parent) in iter {
            relation.insert(child, parent);
        }
        relation
    }
}
