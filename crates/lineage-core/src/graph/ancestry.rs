//! Transitive ancestor expansion and the ancestor map.
//!
//! # Walk
//!
//! [`ancestor_chain`] follows the direct relation upward from an entity,
//! one parent at a time, until it reaches an entity with no parent. The walk
//! stops quietly on the degenerate self-reference (`E → E`, compared trimmed
//! and case-insensitive). Any other revisit means the input holds a longer
//! cycle (`A → B → A`); the walk then fails with a [`CycleError`] carrying the
//! loop, instead of truncating the result.
//!
//! # Map
//!
//! [`AncestorMap::build`] runs a second pass over the records. Each record
//! with a child id contributes its declared parent plus that parent's chain.
//! Several rows for the same id accumulate: the final set is the union of
//! every row's contribution.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use tracing::debug;

use super::relation::DirectRelation;
use crate::model::{Diagnostic, Record, SkipReason, identity_key, same_identity};

/// A parent chain that loops back on itself.
///
/// `path` starts and ends with the same entity, e.g. `["A", "B", "A"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError {
    pub path: Vec<String>,
}

impl CycleError {
    /// Number of distinct entities in the loop.
    #[must_use]
    pub fn cycle_len(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parent cycle detected ({} entities): {}",
            self.cycle_len(),
            self.path.join(" → ")
        )
    }
}

impl std::error::Error for CycleError {}

/// Ancestors of `id`, nearest parent first, root last.
///
/// Returns an empty chain for a blank `id` or an entity without a parent.
///
/// # Errors
///
/// Returns [`CycleError`] if the walk revisits an entity before reaching a
/// root.
pub fn ancestor_chain(id: &str, relation: &DirectRelation) -> Result<Vec<String>, CycleError> {
    let mut chain: Vec<String> = Vec::new();
    if id.trim().is_empty() {
        return Ok(chain);
    }

    let mut visited: HashSet<String> = HashSet::from([identity_key(id)]);
    let mut current = id.to_string();

    while let Some(parent) = relation.parent_of(&current) {
        if parent.trim().is_empty() || same_identity(parent, &current) {
            break;
        }

        let key = identity_key(parent);
        if !visited.insert(key.clone()) {
            return Err(CycleError {
                path: loop_path(id, &chain, parent, &key),
            });
        }

        chain.push(parent.to_string());
        current = parent.to_string();
    }

    Ok(chain)
}

/// All ancestors of `id` as a set.
///
/// # Errors
///
/// Same as [`ancestor_chain`].
pub fn ancestors_of(id: &str, relation: &DirectRelation) -> Result<BTreeSet<String>, CycleError> {
    Ok(ancestor_chain(id, relation)?.into_iter().collect())
}

/// Slice the walked path down to the loop that closes at `repeated`.
fn loop_path(start: &str, chain: &[String], repeated: &str, key: &str) -> Vec<String> {
    let walked: Vec<&str> = std::iter::once(start)
        .chain(chain.iter().map(String::as_str))
        .collect();
    let from = walked
        .iter()
        .position(|node| identity_key(node) == key)
        .unwrap_or(0);

    let mut path: Vec<String> = walked[from..].iter().map(|node| (*node).to_string()).collect();
    path.push(repeated.to_string());
    path
}

/// What one row adds for `child`: its declared `parent` and that parent's
/// chain.
fn row_contribution(
    child: &str,
    parent: &str,
    relation: &DirectRelation,
) -> Result<Vec<String>, CycleError> {
    let chain = ancestor_chain(parent, relation)?;
    if let Some(pos) = chain.iter().position(|a| same_identity(a, child)) {
        let mut path = vec![child.to_string(), parent.to_string()];
        path.extend(chain[..=pos].iter().cloned());
        return Err(CycleError { path });
    }

    let mut contribution = Vec::with_capacity(chain.len() + 1);
    contribution.push(parent.to_string());
    contribution.extend(chain);
    Ok(contribution)
}

/// The accumulated ancestors of a single entity, as [`AncestorMap::build`]
/// would record them: the union over every row whose child id is `id`.
///
/// Unlike [`ancestors_of`], a row whose parent was later overridden in the
/// direct relation still contributes.
///
/// # Errors
///
/// Same as [`AncestorMap::build`], limited to the rows for `id`.
pub fn accumulated_ancestors(
    id: &str,
    records: &[Record],
    relation: &DirectRelation,
) -> Result<BTreeSet<String>, CycleError> {
    let mut ancestors = BTreeSet::new();
    for record in records {
        if record.id.as_deref() != Some(id) {
            continue;
        }
        let Some(parent) = record.parent_id.as_deref() else {
            continue;
        };
        if same_identity(parent, id) {
            continue;
        }
        ancestors.extend(row_contribution(id, parent, relation)?);
    }
    Ok(ancestors)
}

/// Entity id → every ancestor at any depth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AncestorMap {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl AncestorMap {
    /// Build the map from the (already filtered) records.
    ///
    /// Every record with a child id gets an entry, empty when it has no
    /// parent. Self-referencing rows add nothing and are reported.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] when a parent chain loops, including loops that
    /// only close through a duplicate row for the same entity.
    pub fn build(
        records: &[Record],
        relation: &DirectRelation,
    ) -> Result<(Self, Vec<Diagnostic>), CycleError> {
        let mut map = Self::default();
        let mut diagnostics = Vec::new();

        for record in records {
            let Some(child) = record.id.as_deref() else {
                continue;
            };
            let Some(parent) = record.parent_id.as_deref() else {
                map.entries.entry(child.to_string()).or_default();
                continue;
            };

            if same_identity(parent, child) {
                debug!(row = record.row, child, "self-referencing row");
                diagnostics.push(Diagnostic::new(
                    record.row,
                    Some(child),
                    SkipReason::SelfReference,
                ));
                map.entries.entry(child.to_string()).or_default();
                continue;
            }

            let contribution = row_contribution(child, parent, relation)?;
            map.entries
                .entry(child.to_string())
                .or_default()
                .extend(contribution);
        }

        Ok((map, diagnostics))
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.entries.iter().map(|(id, set)| (id.as_str(), set))
    }

    /// Report lines, `entityId : a1,a2,...`, in key order.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.iter().map(|(id, ancestors)| render_line(id, ancestors))
    }
}

/// Format one report line.
#[must_use]
pub fn render_line(id: &str, ancestors: &BTreeSet<String>) -> String {
    let joined: Vec<&str> = ancestors.iter().map(String::as_str).collect();
    format!("{id} : {}", joined.join(","))
}
