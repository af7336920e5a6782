//! Whole-relation cycle report.
//!
//! [`ancestor_chain`](super::ancestry::ancestor_chain) fails on the first loop
//! it walks into. When a sheet is broken in several places it is more useful
//! to list every loop at once, which is what [`find_cycles`] does.
//!
//! # Edge Direction
//!
//! Edges point `child → parent`. Nodes are keyed on the normalized identity
//! (trimmed, lowercased), so `A → b → a` is one loop. Self-references are
//! guarded by the resolver and are not reported here.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use super::relation::DirectRelation;
use crate::model::identity_key;

/// Build a petgraph view of the relation, one node per identity.
///
/// Node weights are the first spelling seen for each identity. Self-loops
/// are dropped.
#[must_use]
pub fn relation_graph(relation: &DirectRelation) -> DiGraph<String, ()> {
    let mut graph: DiGraph<String, ()> = DiGraph::new();
    let mut nodes: HashMap<String, NodeIndex> = HashMap::new();

    let mut node = |graph: &mut DiGraph<String, ()>, id: &str| {
        *nodes
            .entry(identity_key(id))
            .or_insert_with(|| graph.add_node(id.to_string()))
    };

    for (child, parent) in relation.iter() {
        if parent.trim().is_empty() {
            continue;
        }
        let from = node(&mut graph, child);
        let to = node(&mut graph, parent);
        if from != to {
            graph.update_edge(from, to, ());
        }
    }

    graph
}

/// Every loop in the relation.
///
/// Each entry is the sorted member list of one strongly connected component
/// with more than one entity. The outer list is sorted too, so the report is
/// stable across runs.
#[must_use]
pub fn find_cycles(relation: &DirectRelation) -> Vec<Vec<String>> {
    let graph = relation_graph(relation);

    let mut cycles: Vec<Vec<String>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| component.len() > 1)
        .map(|component| {
            let mut ids: Vec<String> = component
                .into_iter()
                .map(|idx| node_id(&graph, idx))
                .collect();
            ids.sort_unstable();
            ids
        })
        .collect();

    cycles.sort_unstable();
    cycles
}

fn node_id(graph: &DiGraph<String, ()>, idx: NodeIndex) -> String {
    graph
        .node_weight(idx)
        .cloned()
        .unwrap_or_else(|| format!("#{}", idx.index()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relation(pairs: &[(&str, &str)]) -> DirectRelation {
        pairs.iter().copied().collect()
    }

    #[test]
    fn acyclic_relation_has_no_cycles() {
        let rel = relation(&[("3", "2"), ("2", "1"), ("4", "1")]);
        assert!(find_cycles(&rel).is_empty());
    }

    #[test]
    fn self_reference_is_not_reported() {
        let rel = relation(&[("1", "1"), ("2", " 1")]);
        assert!(find_cycles(&rel).is_empty());
    }

    #[test]
    fn lists_every_loop_sorted() {
        let rel = relation(&[
            ("z", "y"),
            ("y", "z"),
            ("a", "b"),
            ("b", "c"),
            ("c", "a"),
            ("leaf", "a"),
        ]);
        assert_eq!(
            find_cycles(&rel),
            vec![
                vec!["a".to_string(), "b".to_string(), "c".to_string()],
                vec!["y".to_string(), "z".to_string()],
            ]
        );
    }

    #[test]
    fn case_variants_share_a_node() {
        let rel = relation(&[("A", "b"), ("B", "a")]);
        let graph = relation_graph(&rel);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(find_cycles(&rel), vec![vec!["A".to_string(), "b".to_string()]]);
    }
}
