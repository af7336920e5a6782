use lineage_core::graph::{DirectRelation, ancestor_chain, find_cycles};
use lineage_core::{ResolveError, ResolveOptions, resolve};
use proptest::prelude::*;

use generators::*;

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(512))]

    #[test]
    fn closure_matches_reference_walk(parents in arb_forest(40)) {
        let wb = workbook(&forest_rows(&parents));
        let resolution = resolve(&wb, &ResolveOptions::new(SHEET)).expect("acyclic forest");

        prop_assert_eq!(resolution.ancestors.len(), parents.len());
        for node in 0..parents.len() {
            let got = resolution.ancestors.get(&entity_id(node)).cloned().unwrap_or_default();
            prop_assert_eq!(got, expected_ancestors(&parents, node));
        }
    }

    #[test]
    fn no_entity_is_its_own_ancestor(parents in arb_forest(40)) {
        let wb = workbook(&forest_rows(&parents));
        let resolution = resolve(&wb, &ResolveOptions::new(SHEET)).expect("acyclic forest");

        for (id, ancestors) in resolution.ancestors.iter() {
            prop_assert!(!ancestors.contains(id));
        }
    }

    #[test]
    fn resolution_is_idempotent(parents in arb_forest(40)) {
        let wb = workbook(&forest_rows(&parents));
        let options = ResolveOptions::new(SHEET);
        let first = resolve(&wb, &options).expect("acyclic forest");
        let second = resolve(&wb, &options).expect("acyclic forest");
        prop_assert_eq!(first.ancestors, second.ancestors);
        prop_assert_eq!(first.relation, second.relation);
    }

    #[test]
    fn row_order_does_not_change_closure(
        rows in arb_forest(30).prop_flat_map(|parents| Just(forest_rows(&parents)).prop_shuffle())
    ) {
        let shuffled = resolve(&workbook(&rows), &ResolveOptions::new(SHEET)).expect("acyclic");

        let mut sorted_rows = rows.clone();
        sorted_rows.sort();
        let sorted = resolve(&workbook(&sorted_rows), &ResolveOptions::new(SHEET)).expect("acyclic");

        prop_assert_eq!(shuffled.ancestors, sorted.ancestors);
    }

    #[test]
    fn excluded_rows_never_contribute(parents in arb_forest(20), extra in 1usize..8) {
        let mut rows = forest_rows(&parents);
        for k in 0..extra {
            rows.push(vec![
                format!("#Retired {k}"),
                format!("X{k}"),
                "US".to_string(),
                "Account 0".to_string(),
                entity_id(0),
            ]);
        }
        let resolution = resolve(&workbook(&rows), &ResolveOptions::new(SHEET)).expect("acyclic");

        for k in 0..extra {
            let id = format!("X{k}");
            prop_assert!(!resolution.relation.contains(&id));
            prop_assert!(!resolution.ancestors.contains(&id));
        }
        prop_assert_eq!(resolution.ancestors.len(), parents.len());
    }

    #[test]
    fn rings_fail_instead_of_looping(len in arb_ring()) {
        let relation: DirectRelation = (0..len)
            .map(|i| (entity_id(i), entity_id((i + 1) % len)))
            .collect::<Vec<_>>()
            .iter()
            .map(|(c, p)| (c.as_str(), p.as_str()))
            .collect();

        let err = ancestor_chain(&entity_id(0), &relation).expect_err("ring");
        prop_assert_eq!(err.cycle_len(), len);
        prop_assert_eq!(err.path.first(), err.path.last());
        prop_assert_eq!(find_cycles(&relation).len(), 1);

        let rows: Vec<Vec<String>> = (0..len)
            .map(|i| vec![
                format!("Account {i}"),
                entity_id(i),
                String::new(),
                String::new(),
                entity_id((i + 1) % len),
            ])
            .collect();
        let result = resolve(&workbook(&rows), &ResolveOptions::new(SHEET));
        prop_assert!(matches!(result, Err(ResolveError::Cycle(_))));
    }
}
