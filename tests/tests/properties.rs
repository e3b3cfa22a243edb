use std::collections::BTreeSet;

use equitas_metrics::{
    conditional_parity, performance_parity, statistical_parity, StatisticalParity,
};
use equitas_table::{GroupKey, Table, Value};
use proptest::prelude::*;
use tests::{classifier_table, grouped_table};

fn group_name(n: u8) -> String {
    format!("g{n}")
}

/// Rows of (group, target); target 2 stands in for a non-matching value.
fn rows_strategy() -> impl Strategy<Value = Vec<(u8, i64)>> {
    prop::collection::vec((0u8..4, 0i64..3), 0..60)
}

fn build(rows: &[(u8, i64)]) -> Table {
    Table::from_rows(
        ["group", "target"],
        rows.iter()
            .map(|(g, t)| vec![Value::from(group_name(*g)), Value::Int(*t)])
            .collect(),
    )
    .unwrap()
}

proptest! {
    #[test]
    fn proportions_lie_in_unit_interval(rows in rows_strategy()) {
        let report = statistical_parity(&build(&rows), "group", "target", &Value::Int(1)).unwrap();
        for p in report.proportions.values() {
            prop_assert!((0.0..=1.0).contains(p));
        }
        if let Some(d) = report.verdict.disparity {
            prop_assert!((0.0..=1.0).contains(&d));
        }
    }

    #[test]
    fn disparity_is_unmeasured_only_without_groups(rows in rows_strategy()) {
        let report = statistical_parity(&build(&rows), "group", "target", &Value::Int(1)).unwrap();
        prop_assert_eq!(report.verdict.disparity.is_none(), report.proportions.is_empty());
        prop_assert_eq!(report.proportions.is_empty(), rows.is_empty());
    }

    #[test]
    fn row_order_does_not_matter(rows in rows_strategy(), shift in 0usize..60) {
        let mut permuted = rows.clone();
        permuted.reverse();
        if !permuted.is_empty() {
            let k = shift % permuted.len();
            permuted.rotate_left(k);
        }
        let a = statistical_parity(&build(&rows), "group", "target", &Value::Int(1)).unwrap();
        let b = statistical_parity(&build(&permuted), "group", "target", &Value::Int(1)).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn identical_proportions_are_fair(
        (n, hits) in (1usize..12).prop_flat_map(|n| (Just(n), 0..=n)),
        groups in 1usize..5,
    ) {
        let names: Vec<String> = (0..groups).map(|g| group_name(g as u8)).collect();
        let spec: Vec<(&str, usize, usize)> =
            names.iter().map(|name| (name.as_str(), n, hits)).collect();
        let report = statistical_parity(&grouped_table(&spec), "group", "target", &Value::Int(1)).unwrap();
        prop_assert_eq!(report.verdict.disparity, Some(0.0));
        prop_assert!(report.verdict.fair);
    }

    #[test]
    fn zero_rate_groups_with_empty_levels_are_fair(n in 1usize..12) {
        let table = grouped_table(&[("A", n, 0), ("B", n, 0)])
            .with_levels("group", vec!["A".into(), "B".into(), "empty".into()])
            .unwrap();
        let report = statistical_parity(&table, "group", "target", &Value::Int(1)).unwrap();
        prop_assert_eq!(report.proportions.len(), 3);
        prop_assert!(report.verdict.fair);
    }

    #[test]
    fn single_group_has_zero_disparity(n in 1usize..30, hits in 0usize..30) {
        let table = grouped_table(&[("only", n, hits.min(n))]);
        let report = statistical_parity(&table, "group", "target", &Value::Int(1)).unwrap();
        prop_assert_eq!(report.verdict.disparity, Some(0.0));
        prop_assert!(report.verdict.fair);
    }

    #[test]
    fn verdict_echoes_threshold(threshold in 0.0f64..=1.0, rows in rows_strategy()) {
        let parity = StatisticalParity::with_threshold(threshold).unwrap();
        let report = parity.evaluate(&build(&rows), "group", "target", &Value::Int(1)).unwrap();
        prop_assert_eq!(report.verdict.threshold, threshold);
        if let Some(d) = report.verdict.disparity {
            prop_assert_eq!(report.verdict.fair, d <= threshold);
        }
    }

    #[test]
    fn conditional_cells_always_have_rows(
        rows in prop::collection::vec((0u8..3, 0u8..3, prop::option::of(0i64..2)), 0..50)
    ) {
        let table = Table::from_rows(
            ["group", "control", "target"],
            rows.iter()
                .map(|(g, c, t)| {
                    vec![
                        Value::from(group_name(*g)),
                        Value::from(format!("c{c}")),
                        t.map_or(Value::Null, Value::Int),
                    ]
                })
                .collect(),
        )
        .unwrap();
        let observed: BTreeSet<(GroupKey, GroupKey)> = rows
            .iter()
            .filter(|(_, _, t)| t.is_some())
            .map(|(g, c, _)| (GroupKey::from(group_name(*g).as_str()), GroupKey::from(format!("c{c}").as_str())))
            .collect();

        let matrix = conditional_parity(&table, "group", "target", "control").unwrap();
        prop_assert_eq!(matrix.len(), observed.len());
        for (s, c, cell) in matrix.cells() {
            prop_assert!(cell.rows > 0);
            prop_assert!((0.0..=1.0).contains(&cell.mean));
            prop_assert!(observed.contains(&(s.clone(), c.clone())));
        }
    }

    #[test]
    fn rates_are_bounded_or_undefined(
        rows in prop::collection::vec((0u8..3, 0i64..2, 0i64..2), 0..50)
    ) {
        let names: Vec<String> = rows.iter().map(|(g, _, _)| group_name(*g)).collect();
        let triples: Vec<(&str, i64, i64)> = rows
            .iter()
            .zip(&names)
            .map(|((_, y, p), name)| (name.as_str(), *y, *p))
            .collect();
        let metrics = performance_parity(&classifier_table(&triples), "group", "label", "pred").unwrap();
        for (_, rates) in metrics.iter() {
            prop_assert_eq!(rates.tpr.is_none(), rates.positives == 0);
            prop_assert_eq!(rates.fpr.is_none(), rates.negatives == 0);
            for rate in [rates.tpr, rates.fpr].into_iter().flatten() {
                prop_assert!((0.0..=1.0).contains(&rate));
            }
        }
    }
}
