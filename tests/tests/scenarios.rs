use equitas_metrics::{
    analyze, normalize_target, performance_parity, statistical_parity, AnalysisRequest,
    Analyzer, ColumnParity, FairnessError,
};
use equitas_table::{GroupKey, Table, Value};
use pretty_assertions::assert_eq;
use tests::{approx_eq, classifier_table, grouped_table};

fn init_test_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

fn key(s: &str) -> GroupKey {
    GroupKey::from(s)
}

#[test]
fn equal_rates_are_fair() {
    let table = grouped_table(&[("A", 10, 5), ("B", 10, 5)]);
    let report = statistical_parity(&table, "group", "target", &Value::Int(1)).unwrap();
    assert_eq!(report.proportions[&key("A")], 0.5);
    assert_eq!(report.proportions[&key("B")], 0.5);
    assert_eq!(report.verdict.disparity, Some(0.0));
    assert!(report.verdict.fair);
}

#[test]
fn skewed_rates_are_unfair() {
    let table = grouped_table(&[("A", 10, 9), ("B", 10, 1)]);
    let report = statistical_parity(&table, "group", "target", &Value::Int(1)).unwrap();
    assert_eq!(report.proportions[&key("A")], 0.9);
    assert_eq!(report.proportions[&key("B")], 0.1);
    assert!(approx_eq(report.verdict.disparity.unwrap(), 0.8));
    assert!(!report.verdict.fair);
}

#[test]
fn empty_level_counts_as_zero() {
    let table = grouped_table(&[("A", 10, 5), ("B", 10, 5)])
        .with_levels("group", vec!["A".into(), "B".into(), "C".into()])
        .unwrap();
    let report = statistical_parity(&table, "group", "target", &Value::Int(1)).unwrap();
    assert_eq!(report.proportions[&key("C")], 0.0);
    assert_eq!(report.verdict.disparity, Some(0.5));
    assert!(!report.verdict.fair);
}

#[test]
fn list_cells_are_flattened() {
    let table = Table::from_rows(
        ["target"],
        vec![
            vec![Value::List(vec![Value::Int(1)])],
            vec![Value::List(vec![])],
            vec![Value::Int(1)],
        ],
    )
    .unwrap();
    let table = normalize_target(table, "target").unwrap();
    let cells: Vec<Value> = table.column("target").unwrap().cloned().collect();
    assert_eq!(cells, vec![Value::Int(1), Value::Null, Value::Int(1)]);
}

#[test]
fn group_without_positives() {
    let table = classifier_table(&[
        ("A", 0, 1),
        ("A", 0, 0),
        ("A", 0, 0),
        ("A", 0, 1),
        ("B", 1, 1),
        ("B", 0, 0),
    ]);
    let metrics = performance_parity(&table, "group", "label", "pred").unwrap();
    let a = metrics.get(&key("A")).unwrap();
    assert_eq!(a.tpr, None);
    assert_eq!(a.fpr, Some(0.5));
    let b = metrics.get(&key("B")).unwrap();
    assert_eq!((b.tpr, b.fpr), (Some(1.0), Some(0.0)));
}

#[test]
fn missing_column_is_isolated() {
    init_test_logger();
    let table = grouped_table(&[("A", 4, 2), ("B", 4, 1)]);
    let out = analyze(&table, &["missing_col", "group"], "target", &Value::Int(1)).unwrap();

    assert_eq!(out.len(), 2);
    assert_eq!(
        out[0],
        ColumnParity::Missing {
            column: "missing_col".into()
        }
    );
    let report = out[1].report().unwrap();
    assert_eq!(report.proportions[&key("A")], 0.5);
    assert_eq!(report.proportions[&key("B")], 0.25);
    assert!(!report.verdict.fair);

    // The standalone evaluator reports the same column as an error.
    assert_eq!(
        statistical_parity(&table, "missing_col", "target", &Value::Int(1)).unwrap_err(),
        FairnessError::column_not_found("missing_col")
    );
}

#[test]
fn full_pipeline_from_ndjson_to_text() {
    init_test_logger();
    let table = equitas::parse_ndjson(
        r#"{"gender": "F", "region": "north", "label": [1], "pred": 1}
{"gender": "F", "region": "south", "label": [0], "pred": 1}
{"gender": "M", "region": "north", "label": [1], "pred": 1}
{"gender": "M", "region": "south", "label": [], "pred": 0}
{"gender": null, "region": "south", "label": 1, "pred": 0}
"#,
    )
    .unwrap();

    let request = AnalysisRequest::new(
        vec!["ethnicity".into(), "gender".into()],
        "label",
        Value::Int(1),
    )
    .with_control("region")
    .with_prediction("pred");
    let report = Analyzer::new(request).unwrap().run(table).unwrap();

    assert_eq!(report.rows, 5);
    let gender = report.columns[1].report().unwrap();
    assert_eq!(gender.proportions.len(), 2);
    assert_eq!(gender.proportions[&key("F")], 0.5);
    assert_eq!(gender.proportions[&key("M")], 0.5);

    let matrix = &report.conditional.as_ref().unwrap().matrix;
    assert_eq!(matrix.get(&key("M"), &key("south")), None);
    assert_eq!(matrix.get(&key("F"), &key("south")), Some(0.0));

    let rates = report.performance.as_ref().unwrap().metrics.get(&key("F")).copied();
    assert_eq!(rates.map(|r| (r.tpr, r.fpr)), Some((Some(1.0), Some(1.0))));

    let text = equitas_report::render_report(&report);
    assert!(text.contains("Sensitive column 'ethnicity' not found in the dataset."));
    assert!(text.ends_with("Result: all evaluated columns are fair\n"));

    let json = equitas_report::to_json(&report).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["columns"][0]["status"], "missing");
    assert_eq!(parsed["diagnostics"][0]["role"], "sensitive");
}

#[test]
fn json_array_and_ndjson_load_equal_tables() {
    let array = equitas::parse_json_array(r#"[{"g": "A", "y": 1.5}, {"y": true, "z": null}]"#)
        .unwrap();
    let lines = equitas::parse_ndjson("{\"g\": \"A\", \"y\": 1.5}\n{\"y\": true, \"z\": null}")
        .unwrap();
    assert_eq!(array, lines);
    assert_eq!(array.columns(), &["g", "y", "z"]);
}
