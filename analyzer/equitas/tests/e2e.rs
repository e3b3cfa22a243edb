use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const DATA: &str = r#"{"gender": "F", "region": "north", "label": [1], "pred": 1}
{"gender": "F", "region": "south", "label": [0], "pred": 0}
{"gender": "M", "region": "north", "label": [1], "pred": 1}
{"gender": "M", "region": "south", "label": [], "pred": 0}
"#;

fn equitas(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_equitas"))
        .args(args)
        .current_dir(dir)
        .output()
        .expect("spawn equitas")
}

fn write_data(dir: &Path) {
    fs::write(dir.join("data.ndjson"), DATA).unwrap();
}

#[test]
fn e2e_analyze_text_report() {
    let dir = tempfile::tempdir().unwrap();
    write_data(dir.path());

    let out = equitas(
        dir.path(),
        &[
            "analyze",
            "data.ndjson",
            "--sensitive",
            "missing_col,gender",
            "--target",
            "label",
            "--target-value",
            "1",
            "--control",
            "region",
            "--prediction",
            "pred",
        ],
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(out.status.success(), "analyze failed: {out:?}");
    assert!(stdout.contains("Sensitive column 'missing_col' not found in the dataset."));
    assert!(stdout.contains("Statistical parity on 'gender'"));
    assert!(stdout.contains("disparity 0.0000 <= threshold 0.1000: fair"));
    assert!(stdout.contains("Conditional parity of 'gender' given 'region'"));
    assert!(stdout.contains("Performance parity of 'pred' by 'gender'"));
}

#[test]
fn e2e_analyze_json_and_deny_unfair() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("data.json"),
        r#"[{"g": "A", "y": 1}, {"g": "A", "y": 1}, {"g": "B", "y": 0}, {"g": "B", "y": 1}]"#,
    )
    .unwrap();

    let out = equitas(
        dir.path(),
        &["analyze", "data.json", "-s", "g", "-t", "y", "--target-value", "1", "--json"],
    );
    assert!(out.status.success(), "analyze --json failed: {out:?}");
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["columns"][0]["status"], "evaluated");
    let proportions = &json["columns"][0]["report"]["proportions"];
    assert_eq!(proportions[0]["group"], "A");
    assert_eq!(proportions[0]["proportion"], 1.0);
    assert_eq!(proportions[1]["group"], "B");
    assert_eq!(proportions[1]["proportion"], 0.5);
    assert_eq!(json["columns"][0]["report"]["verdict"]["fair"], false);

    let out = equitas(
        dir.path(),
        &["analyze", "data.json", "-s", "g", "-t", "y", "--target-value", "1", "--deny-unfair"],
    );
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("unfair columns: g"));
}

#[test]
fn e2e_analyze_csv() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("data.csv"),
        "group,label,pred\nA,1,1\nA,0,1\nB,1,1\nB,,0\n1,1,0\n",
    )
    .unwrap();

    let out = equitas(
        dir.path(),
        &[
            "analyze", "data.csv", "-s", "group", "-t", "label", "--target-value", "1", "--json",
        ],
    );
    assert!(out.status.success(), "analyze data.csv failed: {out:?}");
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["rows"], 5);
    let proportions = json["columns"][0]["report"]["proportions"].as_array().unwrap();
    let groups: Vec<&serde_json::Value> = proportions.iter().map(|p| &p["group"]).collect();
    assert_eq!(groups, [&serde_json::json!(1), &serde_json::json!("A"), &serde_json::json!("B")]);
    assert_eq!(proportions[1]["proportion"], 0.5);
}

#[test]
fn e2e_init_then_analyze_with_config() {
    let dir = tempfile::tempdir().unwrap();
    write_data(dir.path());

    let status = Command::new(env!("CARGO_BIN_EXE_equitas"))
        .arg("init")
        .current_dir(dir.path())
        .status()
        .expect("spawn equitas init");
    assert!(status.success(), "equitas init failed: {status:?}");
    let config = fs::read_to_string(dir.path().join("equitas.toml")).unwrap();
    assert!(config.contains("[analysis]"));

    // The template points at data.ndjson and a "gender" column.
    let out = equitas(
        dir.path(),
        &["analyze", "-c", "equitas.toml", "--plot-dir", "charts"],
    );
    assert!(out.status.success(), "analyze -c failed: {out:?}");
    assert!(dir.path().join("charts/gender_parity.svg").exists());

    let again = equitas(dir.path(), &["init"]);
    assert_eq!(again.status.code(), Some(2));
}

#[test]
fn e2e_usage_and_load_errors_exit_2() {
    let dir = tempfile::tempdir().unwrap();
    write_data(dir.path());

    let out = equitas(dir.path(), &["analyze", "data.ndjson", "-s", "gender"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("missing required setting 'target'"));

    let out = equitas(
        dir.path(),
        &["analyze", "nope.json", "-s", "g", "-t", "y", "--target-value", "1"],
    );
    assert_eq!(out.status.code(), Some(2));

    let out = equitas(
        dir.path(),
        &["analyze", "data.ndjson", "-s", "gender", "-t", "label", "--target-value", "1", "--threshold", "3"],
    );
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn e2e_missing_target_column_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    write_data(dir.path());
    let out = equitas(
        dir.path(),
        &["analyze", "data.ndjson", "-s", "gender", "-t", "outcome", "--target-value", "1"],
    );
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("outcome"));
}

#[test]
fn e2e_columns_summary() {
    let dir = tempfile::tempdir().unwrap();
    write_data(dir.path());
    let out = equitas(dir.path(), &["columns", "data.ndjson", "--target", "pred"]);
    assert!(out.status.success(), "columns failed: {out:?}");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("4 rows, 4 columns"));
    assert!(stdout.contains("  0: 2"));
}
