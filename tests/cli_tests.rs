//! End-to-end tests for the benchgate binary
//!
//! `summarize` ingests raw benchmark output; `analyze` gates candidate runs
//! against their history and exits non-zero on regressions.

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const BENCH_OUTPUT: &str = r#"Memory stats enabled
{"benchmark": "render", "results": [{"name": "diff", "min_ns": 90, "avg_ns": 100, "max_ns": 130, "total_ns": 1000, "iterations": 10}]}
{"benchmark": "render", "results": [{"name": "diff", "min_ns": 92, "avg_ns": 104, "max_ns": 128, "total_ns": 1040, "iterations": 10}]}
{"benchmark": "render", "results": [{"name": "diff", "min_ns": 91, "avg_ns": 102, "max_ns": 125, "total_ns": 1020, "iterations": 10}]}
"#;

fn history_json(candidate_median: u64) -> String {
    let history: Vec<String> = [100, 102, 98, 101, 99]
        .iter()
        .enumerate()
        .map(|(i, m)| {
            format!(
                r#"{{"run_id": {}, "median_ns": {}, "std_dev_ns": 5, "sample_count": 5}}"#,
                5 - i,
                m
            )
        })
        .collect();
    format!(
        r#"[{{"category": "render", "name": "diff", "history": [{}],
             "candidate": {{"run_id": 6, "median_ns": {}, "std_dev_ns": 5, "sample_count": 5}}}},
           {{"category": "render", "name": "fresh", "history": [],
             "candidate": {{"run_id": 6, "median_ns": 50, "std_dev_ns": 2, "sample_count": 5}}}}]"#,
        history.join(", "),
        candidate_median
    )
}

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_summarize_text() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "bench.jsonl", BENCH_OUTPUT);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("benchgate");
    cmd.arg("summarize")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("render/diff"))
        .stdout(predicate::str::contains("102"))
        .stdout(predicate::str::contains("[97, 107]"));
}

#[test]
fn test_summarize_json() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "bench.jsonl", BENCH_OUTPUT);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("benchgate");
    let output = cmd
        .args(["summarize", "--run-id", "42", "--format", "json"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows[0]["summary"]["run_id"], 42);
    assert_eq!(rows[0]["summary"]["median_ns"], 102);
    assert_eq!(rows[0]["distribution"]["sample_count"], 3);
    assert_eq!(rows[0]["distribution"]["min_ns"], 90);
    assert!(rows[0]["summary"]["sem_ns"].as_f64().unwrap() > 0.0);
    // mean 102, sd 2, n 3: t(df = 2) = 4.303
    assert_eq!(rows[0]["mean_ci"]["lower_ns"], 97);
    assert_eq!(rows[0]["mean_ci"]["upper_ns"], 107);
}

#[test]
fn test_summarize_malformed_input_fails() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "bench.jsonl", "{\"benchmark\": \n");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("benchgate");
    cmd.arg("summarize")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 1"));
}

#[test]
fn test_analyze_regression_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let history = write(&dir, "history.json", &history_json(130));

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("benchgate");
    cmd.arg("analyze")
        .arg(&history)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("REGRESSIONS DETECTED (1)"))
        .stdout(predicate::str::contains("render/diff"))
        .stdout(predicate::str::contains("+30.0%"))
        .stdout(predicate::str::contains("insufficient"));
}

#[test]
fn test_analyze_steady_succeeds() {
    let dir = TempDir::new().unwrap();
    let history = write(&dir, "history.json", &history_json(101));

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("benchgate");
    cmd.arg("analyze")
        .arg(&history)
        .assert()
        .success()
        .stdout(predicate::str::contains("NO REGRESSIONS DETECTED"))
        .stdout(predicate::str::contains("Summary: 0 regressed, 1 ok, 1 insufficient"));
}

#[test]
fn test_analyze_json_output() {
    let dir = TempDir::new().unwrap();
    let history = write(&dir, "history.json", &history_json(130));

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("benchgate");
    let output = cmd
        .args(["analyze", "--format", "json"])
        .arg(&history)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["regressed"], 1);
    assert_eq!(report["insufficient"], 1);
    assert_eq!(report["analyses"][0]["result"]["status"], "regressed");
    assert_eq!(report["analyses"][0]["introducing_run"], 6);
    assert!(report["analyses"][1]["result"].get("p_value").is_none());
}

#[test]
fn test_analyze_json_annotates_history() {
    let dir = TempDir::new().unwrap();
    let history = write(&dir, "history.json", &history_json(130));

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("benchgate");
    let output = cmd
        .args(["analyze", "--format", "json"])
        .arg(&history)
        .output()
        .unwrap();

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let diff = &report["analyses"][0];
    assert_eq!(diff["candidate_ci"]["lower_ns"], 124);
    assert_eq!(diff["candidate_ci"]["upper_ns"], 136);
    assert!(diff["candidate"]["sem_ns"].as_f64().unwrap() > 2.2);

    let runs = diff["history"].as_array().unwrap();
    assert_eq!(runs.len(), 5);
    assert_eq!(runs[0]["run_id"], 5);
    assert_eq!(runs[0]["status"], "baseline");
    assert!(runs[1..].iter().all(|r| r["status"] == "ok"));
    assert_eq!(runs[2]["ci"]["sem_ns"], 2);

    assert!(report["analyses"][1]["history"].as_array().unwrap().is_empty());
}

#[test]
fn test_analyze_counts_improvements() {
    let dir = TempDir::new().unwrap();
    let history = write(&dir, "history.json", &history_json(90));

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("benchgate");
    cmd.arg("analyze")
        .arg(&history)
        .assert()
        .success()
        .stdout(predicate::str::contains("-10.0%"))
        .stdout(predicate::str::contains("1 ok, 1 insufficient, 1 improved"));
}

#[test]
fn test_analyze_config_file_and_override() {
    let dir = TempDir::new().unwrap();
    let history = write(&dir, "history.json", &history_json(130));
    // Six valid runs required: render/diff has only five
    let config = write(&dir, "gate.toml", "min_points = 6\n");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("benchgate");
    cmd.arg("analyze")
        .arg(&history)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 regressed, 0 ok, 2 insufficient"));

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("benchgate");
    cmd.arg("analyze")
        .arg(&history)
        .arg("--config")
        .arg(&config)
        .args(["--min-points", "3"])
        .assert()
        .code(1);
}

#[test]
fn test_analyze_rejects_invalid_alpha() {
    let dir = TempDir::new().unwrap();
    let history = write(&dir, "history.json", &history_json(130));

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("benchgate");
    cmd.arg("analyze")
        .arg(&history)
        .args(["--alpha", "2.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("alpha must be in (0, 1)"));
}

#[test]
fn test_analyze_missing_file() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("benchgate");
    cmd.args(["analyze", "/nonexistent/history.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open history file"));
}
