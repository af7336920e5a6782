//! E2E CLI tests covering:
//! - `lineage resolve` text and JSON output, exclusion markers, diagnostics
//! - Fatal configuration errors (missing sheet, bad layout) and cycles
//! - `lineage ancestors`, `lineage cycles`, `lineage sheets`, `lineage find`
//! - `lineage.toml` overrides
//!
//! Each test runs the `lineage` binary as a subprocess in an isolated temp
//! directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

/// Build a Command targeting the lineage binary, rooted in `dir`.
fn lineage_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("lineage"));
    cmd.current_dir(dir);
    cmd.env("LINEAGE_LOG", "error");
    cmd.env("XDG_CONFIG_HOME", dir.join(".config"));
    cmd.env_remove("FORMAT");
    cmd
}

const HEADER: &str = "Account,Id,Region,Parent,Parent Id";

/// Write `rows` (with a header) as `<name>.csv` in `dir`.
fn write_sheet(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
    let path = dir.join(format!("{name}.csv"));
    let mut body = String::from(HEADER);
    for row in rows {
        body.push('\n');
        body.push_str(row);
    }
    body.push('\n');
    fs::write(&path, body).expect("write sheet");
    path
}

fn worked_example(dir: &Path) -> PathBuf {
    write_sheet(
        dir,
        "accounts",
        &["A,1,US,,", "B,2,US,A,1", "C,3,US,B,2"],
    )
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("command should not crash");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

// ---------------------------------------------------------------------------
// resolve
// ---------------------------------------------------------------------------

#[test]
fn resolve_prints_one_line_per_entity() {
    let dir = TempDir::new().expect("tempdir");
    let book = worked_example(dir.path());

    lineage_cmd(dir.path())
        .args(["resolve"])
        .arg(&book)
        .args(["--format", "text"])
        .assert()
        .success()
        .stdout("1 : \n2 : 1\n3 : 1,2\n");
}

#[test]
fn resolve_json_exposes_both_maps() {
    let dir = TempDir::new().expect("tempdir");
    let book = worked_example(dir.path());

    let json = stdout_json(lineage_cmd(dir.path()).args(["resolve"]).arg(&book).arg("--json"));

    assert_eq!(json["sheet"], "accounts");
    assert_eq!(json["rows_read"], 3);
    assert_eq!(json["relation"]["3"], "2");
    assert_eq!(json["ancestors"]["3"], serde_json::json!(["1", "2"]));
    assert_eq!(json["ancestors"]["1"], serde_json::json!([]));
}

#[test]
fn resolve_skips_marked_rows() {
    let dir = TempDir::new().expect("tempdir");
    let book = write_sheet(
        dir.path(),
        "accounts",
        &["A,1,US,,", "#Old,9,US,A,1", "B,2,US,A,1"],
    );

    lineage_cmd(dir.path())
        .args(["resolve"])
        .arg(&book)
        .args(["--format", "text", "--diagnostics"])
        .assert()
        .success()
        .stdout("1 : \n2 : 1\n")
        .stderr(predicate::str::contains("row 3 (9): excluded by marker"));
}

#[test]
fn resolve_accumulates_duplicate_rows() {
    let dir = TempDir::new().expect("tempdir");
    let book = write_sheet(
        dir.path(),
        "accounts",
        &["A,1,US,,", "B,2,US,,", "C,3,US,A,1", "C,3,EU,B,2"],
    );

    let json = stdout_json(lineage_cmd(dir.path()).args(["resolve"]).arg(&book).arg("--json"));

    assert_eq!(json["relation"]["3"], "2");
    assert_eq!(json["ancestors"]["3"], serde_json::json!(["1", "2"]));
    let overridden = json["diagnostics"]
        .as_array()
        .expect("diagnostics array")
        .iter()
        .any(|diag| diag["reason"] == "parent_overridden");
    assert!(overridden);
}

#[test]
fn resolve_missing_sheet_is_fatal() {
    let dir = TempDir::new().expect("tempdir");
    let book = worked_example(dir.path());

    lineage_cmd(dir.path())
        .args(["resolve"])
        .arg(&book)
        .args(["--sheet", "Nope"])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("error[E1003]: sheet 'Nope' is not found"));
}

#[test]
fn resolve_missing_workbook_is_fatal() {
    let dir = TempDir::new().expect("tempdir");

    lineage_cmd(dir.path())
        .args(["resolve", "missing.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1001"));
}

#[test]
fn resolve_cycle_fails_instead_of_hanging() {
    let dir = TempDir::new().expect("tempdir");
    let book = write_sheet(dir.path(), "accounts", &["A,1,US,B,2", "B,2,US,A,1"]);

    lineage_cmd(dir.path())
        .args(["resolve"])
        .arg(&book)
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2003"));
}

#[test]
fn resolve_json_error_is_structured() {
    let dir = TempDir::new().expect("tempdir");
    let book = worked_example(dir.path());

    let output = lineage_cmd(dir.path())
        .args(["resolve"])
        .arg(&book)
        .args(["--sheet", "Nope", "--json"])
        .output()
        .expect("command should not crash");
    assert!(!output.status.success());
    let json: Value = serde_json::from_slice(&output.stderr).expect("JSON error");
    assert_eq!(json["error"]["error_code"], "E1003");
}

#[test]
fn resolve_picks_sheet_from_directory_workbook() {
    let dir = TempDir::new().expect("tempdir");
    let book = dir.path().join("book");
    fs::create_dir(&book).expect("mkdir");
    write_sheet(&book, "Sales", &["A,1,US,,", "B,2,US,A,1"]);
    write_sheet(&book, "Regions", &["X,7,US,,"]);

    lineage_cmd(dir.path())
        .args(["resolve"])
        .arg(&book)
        .args(["--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pick one with --sheet"));

    lineage_cmd(dir.path())
        .args(["resolve"])
        .arg(&book)
        .args(["--sheet", "Sales", "--format", "text"])
        .assert()
        .success()
        .stdout("1 : \n2 : 1\n");
}

#[test]
fn project_config_overrides_marker_and_columns() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("accounts.csv");
    fs::write(
        &path,
        "Id,Account,Parent Id\n1,A,\n!2,B,1\n3,C,1\n",
    )
    .expect("write sheet");
    fs::write(
        dir.path().join("lineage.toml"),
        "[source]\nmarker = \"!\"\n\n[columns]\nid = 0\nname = 1\nparent_id = 2\nregion = 3\nparent_name = 4\n",
    )
    .expect("write config");

    lineage_cmd(dir.path())
        .args(["resolve", "accounts.csv", "--format", "text"])
        .assert()
        .success()
        .stdout("1 : \n3 : 1\n");
}

#[test]
fn invalid_column_layout_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    let book = worked_example(dir.path());
    let config = dir.path().join("alt.toml");
    fs::write(&config, "[columns]\nid = 0\nname = 0\n").expect("write config");

    lineage_cmd(dir.path())
        .args(["resolve"])
        .arg(&book)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1004"));
}

// ---------------------------------------------------------------------------
// ancestors / cycles / sheets / find
// ---------------------------------------------------------------------------

#[test]
fn ancestors_walks_nearest_first() {
    let dir = TempDir::new().expect("tempdir");
    let book = worked_example(dir.path());

    lineage_cmd(dir.path())
        .args(["ancestors"])
        .arg(&book)
        .args(["3", "--format", "text"])
        .assert()
        .success()
        .stdout("2\n1\n");
}

#[test]
fn ancestors_agree_with_resolve_for_duplicate_rows() {
    let dir = TempDir::new().expect("tempdir");
    let book = write_sheet(
        dir.path(),
        "accounts",
        &["A,1,US,,", "B,2,US,,", "C,3,US,A,1", "C,3,EU,B,2"],
    );

    lineage_cmd(dir.path())
        .args(["ancestors"])
        .arg(&book)
        .args(["3", "--format", "text"])
        .assert()
        .success()
        .stdout("2\n1\n");

    let json = stdout_json(
        lineage_cmd(dir.path())
            .args(["ancestors"])
            .arg(&book)
            .args(["3", "--json"]),
    );
    assert_eq!(json["chain"], serde_json::json!(["2"]));
    assert_eq!(json["ancestors"], serde_json::json!(["1", "2"]));
}

#[test]
fn resolve_reports_lines_after_blank_rows_at_their_physical_number() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("accounts.csv");
    fs::write(&path, format!("{HEADER}\nA,1,US,,\n\n#Old,9,US,A,1\n")).expect("write sheet");

    lineage_cmd(dir.path())
        .args(["resolve", "accounts.csv", "--format", "text", "--diagnostics"])
        .assert()
        .success()
        .stdout("1 : \n")
        .stderr(predicate::str::contains("row 4 (9): excluded by marker"));
}

#[test]
fn ancestors_unknown_entity_fails() {
    let dir = TempDir::new().expect("tempdir");
    let book = worked_example(dir.path());

    lineage_cmd(dir.path())
        .args(["ancestors"])
        .arg(&book)
        .arg("42")
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2001"));
}

#[test]
fn cycles_lists_every_loop() {
    let dir = TempDir::new().expect("tempdir");
    let book = write_sheet(
        dir.path(),
        "accounts",
        &["A,1,US,B,2", "B,2,US,A,1", "C,3,US,D,4", "D,4,US,C,3", "E,5,US,A,1"],
    );

    let json = stdout_json(lineage_cmd(dir.path()).args(["cycles"]).arg(&book).arg("--json"));
    assert_eq!(
        json["cycles"],
        serde_json::json!([["1", "2"], ["3", "4"]])
    );

    lineage_cmd(dir.path())
        .args(["cycles"])
        .arg(&book)
        .args(["--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Parent cycles (2)"))
        .stdout(predicate::str::contains("1 — A"));
}

#[test]
fn cycles_clean_sheet() {
    let dir = TempDir::new().expect("tempdir");
    let book = worked_example(dir.path());

    lineage_cmd(dir.path())
        .args(["cycles"])
        .arg(&book)
        .args(["--format", "text"])
        .assert()
        .success()
        .stdout("No parent cycles found.\n");
}

#[test]
fn sheets_lists_csv_files() {
    let dir = TempDir::new().expect("tempdir");
    let book = dir.path().join("book");
    fs::create_dir(&book).expect("mkdir");
    write_sheet(&book, "Sales Hierarchy File", &["A,1,US,,"]);
    write_sheet(&book, "Regions", &[]);
    fs::write(book.join("notes.txt"), "ignored").expect("write notes");

    lineage_cmd(dir.path())
        .args(["sheets"])
        .arg(&book)
        .args(["--format", "text"])
        .assert()
        .success()
        .stdout("Regions\nSales Hierarchy File\n");
}

#[test]
fn find_shows_row_contents() {
    let dir = TempDir::new().expect("tempdir");
    let book = write_sheet(
        dir.path(),
        "accounts",
        &["#B,2,US,A,1", "A,1,US,,", "B,2,EU,A,1"],
    );

    let json = stdout_json(
        lineage_cmd(dir.path())
            .args(["find"])
            .arg(&book)
            .args(["B", "--json"]),
    );
    assert_eq!(json["row"], 4);
    assert_eq!(
        json["cells"],
        serde_json::json!(["2", "EU", "A", "1"])
    );

    lineage_cmd(dir.path())
        .args(["find"])
        .arg(&book)
        .arg("Z")
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2001"));
}

#[test]
fn completions_emit_script() {
    let dir = TempDir::new().expect("tempdir");

    lineage_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lineage"));
}
