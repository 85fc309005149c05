use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;

const BIN: &str = env!("CARGO_BIN_EXE_config-validate");

const DATABASE_SCHEMA: &str = r#"
database:
  type: map
  required: true
  entry:
    adapter: { type: string, required: true, values: [mysql2, postgresql] }
    host: { type: string, matches: [ip, host] }
    port: { type: integer }
    pool: { type: integer, required: true }
"#;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create parent dir");
    }
    fs::write(&path, contents).expect("failed to write fixture");
    path
}

fn run(args: &[&str]) -> Output {
    std::process::Command::new(BIN)
        .args(args)
        .output()
        .expect("failed to run config-validate")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_valid_document_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "db.schema.yml", DATABASE_SCHEMA);
    let doc = write(
        dir.path(),
        "database.yml",
        "database:\n  adapter: postgresql\n  host: db.internal\n  pool: 5\n",
    );

    let output = run(&["check", "--schema", schema.to_str().unwrap(), doc.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("database.yml: valid"));
    assert!(stdout(&output).contains("Checked 1 document(s), 0 invalid."));
}

#[test]
fn check_invalid_document_lists_errors_and_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "db.schema.yml", DATABASE_SCHEMA);
    let doc = write(
        dir.path(),
        "database.yml",
        "database:\n  adapter: sqlite3\n  port: '5432'\n",
    );

    let output = run(&["check", "--schema", schema.to_str().unwrap(), doc.to_str().unwrap()]);
    let text = stdout(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(text.contains("database.adapter: must be one of mysql2, postgresql, but was sqlite3"));
    assert!(text.contains("database.pool: was required"));
    assert!(text.contains("database.port: supposed to be a Integer but was String"));
}

#[test]
fn check_json_output_is_machine_readable() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "db.schema.yml", DATABASE_SCHEMA);
    let good = write(dir.path(), "good.json", r#"{"database": {"adapter": "mysql2", "pool": 2}}"#);
    let bad = write(dir.path(), "bad.yml", "database: {}\n");

    let output = run(&[
        "check",
        "--schema",
        schema.to_str().unwrap(),
        good.to_str().unwrap(),
        bad.to_str().unwrap(),
        "--format",
        "json",
    ]);
    assert_eq!(output.status.code(), Some(1));

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["valid"], true);
    assert_eq!(reports[1]["valid"], false);
    assert_eq!(reports[1]["errors"]["database.adapter"][0], "was required");
    assert_eq!(reports[1]["errors"]["database.pool"], serde_json::json!(["was required"]));
}

#[test]
fn check_accepts_custom_patterns() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(
        dir.path(),
        "release.yml",
        "version: { type: string, required: true, matches: semver }\n",
    );
    let doc = write(dir.path(), "release.yml.d/app.yml", "version: 2.0.1\n");

    let without = run(&["check", "--schema", schema.to_str().unwrap(), doc.to_str().unwrap()]);
    assert_eq!(without.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&without.stderr).contains("semver"));

    let with = run(&[
        "check",
        "--schema",
        schema.to_str().unwrap(),
        doc.to_str().unwrap(),
        "--pattern",
        r"semver=^\d+\.\d+\.\d+$",
    ]);
    assert_eq!(with.status.code(), Some(0));
}

#[test]
fn check_missing_document_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "db.schema.yml", DATABASE_SCHEMA);
    let missing = dir.path().join("missing.yml");

    let output = run(&["check", "--schema", schema.to_str().unwrap(), missing.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("error: "));
}

#[test]
fn check_malformed_schema_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "bad.yml", "items: { type: string, entry: [{ type: string }] }\n");
    let doc = write(dir.path(), "doc.yml", "items: x\n");

    let output = run(&["check", "--schema", schema.to_str().unwrap(), doc.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load schema"));
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_checks_every_target_in_config() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "schemas/db.yml", DATABASE_SCHEMA);
    write(
        dir.path(),
        "schemas/limits.yml",
        "limits: { type: map, depth: 2 }\n",
    );
    write(dir.path(), "config/db.yml", "database: { adapter: mysql2, pool: 1 }\n");
    write(dir.path(), "config/limits.yml", "limits: { a: { b: [1] } }\n");
    let config = write(
        dir.path(),
        "check.yml",
        r#"
version: "1.0"
targets:
  - schema: schemas/db.yml
    documents: [config/db.yml]
  - schema: schemas/limits.yml
    documents: [config/limits.yml]
"#,
    );

    let output = run(&["run", "--config", config.to_str().unwrap(), "--format", "yaml"]);
    assert_eq!(output.status.code(), Some(1));

    let reports: serde_yaml::Value = serde_yaml::from_slice(&output.stdout).unwrap();
    let reports = reports.as_sequence().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["valid"], serde_yaml::Value::Bool(true));
    assert_eq!(
        reports[1]["errors"]["limits"][0].as_str(),
        Some("depth must be at most 2, but was 3")
    );
}

#[test]
fn run_missing_config_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&["run", "--config", dir.path().join("nope.yml").to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
}

// ---------------------------------------------------------------------------
// depth
// ---------------------------------------------------------------------------

#[test]
fn depth_prints_document_and_field_depth() {
    let dir = tempfile::tempdir().unwrap();
    let doc = write(dir.path(), "doc.yml", "config:\n  ports: [80, 443]\n  empty: []\n");

    let whole = run(&["depth", doc.to_str().unwrap()]);
    assert_eq!(whole.status.code(), Some(0));
    assert_eq!(stdout(&whole).trim(), "3");

    let field = run(&["depth", doc.to_str().unwrap(), "--path", "config.empty"]);
    assert_eq!(stdout(&field).trim(), "0");

    let missing = run(&["depth", doc.to_str().unwrap(), "--path", "config.nope"]);
    assert_eq!(missing.status.code(), Some(2));
}
