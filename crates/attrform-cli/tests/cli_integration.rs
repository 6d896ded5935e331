//! End-to-end runs of the `attrform` binary

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let schemas = dir.path().join("schemas");
    fs::create_dir(&schemas).unwrap();
    fs::write(
        schemas.join("child.yaml"),
        "name: child\ntype: object\nproperties:\n  id:\n    type: string\n  label:\n    type: string\n",
    )
    .unwrap();
    fs::write(
        schemas.join("page.yaml"),
        "name: page\ntype: object\nproperties:\n  title:\n    type: string\n  children:\n    type: array\n    items: child\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("attrform.toml"),
        r#"
[paths]
schemas_dir = "schemas"

[[engine.relations]]
relation = "children"
item_schema = "child"
kind = { type = "has_many", foreign_key = "page_id" }
"#,
    )
    .unwrap();
    dir
}

fn attrform(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_attrform"))
        .current_dir(dir)
        .env_remove("ATTRFORM_CONFIG")
        .env_remove("RUST_LOG")
        .args(["--config", "attrform.toml", "--no-color"])
        .args(args)
        .output()
        .unwrap()
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_nodes_lists_schema_paths() {
    let dir = workspace();
    let output = attrform(dir.path(), &["-o", "json", "nodes", "--schema", "page"]);
    assert!(output.status.success());

    let paths: Vec<String> = stdout_json(&output)
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["path"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        paths,
        vec!["title", "children", "children.*", "children.*.id", "children.*.label"]
    );
}

#[test]
fn test_nodes_expand_against_data() {
    let dir = workspace();
    // data below a root is the document found at that root
    fs::write(dir.path().join("children.json"), r#"[{"id": "1"}, {"id": "2"}]"#).unwrap();
    let output = attrform(
        dir.path(),
        &["-o", "json", "nodes", "--schema", "page", "--data", "children.json", "--root", "children"],
    );
    assert!(output.status.success());

    let rows = stdout_json(&output);
    let paths: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["0", "1", "0.id", "1.id"]);
}

#[test]
fn test_validate_failure_exits_with_validation_code() {
    let dir = workspace();
    fs::write(dir.path().join("bad.json"), r#"{"title": 5}"#).unwrap();
    let output = attrform(dir.path(), &["-o", "json", "validate", "bad.json", "--schema", "page"]);

    assert_eq!(output.status.code(), Some(2));
    let report = stdout_json(&output);
    assert_eq!(report["valid"], json!(false));
    assert_eq!(report["failures"][0]["path"], json!("data.title"));
}

#[test]
fn test_unknown_schema_exit_code() {
    let dir = workspace();
    fs::write(dir.path().join("doc.json"), "{}").unwrap();
    let output = attrform(dir.path(), &["validate", "doc.json", "--schema", "missing"]);
    assert_eq!(output.status.code(), Some(6));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Schema 'missing' not found"));
}

#[test]
fn test_cycle_attaches_written_children() {
    let dir = workspace();
    fs::write(
        dir.path().join("fixture.json"),
        r#"{
            "owner_key": "1",
            "relations": {
                "children": {"records": [{"id": "1", "label": "One"}, {"id": "2", "label": "Two"}]}
            }
        }"#,
    )
    .unwrap();
    fs::write(dir.path().join("doc.json"), r#"{"children": [{"id": "2"}]}"#).unwrap();

    let output = attrform(
        dir.path(),
        &[
            "-o",
            "json",
            "cycle",
            "fixture.json",
            "--schema",
            "page",
            "--reducer",
            "relation:children",
            "--write",
            "doc.json",
            "--save-to",
            "after.json",
        ],
    );
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report = stdout_json(&output);
    assert_eq!(report["reconciliations"][0]["attached"], json!(["2"]));
    assert_eq!(report["journal"][0]["op"], json!("attach"));
    assert_eq!(report["value"]["children"][0]["label"], json!("Two"));

    let saved: Value = serde_json::from_str(&fs::read_to_string(dir.path().join("after.json")).unwrap()).unwrap();
    assert_eq!(saved["attributes"]["data"]["children"], json!(["2"]));
}

#[test]
fn test_config_show_json() {
    let dir = workspace();
    let output = attrform(dir.path(), &["config", "show", "--format", "json"]);
    assert!(output.status.success());
    let config = stdout_json(&output);
    assert_eq!(config["engine"]["relations"][0]["relation"], json!("children"));
}
