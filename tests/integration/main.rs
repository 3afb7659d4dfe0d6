//! Integration tests for Graft
//!
//! These tests run the library crates and the `graft` binary against graph files.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use graft_core::{Graph, load_graph, save_graph, validate_topology};
use graft_lift::{LiftOptions, LiftTarget, lift};
use tempfile::TempDir;

/// `x` placeholder feeding `y = Mul(x, two)`, `z = Identity(y)`; `w = Neg(two)` on the side.
const MODEL: &str = r#"
{
  "nodes": [
    { "name": "x", "op": "Placeholder",
      "outputs": [{ "dtype": "float32", "shape": [2] }] },
    { "name": "two", "op": "Const",
      "outputs": [{ "dtype": "float32", "shape": [] }],
      "attrs": { "value": { "float": 2.0 } } },
    { "name": "y", "op": "Mul", "inputs": ["x:0", "two:0"],
      "outputs": [{ "dtype": "float32", "shape": [2] }], "device": "cpu:0" },
    { "name": "z", "op": "Identity", "inputs": ["y:0"], "control_inputs": ["two"],
      "outputs": [{ "dtype": "float32", "shape": [2] }] },
    { "name": "w", "op": "Neg", "inputs": ["two:0"],
      "outputs": [{ "dtype": "float32", "shape": [] }] }
  ]
}
"#;

fn write_model(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("model.json");
    fs::write(&path, MODEL).unwrap();
    path
}

fn graft(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_graft"))
        .args(args)
        .output()
        .expect("Failed to execute graft")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_cli_invocation() {
    let output = graft(&["--help"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("lift"));
    assert!(stdout.contains("Extract subgraphs from dataflow graphs"));
}

#[test]
fn test_library_lift_from_file() {
    let dir = TempDir::new().unwrap();
    let source = load_graph(&write_model(&dir)).unwrap();
    let z = source.find_node_by_name("z").unwrap();
    let x = source.find_value("x:0").unwrap();

    let mut destination = Graph::new();
    let op_map = lift(
        &source,
        &[LiftTarget::Node(z)],
        &mut destination,
        &LiftOptions::new().sources([x]),
    )
    .unwrap();

    assert_eq!(destination.node_count(), 4);
    assert!(destination.find_node_by_name("w").is_none());
    assert!(validate_topology(&destination).is_ok());
    assert_eq!(
        op_map.value_names(&source, &destination).get("z:0").map(String::as_str),
        Some("z:0")
    );

    let out = dir.path().join("nested").join("lifted.json");
    save_graph(&destination, &out).unwrap();
    let reloaded = load_graph(&out).unwrap();
    assert_eq!(reloaded.to_string(), destination.to_string());
}

#[test]
fn test_cli_lift_writes_graph() {
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir);
    let out = dir.path().join("lifted.json");

    let output = graft(&[
        "lift",
        "--graph",
        path_arg(&model),
        "--target",
        "z",
        "--source",
        "x:0",
        "--out",
        path_arg(&out),
        "--print-map",
    ]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("y:0 -> y:0"));

    let lifted = load_graph(&out).unwrap();
    assert_eq!(lifted.node_count(), 4);
    let y = lifted.find_node_by_name("y").unwrap();
    assert_eq!(lifted.node(y).unwrap().device.as_deref(), Some("cpu:0"));
    assert!(lifted.node(lifted.find_node_by_name("x").unwrap()).unwrap().is_placeholder());
}

#[test]
fn test_cli_lift_rejects_placeholder() {
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir);

    let output = graft(&["lift", "--graph", path_arg(&model), "--target", "z"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("placeholder `x`"));
}

#[test]
fn test_cli_lift_with_config() {
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir);
    let config = dir.path().join("lift.toml");
    fs::write(&config, "add_sources = true\n").unwrap();

    let output = graft(&[
        "lift",
        "--graph",
        path_arg(&model),
        "--target",
        "z:0",
        "--target",
        "w",
        "--config",
        path_arg(&config),
    ]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 5);
    assert!(stdout.contains("z = Identity(y:0) ^two"));
}

#[test]
fn test_cli_show_and_check() {
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir);

    let output = graft(&["show", "--graph", path_arg(&model)]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("y = Mul(x:0, two:0) @cpu:0"));

    let output = graft(&["check", "--graph", path_arg(&model)]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("ok: 5 nodes"));
}

#[test]
fn test_cli_missing_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.json");

    let output = graft(&["show", "--graph", path_arg(&missing)]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("reading graph file"));
}
