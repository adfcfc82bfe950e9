//! End-to-end tests for the `c4lens` binary.

use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

const SHOP: &str = r#"workspace "Shop" {
    model {
        customer = person "Customer"
        shop = softwareSystem "Shop" {
            web = container "Web" "Rust"
            db = container "Database" "Postgres"
        }
        customer -> shop.web "Browses"
        shop.web -> shop.db "Reads"
    }
    views {
        container shop "Containers" {
            include *
        }
    }
}
"#;

fn c4lens(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_c4lens"))
        .args(args)
        .output()
        .expect("run c4lens")
}

fn write_file(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path.to_string_lossy().into_owned()
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn parse_prints_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_file(dir.path(), "shop.dsl", SHOP);

    let output = c4lens(&["parse", &input]);
    assert!(output.status.success());
    let summary = stdout_json(&output);
    assert_eq!(summary["workspace"], "Shop");
    assert_eq!(summary["element_count"], 4);
    assert_eq!(summary["relationship_count"], 2);
    assert_eq!(summary["error_count"], 0);
}

#[test]
fn parse_full_outputs_workspace() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_file(dir.path(), "shop.dsl", SHOP);

    let output = c4lens(&["parse", &input, "--full"]);
    assert!(output.status.success());
    let parsed = stdout_json(&output);
    assert_eq!(parsed["workspace"]["elements"][2]["id"], "shop.web");
    assert_eq!(parsed["workspace"]["elements"][2]["type"], "container");
    assert_eq!(parsed["workspace"]["views"][0]["elementId"], "shop");
}

#[test]
fn layout_writes_view_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_file(dir.path(), "shop.dsl", SHOP);
    let target = dir.path().join("layout.json");
    let target_str = target.to_string_lossy().into_owned();

    let output = c4lens(&["layout", &input, "--view", "container", "-o", &target_str]);
    assert!(output.status.success());

    let written = std::fs::read_to_string(&target).expect("layout written");
    let layout: Value = serde_json::from_str(&written).expect("layout is JSON");
    assert_eq!(layout["viewType"], "container");
    assert_eq!(layout["nodes"].as_array().map(Vec::len), Some(4));
    assert_eq!(layout["edges"].as_array().map(Vec::len), Some(2));
    assert_eq!(layout["nodes"][1]["x"], 400.0);
    assert_eq!(layout["nodes"][1]["y"], 300.0);
}

#[test]
fn layout_honours_config_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_file(dir.path(), "shop.dsl", SHOP);
    let config = write_file(
        dir.path(),
        "c4lens.toml",
        "[layout]\nperson_x = 25.0\nnode_width = 180.0\n",
    );

    let output = c4lens(&["layout", &input, "--view", "systemContext", "--config", &config]);
    assert!(output.status.success());
    let layout = stdout_json(&output);
    assert_eq!(layout["nodes"][0]["id"], "customer");
    assert_eq!(layout["nodes"][0]["x"], 25.0);
    assert_eq!(layout["nodes"][0]["width"], 180.0);
}

#[test]
fn layout_rejects_unknown_view() {
    let output = c4lens(&["layout", "model {", "--view", "landscape"]);
    assert!(!output.status.success());
}

#[test]
fn views_lists_available_views() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_file(dir.path(), "shop.dsl", SHOP);

    let output = c4lens(&["views", &input, "--json"]);
    assert!(output.status.success());
    let views = stdout_json(&output);
    assert_eq!(views["available"][0]["label"], "System Context");
    assert_eq!(views["available"].as_array().map(Vec::len), Some(3));
    assert_eq!(views["declared"][0]["id"], "container-shop");
}

#[test]
fn validate_accepts_clean_document() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_file(dir.path(), "shop.dsl", SHOP);

    let output = c4lens(&["validate", &input, "--json"]);
    assert!(output.status.success());
    let result = stdout_json(&output);
    assert_eq!(result["valid"], true);
    assert_eq!(result["element_count"], 4);
}

#[test]
fn validate_fails_on_errors() {
    let output = c4lens(&["validate", "model {\np = person\n}", "--json"]);
    assert_eq!(output.status.code(), Some(1));
    let result = stdout_json(&output);
    assert_eq!(result["valid"], false);
    assert_eq!(result["errors"][0]["code"], "c4/error/element");
    assert_eq!(
        result["errors"][0]["message"],
        "Line 2: Invalid element declaration: p = person"
    );
    assert_eq!(result["errors"][0]["line"], 2);
}

#[test]
fn missing_config_file_is_an_error() {
    let output = c4lens(&["layout", "model {", "--config", "/nonexistent/c4lens.toml"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read config file"));
}
