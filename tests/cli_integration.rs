//! Integration tests for the command line interface

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const MANIFEST: &str = r#"[
    {"id": "org.example.maps", "label": "Maps", "apk_bytes": 20971520, "data_bytes": 104857600, "cache_bytes": 1048576},
    {"id": "org.example.notes", "label": "Notes", "apk_bytes": 1048576, "data_bytes": 2097152, "cache_bytes": 0},
    {"id": "org.example.clock", "apk_bytes": 524288}
]"#;

/// Command isolated from the user's configuration directory
fn app_usage(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("app-usage").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.join("config"))
        .env("HOME", home)
        .env_remove("RUST_LOG");
    cmd
}

fn setup() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("packages.json"), MANIFEST).unwrap();
    // Account against the root filesystem so free space is always present
    fs::write(
        dir.path().join("app-usage.toml"),
        "[storage]\ndata_mount = \"/\"\ncache_mount = \"/nonexistent-cache\"\nblock_size = 4096\n",
    )
    .unwrap();
    dir
}

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    app_usage(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("filter"));
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    app_usage(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("app-usage"));
}

#[test]
fn test_scan_tree_output() {
    let dir = setup();

    app_usage(dir.path())
        .arg("--config")
        .arg(dir.path().join("app-usage.toml"))
        .arg("scan")
        .arg("--manifest")
        .arg(dir.path().join("packages.json"))
        .arg("--apk")
        .arg("--data")
        .assert()
        .success()
        .stdout(predicate::str::contains("Data"))
        .stdout(predicate::str::contains("Applications"))
        .stdout(predicate::str::contains("Maps (org.example.maps)"))
        .stdout(predicate::str::contains("Free space"))
        .stdout(predicate::str::contains("Total:"))
        .stdout(predicate::str::contains("3 applications"));
}

#[test]
fn test_scan_sd_has_no_synthetic_entries() {
    let dir = setup();

    app_usage(dir.path())
        .arg("--config")
        .arg(dir.path().join("app-usage.toml"))
        .arg("scan")
        .arg("--manifest")
        .arg(dir.path().join("packages.json"))
        .arg("--apk")
        .arg("--sd")
        .assert()
        .success()
        .stdout(predicate::str::contains("Applications"))
        .stdout(predicate::str::contains("Free space").not())
        .stdout(predicate::str::contains("System data").not());
}

#[test]
fn test_scan_json_output() {
    let dir = setup();

    let output = app_usage(dir.path())
        .arg("--config")
        .arg(dir.path().join("app-usage.toml"))
        .arg("scan")
        .arg("--json")
        .arg("--drill-down")
        .arg("--manifest")
        .arg(dir.path().join("packages.json"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["kind"], "wrapper");
    assert!(value.get("name").is_none());

    let container = &value["children"][0];
    let apps = &container["children"][0];
    assert_eq!(apps["name"], "Applications");
    assert_eq!(apps["children"][0]["package_id"], "org.example.maps");
    assert_eq!(apps["children"][0]["children"][0]["component"], "data");
}

#[test]
fn test_scan_missing_manifest_argument() {
    let dir = setup();

    app_usage(dir.path())
        .arg("--config")
        .arg(dir.path().join("app-usage.toml"))
        .arg("scan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("manifest"));
}

#[test]
fn test_scan_unreadable_manifest_shows_empty_applications() {
    let dir = setup();

    app_usage(dir.path())
        .arg("--config")
        .arg(dir.path().join("app-usage.toml"))
        .arg("scan")
        .arg("--manifest")
        .arg(dir.path().join("missing.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("0 applications"));
}

#[test]
fn test_filter_set_show_reset() {
    let dir = TempDir::new().unwrap();

    app_usage(dir.path())
        .args(["filter", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# default filter"));

    app_usage(dir.path())
        .args(["filter", "set", "--cache"])
        .assert()
        .success()
        .stdout(predicate::str::contains("use_cache = true"))
        .stdout(predicate::str::contains("use_apk = false"));

    assert!(dir.path().join("config/app-usage/filter.toml").exists());

    app_usage(dir.path())
        .args(["filter", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# saved filter"))
        .stdout(predicate::str::contains("use_cache = true"));

    app_usage(dir.path())
        .args(["filter", "reset"])
        .assert()
        .success();

    app_usage(dir.path())
        .args(["filter", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# default filter"));
}

#[test]
fn test_scan_uses_saved_filter() {
    let dir = setup();

    app_usage(dir.path())
        .args(["filter", "set", "--cache"])
        .assert()
        .success();

    app_usage(dir.path())
        .arg("--config")
        .arg(dir.path().join("app-usage.toml"))
        .arg("scan")
        .arg("--manifest")
        .arg(dir.path().join("packages.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache"))
        .stdout(predicate::str::contains("Data and Cache").not());
}

#[test]
fn test_completions() {
    let dir = TempDir::new().unwrap();
    app_usage(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("app-usage"));
}

#[test]
fn test_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "[report]\ntop = 0\n").unwrap();

    app_usage(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["filter", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("top"));
}
