//! CLI integration tests
//!
//! Run the built `gcr` binary against a temporary database seeded through
//! the store API.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{TimeZone, Utc};
use gcr_core::model::NodeInfo;
use gcr_store::{RecorderStore, SnapshotStore, StoreConfig};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(dir: &Path, db: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gcr"))
        .current_dir(dir)
        .env_remove("GCR_DB_PATH")
        .args(args)
        .args(["--db", db.to_str().unwrap()])
        .output()
        .expect("Failed to execute CLI")
}

fn seed_nodes(db: &Path) {
    let mut store = RecorderStore::new(StoreConfig::at_path(db));
    store.init().unwrap();
    let nodes = store.nodes().unwrap();
    for (name, hour) in [("node-a", 8), ("node-b", 9)] {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap();
        nodes
            .store(&NodeInfo {
                name: name.to_string(),
                creation_timestamp: ts,
                snapshot_timestamp: ts,
                ..Default::default()
            })
            .unwrap();
    }
    nodes
        .update_deletion_timestamp("node-a", Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap())
        .unwrap();
    store.close().unwrap();
}

fn node_names(output: &Output) -> Vec<String> {
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["name"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_init_creates_database() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("recorder.db");

    let output = run(temp_dir.path(), &db, &["init"]);
    assert!(output.status.success(), "{:?}", output);
    assert!(db.exists());
    assert!(String::from_utf8_lossy(&output.stdout).contains("2 migrations"));
}

#[test]
fn test_nodes_query_respects_active_flag() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("recorder.db");
    seed_nodes(&db);

    let all = run(
        temp_dir.path(),
        &db,
        &["nodes", "--before", "2024-03-01T10:00:00Z"],
    );
    assert!(all.status.success(), "{:?}", all);
    assert_eq!(node_names(&all), vec!["node-a", "node-b"]);

    let active = run(
        temp_dir.path(),
        &db,
        &["nodes", "--before", "2024-03-01T10:00:00Z", "--active"],
    );
    assert!(active.status.success(), "{:?}", active);
    assert_eq!(node_names(&active), vec!["node-b"]);
}

#[test]
fn test_empty_results_print_empty_list() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("recorder.db");

    let output = run(temp_dir.path(), &db, &["events"]);
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "[]");
}

#[test]
fn test_missing_machine_deployment_fails() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("recorder.db");

    let output = run(
        temp_dir.path(),
        &db,
        &["machine-deployment", "--name", "worker-a-z1"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_NOT_FOUND"));
}

#[test]
fn test_bad_timestamp_is_rejected_by_parser() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("recorder.db");

    let output = run(temp_dir.path(), &db, &["pods", "--before", "yesterday"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("RFC 3339"));
}
