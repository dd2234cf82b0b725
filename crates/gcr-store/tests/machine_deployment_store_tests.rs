// Test suite for machine deployment and worker pool snapshots

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{at, open_store, t0};
use gcr_core::hash::ContentHash;
use gcr_core::model::{MachineDeploymentInfo, WorkerPoolInfo};
use gcr_store::{HashCount, SnapshotStore};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

fn deployment(name: &str, replicas: i32, snapshot_offset: i64) -> MachineDeploymentInfo {
    MachineDeploymentInfo {
        creation_timestamp: t0(),
        snapshot_timestamp: at(snapshot_offset),
        name: name.to_string(),
        namespace: "shoot--dev--ops".to_string(),
        replicas,
        pool_name: "worker-a".to_string(),
        zone: "eu-west-1a".to_string(),
        max_surge: Some(IntOrString::Int(1)),
        max_unavailable: Some(IntOrString::String("25%".to_string())),
        machine_class_name: "worker-a-m5-large".to_string(),
        ..Default::default()
    }
}

fn pool(name: &str, maximum: i32, snapshot_offset: i64) -> WorkerPoolInfo {
    WorkerPoolInfo {
        creation_timestamp: t0(),
        snapshot_timestamp: at(snapshot_offset),
        name: name.to_string(),
        namespace: "shoot--dev--ops".to_string(),
        machine_type: "m5.large".to_string(),
        architecture: "amd64".to_string(),
        minimum: 1,
        maximum,
        max_surge: Some(IntOrString::Int(1)),
        max_unavailable: None,
        zones: vec!["eu-west-1a".to_string(), "eu-west-1b".to_string()],
        ..Default::default()
    }
}

#[test]
fn test_load_latest_for_unknown_deployment_is_not_found() {
    let store = open_store();
    let err = store
        .machine_deployments()
        .unwrap()
        .load_latest("never-stored")
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.code(), "ERR_NOT_FOUND");
    assert_eq!(err.op(), Some("select_latest_mcd_info"));
}

#[test]
fn test_latest_hash_tracks_latest_row() {
    let store = open_store();
    let deployments = store.machine_deployments().unwrap();
    assert_eq!(deployments.latest_hash("worker-a-z1").unwrap(), "");

    let first = deployment("worker-a-z1", 2, 1);
    let second = deployment("worker-a-z1", 3, 2);
    deployments.store(&first).unwrap();
    deployments.store(&second).unwrap();

    assert_eq!(
        deployments.latest_hash("worker-a-z1").unwrap(),
        second.content_hash().unwrap()
    );
    assert_eq!(
        deployments
            .count_with_key_and_hash("worker-a-z1", &first.content_hash().unwrap())
            .unwrap(),
        HashCount::Found(1)
    );
}

#[test]
fn test_deployment_round_trip_keeps_sizing_kinds() {
    let store = open_store();
    let deployments = store.machine_deployments().unwrap();
    deployments.store(&deployment("worker-a-z1", 2, 1)).unwrap();

    let loaded = deployments.load_latest("worker-a-z1").unwrap();
    assert_eq!(loaded.max_surge, Some(IntOrString::Int(1)));
    assert_eq!(
        loaded.max_unavailable,
        Some(IntOrString::String("25%".to_string()))
    );
    assert_eq!(loaded.snapshot_timestamp, at(1));
    assert_eq!(loaded.machine_class_name, "worker-a-m5-large");
}

#[test]
fn test_deployment_load_before_skips_deleted() {
    let store = open_store();
    let deployments = store.machine_deployments().unwrap();
    deployments.store(&deployment("md-a", 1, 1)).unwrap();
    deployments.store(&deployment("md-a", 4, 3)).unwrap();
    deployments.store(&deployment("md-b", 2, 2)).unwrap();
    assert_eq!(
        deployments.update_deletion_timestamp("md-b", at(4)).unwrap(),
        1
    );

    let as_of_2500: Vec<_> = deployments
        .load_before(at(2) + chrono::Duration::milliseconds(500))
        .unwrap()
        .into_iter()
        .map(|d| (d.name, d.replicas))
        .collect();
    assert_eq!(
        as_of_2500,
        vec![("md-a".to_string(), 1), ("md-b".to_string(), 2)]
    );

    let as_of_5 = deployments.load_before(at(5)).unwrap();
    assert_eq!(as_of_5.len(), 1);
    assert_eq!(as_of_5[0].replicas, 4);
}

#[test]
fn test_worker_pool_round_trip_and_as_of() {
    let store = open_store();
    let pools = store.worker_pools().unwrap();
    pools.store(&pool("worker-a", 3, 1)).unwrap();
    pools.store(&pool("worker-a", 5, 10)).unwrap();
    pools.store(&pool("worker-b", 2, 2)).unwrap();

    let latest = pools.load_latest("worker-a").unwrap();
    assert_eq!(latest.maximum, 5);
    assert_eq!(latest.zones, vec!["eu-west-1a", "eu-west-1b"]);
    assert_eq!(latest.max_unavailable, None);

    let as_of_5: Vec<_> = pools
        .load_before(at(5))
        .unwrap()
        .into_iter()
        .map(|p| (p.name, p.maximum))
        .collect();
    assert_eq!(
        as_of_5,
        vec![("worker-a".to_string(), 3), ("worker-b".to_string(), 2)]
    );

    pools.update_deletion_timestamp("worker-b", at(6)).unwrap();
    assert_eq!(pools.load_before(at(20)).unwrap().len(), 1);
    assert!(pools.load_before(at(1)).unwrap_err().is_not_found());
}

#[test]
fn test_worker_pool_dedup_count() {
    let store = open_store();
    let pools = store.worker_pools().unwrap();
    let p = pool("worker-a", 3, 1);
    let hash = p.content_hash().unwrap();

    assert!(!pools
        .count_with_key_and_hash("worker-a", &hash)
        .unwrap()
        .is_found());
    pools.store(&p).unwrap();
    assert_eq!(
        pools.count_with_key_and_hash("worker-a", &hash).unwrap(),
        HashCount::Found(1)
    );
}

#[test]
fn test_worker_pool_string_sizing_values_keep_their_variant() {
    let store = open_store();
    let pools = store.worker_pools().unwrap();
    let mut p = pool("p1", 3, 1);
    p.max_surge = Some(IntOrString::String("1".to_string()));
    p.max_unavailable = Some(IntOrString::String(String::new()));
    p.zones = vec!["zone a".to_string(), String::new()];
    pools.store(&p).unwrap();

    let loaded = pools.load_latest("p1").unwrap();
    assert_eq!(loaded.max_surge, p.max_surge);
    assert_eq!(loaded.max_unavailable, p.max_unavailable);
    assert_eq!(loaded.zones, p.zones);
    assert_eq!(loaded.content_hash().unwrap(), loaded.hash);
    assert_eq!(loaded.hash, p.content_hash().unwrap());
}
