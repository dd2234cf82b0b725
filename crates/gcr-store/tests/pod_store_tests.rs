// Test suite for pod snapshots: scheduling views and name/UID lookups

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{at, open_store, pod, quantity, t0};
use gcr_core::hash::ContentHash;
use gcr_core::model::PodScheduleStatus;
use gcr_store::{HashCount, SnapshotStore};
use k8s_openapi::api::core::v1::{Container, PodSpec, ResourceRequirements};
use std::collections::BTreeMap;

fn uids(pods: &[gcr_core::model::PodInfo]) -> Vec<&str> {
    pods.iter().map(|p| p.uid.as_str()).collect()
}

#[test]
fn test_scheduled_and_unscheduled_views() {
    let store = open_store();
    let pods = store.pods().unwrap();

    pods.store(&pod("u1", "pending-0", "", t0(), t0())).unwrap();
    pods.store(&pod("u2", "running-0", "n1", t0(), at(1))).unwrap();

    let unscheduled = pods.unscheduled_before(at(5)).unwrap();
    assert_eq!(uids(&unscheduled), vec!["u1"]);
    assert!(!unscheduled[0].is_scheduled());
    assert_eq!(uids(&pods.scheduled_before(at(5)).unwrap()), vec!["u2"]);

    // u1 gets bound later on; its latest snapshot decides the view
    pods.store(&pod("u1", "pending-0", "n2", t0(), at(2))).unwrap();
    assert!(pods.unscheduled_before(at(5)).unwrap_err().is_not_found());
    let scheduled = pods.scheduled_before(at(5)).unwrap();
    assert_eq!(scheduled.len(), 2);
    assert!(scheduled.iter().all(|p| p.is_scheduled()));

    pods.update_deletion_timestamp("u2", at(3)).unwrap();
    assert_eq!(uids(&pods.scheduled_before(at(5)).unwrap()), vec!["u1"]);
    assert_eq!(pods.scheduled_before(at(2)).unwrap().len(), 1);
}

#[test]
fn test_latest_before_snapshot_time_ignores_deletion() {
    let store = open_store();
    let pods = store.pods().unwrap();
    pods.store(&pod("u1", "a", "n1", t0(), at(1))).unwrap();
    pods.store(&pod("u1", "a", "n2", t0(), at(4))).unwrap();
    pods.store(&pod("u2", "b", "", t0(), at(2))).unwrap();
    pods.update_deletion_timestamp("u2", at(3)).unwrap();

    let as_of_3 = pods.latest_before_snapshot_time(at(3)).unwrap();
    let summary: Vec<_> = as_of_3
        .iter()
        .map(|p| (p.uid.as_str(), p.node_name.as_str()))
        .collect();
    assert_eq!(summary, vec![("u1", "n1"), ("u2", "")]);

    let as_of_5 = pods.latest_before_snapshot_time(at(5)).unwrap();
    assert_eq!(uids(&as_of_5), vec!["u2", "u1"]);
    assert_eq!(as_of_5[1].node_name, "n2");
}

#[test]
fn test_latest_with_name_prefers_newest_creation() {
    let store = open_store();
    let pods = store.pods().unwrap();
    pods.store(&pod("old-uid", "web-0", "n1", t0(), at(1))).unwrap();
    pods.store(&pod("new-uid", "web-0", "n1", at(10), at(11))).unwrap();

    assert_eq!(pods.load_latest_with_name("web-0").unwrap().uid, "new-uid");
    assert_eq!(pods.load_latest("old-uid").unwrap().creation_timestamp, t0());
    assert!(pods
        .load_latest_with_name("web-1")
        .unwrap_err()
        .is_not_found());
}

#[test]
fn test_pod_round_trip_with_spec_and_status() {
    let store = open_store();
    let pods = store.pods().unwrap();

    let requests = BTreeMap::from([("cpu".to_string(), quantity("500m"))]);
    let mut p = pod("u1", "api-0", "", t0(), at(1));
    p.nominated_node_name = "n7".to_string();
    p.schedule_status = PodScheduleStatus::Unschedulable;
    p.spec = PodSpec {
        containers: vec![Container {
            name: "api".to_string(),
            image: Some("registry.local/api:1.2".to_string()),
            resources: Some(ResourceRequirements {
                requests: Some(requests),
                ..Default::default()
            }),
            ..Default::default()
        }],
        scheduler_name: Some("bin-packing".to_string()),
        ..Default::default()
    };
    pods.store(&p).unwrap();

    let loaded = pods.load_latest("u1").unwrap();
    assert_eq!(loaded.schedule_status, PodScheduleStatus::Unschedulable);
    assert_eq!(loaded.spec, p.spec);
    assert_eq!(loaded.requests, p.requests);
    assert_eq!(loaded.hash, p.content_hash().unwrap());
}

#[test]
fn test_count_is_keyed_by_uid() {
    let store = open_store();
    let pods = store.pods().unwrap();
    let p = pod("u1", "web-0", "n1", t0(), at(1));
    let hash = p.content_hash().unwrap();
    pods.store(&p).unwrap();
    pods.store(&p).unwrap();

    assert_eq!(
        pods.count_with_key_and_hash("u1", &hash).unwrap(),
        HashCount::Found(2)
    );
    assert_eq!(
        pods.count_with_key_and_hash("web-0", &hash).unwrap(),
        HashCount::NotFound
    );
}

#[test]
fn test_corrupt_schedule_status_is_decode_error() {
    let store = open_store();
    let pods = store.pods().unwrap();
    pods.store(&pod("u1", "web-0", "n1", t0(), at(1))).unwrap();
    store
        .connection()
        .unwrap()
        .execute("UPDATE pod_info SET ScheduleStatus = 42", [])
        .unwrap();

    let err = pods.load_latest("u1").unwrap_err();
    assert_eq!(err.code(), "ERR_DECODE");
    assert_eq!(err.field(), Some("ScheduleStatus"));
    assert_eq!(err.op(), Some("select_latest_pod_info"));
}
