// Test suite for events and cluster autoscaler settings

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{at, open_store};
use gcr_core::hash::ContentHash;
use gcr_core::model::{AutoscalerSettingsInfo, EventInfo};
use gcr_store::HashCount;

fn event(uid: &str, offset: i64, reason: &str) -> EventInfo {
    EventInfo {
        uid: uid.to_string(),
        event_time: at(offset),
        reporting_controller: "default-scheduler".to_string(),
        reason: reason.to_string(),
        message: format!("{} for pod web-0", reason),
        involved_object_kind: "Pod".to_string(),
        involved_object_name: "web-0".to_string(),
        involved_object_namespace: "default".to_string(),
        involved_object_uid: "pod-uid-1".to_string(),
    }
}

fn settings(expander: &str) -> AutoscalerSettingsInfo {
    AutoscalerSettingsInfo {
        snapshot_timestamp: at(1),
        expander: expander.to_string(),
        max_nodes_total: 40,
        priorities: String::new(),
        hash: String::new(),
    }
}

#[test]
fn test_events_are_ordered_by_event_time() {
    let store = open_store();
    let events = store.events().unwrap();
    events.store(&event("e3", 30, "Scheduled")).unwrap();
    events.store(&event("e1", 10, "FailedScheduling")).unwrap();
    events.store(&event("e2", 20, "Nominated")).unwrap();

    let all: Vec<_> = events.load_all().unwrap().into_iter().map(|e| e.uid).collect();
    assert_eq!(all, vec!["e1", "e2", "e3"]);

    let before: Vec<_> = events
        .load_before(at(30))
        .unwrap()
        .into_iter()
        .map(|e| e.uid)
        .collect();
    assert_eq!(before, vec!["e1", "e2"]);

    let loaded = events.load_with_uid("e2").unwrap();
    assert_eq!(loaded, event("e2", 20, "Nominated"));
}

#[test]
fn test_no_events_is_not_found() {
    let store = open_store();
    let events = store.events().unwrap();
    assert!(events.load_all().unwrap_err().is_not_found());
    assert!(events.load_with_uid("missing").unwrap_err().is_not_found());
}

#[test]
fn test_settings_hash_is_computed_on_store() {
    let store = open_store();
    let ca = store.autoscaler_settings().unwrap();
    let least_waste = settings("least-waste");
    let hash = least_waste.content_hash().unwrap();

    assert_eq!(ca.count_with_hash(&hash).unwrap(), HashCount::NotFound);
    ca.store(&least_waste).unwrap();
    ca.store(&least_waste).unwrap();
    ca.store(&settings("priority")).unwrap();

    assert_eq!(ca.count_with_hash(&hash).unwrap(), HashCount::Found(2));
    assert_eq!(ca.load_latest().unwrap().expander, "priority");

    let by_hash = ca.load_with_hash(&hash).unwrap();
    assert_eq!(by_hash.expander, "least-waste");
    assert_eq!(by_hash.hash, hash);
    assert_eq!(by_hash.snapshot_timestamp, at(1));
}

#[test]
fn test_settings_before_first_store_is_not_found() {
    let store = open_store();
    let err = store.autoscaler_settings().unwrap().load_latest().unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.op(), Some("select_latest_ca_settings_info"));
}
