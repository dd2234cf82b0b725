// Shared fixtures for gcr-store integration tests

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use gcr_core::model::{NodeInfo, PodInfo};
use gcr_store::{RecorderStore, StoreConfig};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;

/// Initialised in-memory store
pub fn open_store() -> RecorderStore {
    let mut store = RecorderStore::new(StoreConfig::in_memory());
    store.init().expect("in-memory store should initialise");
    store
}

/// Reference instant all fixtures are relative to
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
}

pub fn at(offset_secs: i64) -> DateTime<Utc> {
    t0() + Duration::seconds(offset_secs)
}

pub fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn quantity(value: &str) -> Quantity {
    Quantity(value.to_string())
}

pub fn node(name: &str, created: DateTime<Utc>, snapshot: DateTime<Utc>) -> NodeInfo {
    NodeInfo {
        creation_timestamp: created,
        snapshot_timestamp: snapshot,
        name: name.to_string(),
        namespace: "shoot--dev--ops".to_string(),
        provider_id: format!("aws:///eu-west-1a/{}", name),
        allocatable_volumes: 25,
        labels: labels(&[("topology.kubernetes.io/zone", "eu-west-1a")]),
        allocatable: BTreeMap::from([("cpu".to_string(), quantity("3920m"))]),
        capacity: BTreeMap::from([("cpu".to_string(), quantity("4"))]),
        ..Default::default()
    }
}

pub fn pod(
    uid: &str,
    name: &str,
    node_name: &str,
    created: DateTime<Utc>,
    snapshot: DateTime<Utc>,
) -> PodInfo {
    PodInfo {
        creation_timestamp: created,
        snapshot_timestamp: snapshot,
        name: name.to_string(),
        namespace: "default".to_string(),
        uid: uid.to_string(),
        node_name: node_name.to_string(),
        labels: labels(&[("app", "web")]),
        requests: BTreeMap::from([("memory".to_string(), quantity("256Mi"))]),
        ..Default::default()
    }
}
