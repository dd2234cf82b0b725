// Test suite for pod disruption budget snapshots

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{at, labels, open_store, t0};
use gcr_core::hash::ContentHash;
use gcr_core::model::PodDisruptionBudgetInfo;
use gcr_store::{HashCount, SnapshotStore};
use k8s_openapi::api::policy::v1::PodDisruptionBudgetSpec;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

fn budget(uid: &str, generation: i64, snapshot_offset: i64) -> PodDisruptionBudgetInfo {
    let min_available = IntOrString::Int(2);
    PodDisruptionBudgetInfo {
        creation_timestamp: t0(),
        snapshot_timestamp: at(snapshot_offset),
        uid: uid.to_string(),
        name: format!("pdb-{}", uid),
        namespace: "default".to_string(),
        generation,
        min_available: Some(min_available.clone()),
        max_unavailable: None,
        spec: PodDisruptionBudgetSpec {
            min_available: Some(min_available),
            selector: Some(LabelSelector {
                match_labels: Some(labels(&[("app", "web")])),
                ..Default::default()
            }),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn test_pdb_round_trip() {
    let store = open_store();
    let pdbs = store.pdbs().unwrap();
    let b = budget("p1", 3, 1);
    pdbs.store(&b).unwrap();

    let loaded = pdbs.load_latest("p1").unwrap();
    assert_eq!(loaded.spec, b.spec);
    assert_eq!(loaded.min_available, Some(IntOrString::Int(2)));
    assert_eq!(loaded.generation, 3);
    assert_eq!(loaded.creation_timestamp, t0());
    assert_eq!(loaded.hash, b.content_hash().unwrap());
}

#[test]
fn test_pdb_load_before_latest_per_uid_not_deleted() {
    let store = open_store();
    let pdbs = store.pdbs().unwrap();
    pdbs.store(&budget("p1", 1, 1)).unwrap();
    pdbs.store(&budget("p1", 2, 3)).unwrap();
    pdbs.store(&budget("p2", 1, 2)).unwrap();

    let as_of_4: Vec<_> = pdbs
        .load_before(at(4))
        .unwrap()
        .into_iter()
        .map(|b| (b.uid, b.generation))
        .collect();
    assert_eq!(
        as_of_4,
        vec![("p1".to_string(), 2), ("p2".to_string(), 1)]
    );

    assert_eq!(pdbs.update_deletion_timestamp("p1", at(5)).unwrap(), 2);
    let as_of_6 = pdbs.load_before(at(6)).unwrap();
    assert_eq!(as_of_6.len(), 1);
    assert_eq!(as_of_6[0].uid, "p2");
}

#[test]
fn test_pdb_dedup_by_uid() {
    let store = open_store();
    let pdbs = store.pdbs().unwrap();
    let b = budget("p1", 1, 1);
    let hash = b.content_hash().unwrap();
    pdbs.store(&b).unwrap();
    pdbs.store(&budget("p1", 1, 9)).unwrap();

    assert_eq!(
        pdbs.count_with_key_and_hash("p1", &hash).unwrap(),
        HashCount::Found(2)
    );
    assert_eq!(
        pdbs.count_with_key_and_hash("p1", &budget("p1", 2, 1).content_hash().unwrap())
            .unwrap(),
        HashCount::NotFound
    );
}
