use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Taint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ResourceList;

/// Label written by machine-controller-manager that duplicates the node's
/// labels, annotations and taints. Never persisted.
pub const LAST_APPLIED_LABELS_TAINTS: &str = "node.machine.sapcloud.io/last-applied-anno-labels-taints";

/// Observed state of a cluster node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeInfo {
    pub creation_timestamp: DateTime<Utc>,
    pub snapshot_timestamp: DateTime<Utc>,
    pub deletion_timestamp: Option<DateTime<Utc>>,

    /// Natural key
    pub name: String,
    pub namespace: String,
    pub provider_id: String,
    pub allocatable_volumes: i32,
    pub labels: BTreeMap<String, String>,
    pub taints: Vec<Taint>,
    pub allocatable: ResourceList,
    pub capacity: ResourceList,

    /// Content hash; empty until computed
    pub hash: String,
}
