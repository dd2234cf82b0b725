//! Content digests for change detection.
//!
//! Each kind hashes a borrowed digest view holding its semantic fields only.
//! Row identifiers and the creation, snapshot and deletion timestamps are left
//! out, so two observations that differ only in capture time produce the same
//! digest. A node's machine-controller last-applied label is left out too,
//! matching what the node store persists. The view is serialized to
//! canonical JSON (maps are `BTreeMap`s, so key order is fixed) and hashed
//! with SHA256.
//!
//! The store never consults the digest to refuse a write; it only computes
//! it on insert when the caller left it empty. Skipping redundant snapshots
//! is up to the caller, via `count_with_key_and_hash`.

use crate::errors::CodecError;
use crate::model::node::LAST_APPLIED_LABELS_TAINTS;
use crate::model::{
    AutoscalerSettingsInfo, MachineDeploymentInfo, NodeInfo, PodDisruptionBudgetInfo, PodInfo,
    PodScheduleStatus, ResourceList, WorkerPoolInfo,
};
use k8s_openapi::api::core::v1::{PodSpec, Taint};
use k8s_openapi::api::policy::v1::PodDisruptionBudgetSpec;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Deterministic digest over an object's semantic fields.
pub trait ContentHash {
    /// Compute the hex-encoded SHA256 digest (64 characters).
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Encode` if the digest view cannot be serialized.
    fn content_hash(&self) -> Result<String, CodecError>;

    /// The hash currently carried by the object, possibly empty.
    fn stored_hash(&self) -> &str;

    /// The carried hash if set, otherwise a freshly computed one.
    ///
    /// # Errors
    ///
    /// Same as [`ContentHash::content_hash`].
    fn hash_or_compute(&self) -> Result<String, CodecError> {
        if self.stored_hash().is_empty() {
            self.content_hash()
        } else {
            Ok(self.stored_hash().to_string())
        }
    }
}

fn digest<T: Serialize>(kind: &'static str, view: &T) -> Result<String, CodecError> {
    let canonical = serde_json::to_vec(view).map_err(|e| CodecError::Encode {
        field: kind,
        reason: e.to_string(),
    })?;
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(hex::encode(hasher.finalize()))
}

#[derive(Serialize)]
struct WorkerPoolView<'a> {
    name: &'a str,
    namespace: &'a str,
    machine_type: &'a str,
    architecture: &'a str,
    minimum: i32,
    maximum: i32,
    max_surge: Option<&'a IntOrString>,
    max_unavailable: Option<&'a IntOrString>,
    zones: &'a [String],
}

impl ContentHash for WorkerPoolInfo {
    fn content_hash(&self) -> Result<String, CodecError> {
        digest(
            "WorkerPoolInfo",
            &WorkerPoolView {
                name: &self.name,
                namespace: &self.namespace,
                machine_type: &self.machine_type,
                architecture: &self.architecture,
                minimum: self.minimum,
                maximum: self.maximum,
                max_surge: self.max_surge.as_ref(),
                max_unavailable: self.max_unavailable.as_ref(),
                zones: &self.zones,
            },
        )
    }

    fn stored_hash(&self) -> &str {
        &self.hash
    }
}

#[derive(Serialize)]
struct MachineDeploymentView<'a> {
    name: &'a str,
    namespace: &'a str,
    replicas: i32,
    pool_name: &'a str,
    zone: &'a str,
    max_surge: Option<&'a IntOrString>,
    max_unavailable: Option<&'a IntOrString>,
    machine_class_name: &'a str,
}

impl ContentHash for MachineDeploymentInfo {
    fn content_hash(&self) -> Result<String, CodecError> {
        digest(
            "MachineDeploymentInfo",
            &MachineDeploymentView {
                name: &self.name,
                namespace: &self.namespace,
                replicas: self.replicas,
                pool_name: &self.pool_name,
                zone: &self.zone,
                max_surge: self.max_surge.as_ref(),
                max_unavailable: self.max_unavailable.as_ref(),
                machine_class_name: &self.machine_class_name,
            },
        )
    }

    fn stored_hash(&self) -> &str {
        &self.hash
    }
}

#[derive(Serialize)]
struct NodeView<'a> {
    name: &'a str,
    namespace: &'a str,
    provider_id: &'a str,
    allocatable_volumes: i32,
    labels: BTreeMap<&'a str, &'a str>,
    taints: &'a [Taint],
    allocatable: &'a ResourceList,
    capacity: &'a ResourceList,
}

impl ContentHash for NodeInfo {
    fn content_hash(&self) -> Result<String, CodecError> {
        digest(
            "NodeInfo",
            &NodeView {
                name: &self.name,
                namespace: &self.namespace,
                provider_id: &self.provider_id,
                allocatable_volumes: self.allocatable_volumes,
                labels: self
                    .labels
                    .iter()
                    .filter(|(k, _)| k.as_str() != LAST_APPLIED_LABELS_TAINTS)
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect(),
                taints: &self.taints,
                allocatable: &self.allocatable,
                capacity: &self.capacity,
            },
        )
    }

    fn stored_hash(&self) -> &str {
        &self.hash
    }
}

#[derive(Serialize)]
struct PodView<'a> {
    name: &'a str,
    namespace: &'a str,
    uid: &'a str,
    node_name: &'a str,
    nominated_node_name: &'a str,
    labels: &'a BTreeMap<String, String>,
    requests: &'a ResourceList,
    spec: &'a PodSpec,
    schedule_status: PodScheduleStatus,
}

impl ContentHash for PodInfo {
    fn content_hash(&self) -> Result<String, CodecError> {
        digest(
            "PodInfo",
            &PodView {
                name: &self.name,
                namespace: &self.namespace,
                uid: &self.uid,
                node_name: &self.node_name,
                nominated_node_name: &self.nominated_node_name,
                labels: &self.labels,
                requests: &self.requests,
                spec: &self.spec,
                schedule_status: self.schedule_status,
            },
        )
    }

    fn stored_hash(&self) -> &str {
        &self.hash
    }
}

#[derive(Serialize)]
struct PdbView<'a> {
    uid: &'a str,
    name: &'a str,
    namespace: &'a str,
    generation: i64,
    min_available: Option<&'a IntOrString>,
    max_unavailable: Option<&'a IntOrString>,
    spec: &'a PodDisruptionBudgetSpec,
}

impl ContentHash for PodDisruptionBudgetInfo {
    fn content_hash(&self) -> Result<String, CodecError> {
        digest(
            "PodDisruptionBudgetInfo",
            &PdbView {
                uid: &self.uid,
                name: &self.name,
                namespace: &self.namespace,
                generation: self.generation,
                min_available: self.min_available.as_ref(),
                max_unavailable: self.max_unavailable.as_ref(),
                spec: &self.spec,
            },
        )
    }

    fn stored_hash(&self) -> &str {
        &self.hash
    }
}

#[derive(Serialize)]
struct AutoscalerSettingsView<'a> {
    expander: &'a str,
    max_nodes_total: i32,
    priorities: &'a str,
}

impl ContentHash for AutoscalerSettingsInfo {
    fn content_hash(&self) -> Result<String, CodecError> {
        digest(
            "AutoscalerSettingsInfo",
            &AutoscalerSettingsView {
                expander: &self.expander,
                max_nodes_total: self.max_nodes_total,
                priorities: &self.priorities,
            },
        )
    }

    fn stored_hash(&self) -> &str {
        &self.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_hex_sha256() {
        let hash = AutoscalerSettingsInfo::default().content_hash().unwrap();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_or_compute_keeps_existing_hash() {
        let info = AutoscalerSettingsInfo {
            hash: "preset".to_string(),
            ..Default::default()
        };
        assert_eq!(info.hash_or_compute().unwrap(), "preset");
    }
}
