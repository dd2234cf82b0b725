//! Node snapshots (`node_info`).

use super::{cutoff_key, HashCount, SnapshotStore};
use crate::errors::Result;
use crate::mapping::{
    execute, insert_row, instrumented, query_count, query_many, query_one, Param, SnapshotRow,
};
use crate::statements::Op;
use chrono::{DateTime, Utc};
use gcr_core::codec::{
    labels_from_text, labels_to_text, millis_to_timestamp, optional_millis_to_timestamp,
    resources_from_text, resources_to_text, taints_from_text, taints_to_text,
    timestamp_to_millis,
};
use gcr_core::errors::CodecError;
use gcr_core::model::node::LAST_APPLIED_LABELS_TAINTS;
use gcr_core::{ContentHash, NodeInfo};
use rusqlite::{Connection, Row};

pub(crate) struct NodeRow {
    creation_timestamp: i64,
    snapshot_timestamp: i64,
    deletion_timestamp: Option<i64>,
    name: String,
    namespace: String,
    provider_id: String,
    allocatable_volumes: i32,
    labels: String,
    taints: String,
    allocatable: String,
    capacity: String,
    hash: String,
}

impl SnapshotRow for NodeRow {
    type Info = NodeInfo;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            creation_timestamp: row.get("CreationTimestamp")?,
            snapshot_timestamp: row.get("SnapshotTimestamp")?,
            deletion_timestamp: row.get("DeletionTimestamp")?,
            name: row.get("Name")?,
            namespace: row.get("Namespace")?,
            provider_id: row.get("ProviderID")?,
            allocatable_volumes: row.get("AllocatableVolumes")?,
            labels: row.get("Labels")?,
            taints: row.get("Taints")?,
            allocatable: row.get("Allocatable")?,
            capacity: row.get("Capacity")?,
            hash: row.get("Hash")?,
        })
    }

    fn into_info(self) -> std::result::Result<NodeInfo, CodecError> {
        Ok(NodeInfo {
            creation_timestamp: millis_to_timestamp("CreationTimestamp", self.creation_timestamp)?,
            snapshot_timestamp: millis_to_timestamp("SnapshotTimestamp", self.snapshot_timestamp)?,
            deletion_timestamp: optional_millis_to_timestamp(
                "DeletionTimestamp",
                self.deletion_timestamp,
            )?,
            name: self.name,
            namespace: self.namespace,
            provider_id: self.provider_id,
            allocatable_volumes: self.allocatable_volumes,
            labels: labels_from_text(&self.labels)?,
            taints: taints_from_text(&self.taints)?,
            allocatable: resources_from_text("Allocatable", &self.allocatable)?,
            capacity: resources_from_text("Capacity", &self.capacity)?,
            hash: self.hash,
        })
    }

    fn from_info(info: &NodeInfo) -> std::result::Result<Self, CodecError> {
        Ok(Self {
            creation_timestamp: timestamp_to_millis(&info.creation_timestamp),
            snapshot_timestamp: timestamp_to_millis(&info.snapshot_timestamp),
            deletion_timestamp: info.deletion_timestamp.as_ref().map(timestamp_to_millis),
            name: info.name.clone(),
            namespace: info.namespace.clone(),
            provider_id: info.provider_id.clone(),
            allocatable_volumes: info.allocatable_volumes,
            labels: labels_to_text(&info.labels)?,
            taints: taints_to_text(&info.taints)?,
            allocatable: resources_to_text("Allocatable", &info.allocatable)?,
            capacity: resources_to_text("Capacity", &info.capacity)?,
            hash: info.hash_or_compute()?,
        })
    }

    fn insert_params(&self) -> Vec<Param<'_>> {
        vec![
            Param::Int(self.creation_timestamp),
            Param::Int(self.snapshot_timestamp),
            Param::Text(&self.name),
            Param::Text(&self.namespace),
            Param::Text(&self.provider_id),
            Param::Int(i64::from(self.allocatable_volumes)),
            Param::Text(&self.labels),
            Param::Text(&self.taints),
            Param::Text(&self.allocatable),
            Param::Text(&self.capacity),
            Param::Text(&self.hash),
            Param::OptionalInt(self.deletion_timestamp),
        ]
    }
}

/// Node snapshots keyed by node name.
pub struct NodeStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> NodeStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Every recorded row for nodes created before `cutoff`, deleted or
    /// not, in insertion order.
    ///
    /// # Errors
    ///
    /// `NotFound` when no such row exists.
    pub fn load_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<NodeInfo>> {
        let op = Op::SelectNodeInfosBefore;
        let key = cutoff_key(&cutoff);
        instrumented(op, &key, || {
            query_many::<NodeRow>(self.conn, op, &key, &[Param::Timestamp(cutoff)])
        })
    }

    /// The latest snapshot per node taken before `cutoff`, leaving out
    /// nodes already deleted at `cutoff`. Empty when no node qualifies.
    ///
    /// # Errors
    ///
    /// `Scan` or `Decode` if a row cannot be mapped.
    pub fn latest_not_deleted_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<NodeInfo>> {
        let op = Op::SelectLatestNodesBeforeAndNotDeleted;
        let key = cutoff_key(&cutoff);
        instrumented(op, &key, || {
            match query_many::<NodeRow>(self.conn, op, &key, &[Param::Timestamp(cutoff)]) {
                Err(err) if err.is_not_found() => Ok(Vec::new()),
                other => other,
            }
        })
    }
}

impl SnapshotStore for NodeStore<'_> {
    type Info = NodeInfo;

    /// The machine-controller's last-applied label is dropped before the
    /// row is written. The node hash never covers it, so the stored hash
    /// matches the hash of the live node.
    fn store(&self, info: &NodeInfo) -> Result<i64> {
        let op = Op::InsertNodeInfo;
        instrumented(op, &info.name, || {
            if info.labels.contains_key(LAST_APPLIED_LABELS_TAINTS) {
                let mut trimmed = info.clone();
                trimmed.labels.remove(LAST_APPLIED_LABELS_TAINTS);
                insert_row::<NodeRow>(self.conn, op, &info.name, &trimmed)
            } else {
                insert_row::<NodeRow>(self.conn, op, &info.name, info)
            }
        })
    }

    fn update_deletion_timestamp(&self, name: &str, deleted_at: DateTime<Utc>) -> Result<usize> {
        let op = Op::UpdateNodeInfoDeletionTimestamp;
        instrumented(op, name, || {
            execute(
                self.conn,
                op,
                name,
                &[Param::Timestamp(deleted_at), Param::Text(name)],
            )
        })
    }

    fn load_latest(&self, name: &str) -> Result<NodeInfo> {
        let op = Op::SelectLatestNodeInfo;
        instrumented(op, name, || {
            query_one::<NodeRow>(self.conn, op, name, &[Param::Text(name)])
        })
    }

    fn count_with_key_and_hash(&self, name: &str, hash: &str) -> Result<HashCount> {
        let op = Op::CountNodeInfoWithNameAndHash;
        instrumented(op, name, || {
            query_count(self.conn, op, name, &[Param::Text(name), Param::Text(hash)])
                .map(HashCount::from)
        })
    }
}
