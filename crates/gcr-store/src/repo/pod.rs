//! Pod snapshots (`pod_info`).

use super::{cutoff_key, HashCount, SnapshotStore};
use crate::errors::Result;
use crate::mapping::{
    execute, insert_row, instrumented, query_count, query_many, query_one, Param, SnapshotRow,
};
use crate::statements::Op;
use chrono::{DateTime, Utc};
use gcr_core::codec::{
    labels_from_text, labels_to_text, millis_to_timestamp, optional_millis_to_timestamp,
    pod_spec_from_text, pod_spec_to_text, resources_from_text, resources_to_text,
    timestamp_to_millis,
};
use gcr_core::errors::CodecError;
use gcr_core::{ContentHash, PodInfo, PodScheduleStatus};
use rusqlite::{Connection, Row};

pub(crate) struct PodRow {
    creation_timestamp: i64,
    snapshot_timestamp: i64,
    deletion_timestamp: Option<i64>,
    name: String,
    namespace: String,
    uid: String,
    node_name: String,
    nominated_node_name: String,
    labels: String,
    requests: String,
    spec: String,
    schedule_status: i32,
    hash: String,
}

impl SnapshotRow for PodRow {
    type Info = PodInfo;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            creation_timestamp: row.get("CreationTimestamp")?,
            snapshot_timestamp: row.get("SnapshotTimestamp")?,
            deletion_timestamp: row.get("DeletionTimestamp")?,
            name: row.get("Name")?,
            namespace: row.get("Namespace")?,
            uid: row.get("UID")?,
            node_name: row.get("NodeName")?,
            nominated_node_name: row.get("NominatedNodeName")?,
            labels: row.get("Labels")?,
            requests: row.get("Requests")?,
            spec: row.get("Spec")?,
            schedule_status: row.get("ScheduleStatus")?,
            hash: row.get("Hash")?,
        })
    }

    fn into_info(self) -> std::result::Result<PodInfo, CodecError> {
        Ok(PodInfo {
            creation_timestamp: millis_to_timestamp("CreationTimestamp", self.creation_timestamp)?,
            snapshot_timestamp: millis_to_timestamp("SnapshotTimestamp", self.snapshot_timestamp)?,
            deletion_timestamp: optional_millis_to_timestamp(
                "DeletionTimestamp",
                self.deletion_timestamp,
            )?,
            name: self.name,
            namespace: self.namespace,
            uid: self.uid,
            node_name: self.node_name,
            nominated_node_name: self.nominated_node_name,
            labels: labels_from_text(&self.labels)?,
            requests: resources_from_text("Requests", &self.requests)?,
            spec: pod_spec_from_text(&self.spec)?,
            schedule_status: PodScheduleStatus::try_from(self.schedule_status)?,
            hash: self.hash,
        })
    }

    fn from_info(info: &PodInfo) -> std::result::Result<Self, CodecError> {
        Ok(Self {
            creation_timestamp: timestamp_to_millis(&info.creation_timestamp),
            snapshot_timestamp: timestamp_to_millis(&info.snapshot_timestamp),
            deletion_timestamp: info.deletion_timestamp.as_ref().map(timestamp_to_millis),
            name: info.name.clone(),
            namespace: info.namespace.clone(),
            uid: info.uid.clone(),
            node_name: info.node_name.clone(),
            nominated_node_name: info.nominated_node_name.clone(),
            labels: labels_to_text(&info.labels)?,
            requests: resources_to_text("Requests", &info.requests)?,
            spec: pod_spec_to_text(&info.spec)?,
            schedule_status: info.schedule_status.as_i32(),
            hash: info.hash_or_compute()?,
        })
    }

    fn insert_params(&self) -> Vec<Param<'_>> {
        vec![
            Param::Int(self.creation_timestamp),
            Param::Int(self.snapshot_timestamp),
            Param::Text(&self.name),
            Param::Text(&self.namespace),
            Param::Text(&self.uid),
            Param::Text(&self.node_name),
            Param::Text(&self.nominated_node_name),
            Param::Text(&self.labels),
            Param::Text(&self.requests),
            Param::Text(&self.spec),
            Param::Int(i64::from(self.schedule_status)),
            Param::Text(&self.hash),
            Param::OptionalInt(self.deletion_timestamp),
        ]
    }
}

/// Pod snapshots keyed by UID.
///
/// Pod names are reused across recreations, so deletion and dedup go by
/// UID. [`PodStore::load_latest_with_name`] still answers by name.
pub struct PodStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> PodStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// The newest pod carrying `name`, by creation time.
    ///
    /// # Errors
    ///
    /// `NotFound` if no pod with that name was recorded.
    pub fn load_latest_with_name(&self, name: &str) -> Result<PodInfo> {
        let op = Op::SelectLatestPodInfoWithName;
        instrumented(op, name, || {
            query_one::<PodRow>(self.conn, op, name, &[Param::Text(name)])
        })
    }

    /// Pods created before `cutoff` whose latest snapshot has no node,
    /// leaving out pods already deleted at `cutoff`. Oldest first.
    ///
    /// # Errors
    ///
    /// `NotFound` when no pod qualifies.
    pub fn unscheduled_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<PodInfo>> {
        let op = Op::SelectUnscheduledPodsBefore;
        let key = cutoff_key(&cutoff);
        instrumented(op, &key, || {
            query_many::<PodRow>(self.conn, op, &key, &[Param::Timestamp(cutoff)])
        })
    }

    /// Pods whose latest snapshot before `cutoff` is bound to a node,
    /// leaving out pods already deleted at `cutoff`.
    ///
    /// # Errors
    ///
    /// `NotFound` when no pod qualifies.
    pub fn scheduled_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<PodInfo>> {
        let op = Op::SelectScheduledPodsBefore;
        let key = cutoff_key(&cutoff);
        instrumented(op, &key, || {
            query_many::<PodRow>(self.conn, op, &key, &[Param::Timestamp(cutoff)])
        })
    }

    /// The latest snapshot per pod taken before `cutoff`, deleted or not.
    ///
    /// # Errors
    ///
    /// `NotFound` when nothing was recorded before `cutoff`.
    pub fn latest_before_snapshot_time(&self, cutoff: DateTime<Utc>) -> Result<Vec<PodInfo>> {
        let op = Op::SelectLatestPodInfosBeforeSnapshotTimestamp;
        let key = cutoff_key(&cutoff);
        instrumented(op, &key, || {
            query_many::<PodRow>(self.conn, op, &key, &[Param::Timestamp(cutoff)])
        })
    }
}

impl SnapshotStore for PodStore<'_> {
    type Info = PodInfo;

    fn store(&self, info: &PodInfo) -> Result<i64> {
        let op = Op::InsertPodInfo;
        instrumented(op, &info.uid, || {
            insert_row::<PodRow>(self.conn, op, &info.uid, info)
        })
    }

    fn update_deletion_timestamp(&self, uid: &str, deleted_at: DateTime<Utc>) -> Result<usize> {
        let op = Op::UpdatePodInfoDeletionTimestamp;
        instrumented(op, uid, || {
            execute(
                self.conn,
                op,
                uid,
                &[Param::Timestamp(deleted_at), Param::Text(uid)],
            )
        })
    }

    fn load_latest(&self, uid: &str) -> Result<PodInfo> {
        let op = Op::SelectLatestPodInfo;
        instrumented(op, uid, || {
            query_one::<PodRow>(self.conn, op, uid, &[Param::Text(uid)])
        })
    }

    fn count_with_key_and_hash(&self, uid: &str, hash: &str) -> Result<HashCount> {
        let op = Op::CountPodInfoWithUidAndHash;
        instrumented(op, uid, || {
            query_count(self.conn, op, uid, &[Param::Text(uid), Param::Text(hash)])
                .map(HashCount::from)
        })
    }
}
