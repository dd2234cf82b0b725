//! Worker pool snapshots (`worker_pool_info`).

use super::{cutoff_key, HashCount, SnapshotStore};
use crate::errors::Result;
use crate::mapping::{
    execute, insert_row, instrumented, query_count, query_many, query_one, Param, SnapshotRow,
};
use crate::statements::Op;
use chrono::{DateTime, Utc};
use gcr_core::codec::{
    int_or_string_from_text, int_or_string_to_text, millis_to_timestamp,
    optional_millis_to_timestamp, timestamp_to_millis, zones_from_text, zones_to_text,
};
use gcr_core::errors::CodecError;
use gcr_core::{ContentHash, WorkerPoolInfo};
use rusqlite::{Connection, Row};

pub(crate) struct WorkerPoolRow {
    creation_timestamp: i64,
    snapshot_timestamp: i64,
    deletion_timestamp: Option<i64>,
    name: String,
    namespace: String,
    machine_type: String,
    architecture: String,
    minimum: i32,
    maximum: i32,
    max_surge: String,
    max_unavailable: String,
    zones: String,
    hash: String,
}

impl SnapshotRow for WorkerPoolRow {
    type Info = WorkerPoolInfo;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            creation_timestamp: row.get("CreationTimestamp")?,
            snapshot_timestamp: row.get("SnapshotTimestamp")?,
            deletion_timestamp: row.get("DeletionTimestamp")?,
            name: row.get("Name")?,
            namespace: row.get("Namespace")?,
            machine_type: row.get("MachineType")?,
            architecture: row.get("Architecture")?,
            minimum: row.get("Minimum")?,
            maximum: row.get("Maximum")?,
            max_surge: row.get("MaxSurge")?,
            max_unavailable: row.get("MaxUnavailable")?,
            zones: row.get("Zones")?,
            hash: row.get("Hash")?,
        })
    }

    fn into_info(self) -> std::result::Result<WorkerPoolInfo, CodecError> {
        Ok(WorkerPoolInfo {
            creation_timestamp: millis_to_timestamp("CreationTimestamp", self.creation_timestamp)?,
            snapshot_timestamp: millis_to_timestamp("SnapshotTimestamp", self.snapshot_timestamp)?,
            deletion_timestamp: optional_millis_to_timestamp(
                "DeletionTimestamp",
                self.deletion_timestamp,
            )?,
            name: self.name,
            namespace: self.namespace,
            machine_type: self.machine_type,
            architecture: self.architecture,
            minimum: self.minimum,
            maximum: self.maximum,
            max_surge: int_or_string_from_text("MaxSurge", &self.max_surge)?,
            max_unavailable: int_or_string_from_text("MaxUnavailable", &self.max_unavailable)?,
            zones: zones_from_text(&self.zones)?,
            hash: self.hash,
        })
    }

    fn from_info(info: &WorkerPoolInfo) -> std::result::Result<Self, CodecError> {
        Ok(Self {
            creation_timestamp: timestamp_to_millis(&info.creation_timestamp),
            snapshot_timestamp: timestamp_to_millis(&info.snapshot_timestamp),
            deletion_timestamp: info.deletion_timestamp.as_ref().map(timestamp_to_millis),
            name: info.name.clone(),
            namespace: info.namespace.clone(),
            machine_type: info.machine_type.clone(),
            architecture: info.architecture.clone(),
            minimum: info.minimum,
            maximum: info.maximum,
            max_surge: int_or_string_to_text("MaxSurge", info.max_surge.as_ref())?,
            max_unavailable: int_or_string_to_text(
                "MaxUnavailable",
                info.max_unavailable.as_ref(),
            )?,
            zones: zones_to_text(&info.zones)?,
            hash: info.hash_or_compute()?,
        })
    }

    fn insert_params(&self) -> Vec<Param<'_>> {
        vec![
            Param::Int(self.creation_timestamp),
            Param::Int(self.snapshot_timestamp),
            Param::Text(&self.name),
            Param::Text(&self.namespace),
            Param::Text(&self.machine_type),
            Param::Text(&self.architecture),
            Param::Int(i64::from(self.minimum)),
            Param::Int(i64::from(self.maximum)),
            Param::Text(&self.max_surge),
            Param::Text(&self.max_unavailable),
            Param::Text(&self.zones),
            Param::Text(&self.hash),
            Param::OptionalInt(self.deletion_timestamp),
        ]
    }
}

/// Worker pool snapshots keyed by pool name.
pub struct WorkerPoolStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> WorkerPoolStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// The latest snapshot per pool taken before `cutoff`, leaving out
    /// pools already deleted at `cutoff`. Ordered by name.
    ///
    /// # Errors
    ///
    /// `NotFound` when no pool qualifies.
    pub fn load_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<WorkerPoolInfo>> {
        let op = Op::SelectWorkerPoolInfosBefore;
        let key = cutoff_key(&cutoff);
        instrumented(op, &key, || {
            query_many::<WorkerPoolRow>(self.conn, op, &key, &[Param::Timestamp(cutoff)])
        })
    }
}

impl SnapshotStore for WorkerPoolStore<'_> {
    type Info = WorkerPoolInfo;

    fn store(&self, info: &WorkerPoolInfo) -> Result<i64> {
        let op = Op::InsertWorkerPoolInfo;
        instrumented(op, &info.name, || {
            insert_row::<WorkerPoolRow>(self.conn, op, &info.name, info)
        })
    }

    fn update_deletion_timestamp(&self, name: &str, deleted_at: DateTime<Utc>) -> Result<usize> {
        let op = Op::UpdateWorkerPoolInfoDeletionTimestamp;
        instrumented(op, name, || {
            execute(
                self.conn,
                op,
                name,
                &[Param::Timestamp(deleted_at), Param::Text(name)],
            )
        })
    }

    fn load_latest(&self, name: &str) -> Result<WorkerPoolInfo> {
        let op = Op::SelectLatestWorkerPoolInfo;
        instrumented(op, name, || {
            query_one::<WorkerPoolRow>(self.conn, op, name, &[Param::Text(name)])
        })
    }

    fn count_with_key_and_hash(&self, name: &str, hash: &str) -> Result<HashCount> {
        let op = Op::CountWorkerPoolInfoWithNameAndHash;
        instrumented(op, name, || {
            query_count(self.conn, op, name, &[Param::Text(name), Param::Text(hash)])
                .map(HashCount::from)
        })
    }
}
