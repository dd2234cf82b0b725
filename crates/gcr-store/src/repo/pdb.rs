//! Pod disruption budget snapshots (`pdb_info`).

use super::{cutoff_key, HashCount, SnapshotStore};
use crate::errors::Result;
use crate::mapping::{
    execute, insert_row, instrumented, query_count, query_many, query_one, Param, SnapshotRow,
};
use crate::statements::Op;
use chrono::{DateTime, Utc};
use gcr_core::codec::{
    int_or_string_from_text, int_or_string_to_text, millis_to_timestamp,
    optional_millis_to_timestamp, pdb_spec_from_text, pdb_spec_to_text, timestamp_to_millis,
};
use gcr_core::errors::CodecError;
use gcr_core::{ContentHash, PodDisruptionBudgetInfo};
use rusqlite::{Connection, Row};

pub(crate) struct PdbRow {
    creation_timestamp: i64,
    snapshot_timestamp: i64,
    deletion_timestamp: Option<i64>,
    uid: String,
    name: String,
    namespace: String,
    generation: i64,
    min_available: String,
    max_unavailable: String,
    spec: String,
    hash: String,
}

impl SnapshotRow for PdbRow {
    type Info = PodDisruptionBudgetInfo;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            creation_timestamp: row.get("CreationTimestamp")?,
            snapshot_timestamp: row.get("SnapshotTimestamp")?,
            deletion_timestamp: row.get("DeletionTimestamp")?,
            uid: row.get("UID")?,
            name: row.get("Name")?,
            namespace: row.get("Namespace")?,
            generation: row.get("Generation")?,
            min_available: row.get("MinAvailable")?,
            max_unavailable: row.get("MaxUnavailable")?,
            spec: row.get("Spec")?,
            hash: row.get("Hash")?,
        })
    }

    fn into_info(self) -> std::result::Result<PodDisruptionBudgetInfo, CodecError> {
        Ok(PodDisruptionBudgetInfo {
            creation_timestamp: millis_to_timestamp("CreationTimestamp", self.creation_timestamp)?,
            snapshot_timestamp: millis_to_timestamp("SnapshotTimestamp", self.snapshot_timestamp)?,
            deletion_timestamp: optional_millis_to_timestamp(
                "DeletionTimestamp",
                self.deletion_timestamp,
            )?,
            uid: self.uid,
            name: self.name,
            namespace: self.namespace,
            generation: self.generation,
            min_available: int_or_string_from_text("MinAvailable", &self.min_available)?,
            max_unavailable: int_or_string_from_text("MaxUnavailable", &self.max_unavailable)?,
            spec: pdb_spec_from_text(&self.spec)?,
            hash: self.hash,
        })
    }

    fn from_info(info: &PodDisruptionBudgetInfo) -> std::result::Result<Self, CodecError> {
        Ok(Self {
            creation_timestamp: timestamp_to_millis(&info.creation_timestamp),
            snapshot_timestamp: timestamp_to_millis(&info.snapshot_timestamp),
            deletion_timestamp: info.deletion_timestamp.as_ref().map(timestamp_to_millis),
            uid: info.uid.clone(),
            name: info.name.clone(),
            namespace: info.namespace.clone(),
            generation: info.generation,
            min_available: int_or_string_to_text("MinAvailable", info.min_available.as_ref())?,
            max_unavailable: int_or_string_to_text(
                "MaxUnavailable",
                info.max_unavailable.as_ref(),
            )?,
            spec: pdb_spec_to_text(&info.spec)?,
            hash: info.hash_or_compute()?,
        })
    }

    fn insert_params(&self) -> Vec<Param<'_>> {
        vec![
            Param::Int(self.creation_timestamp),
            Param::Int(self.snapshot_timestamp),
            Param::Text(&self.uid),
            Param::Text(&self.name),
            Param::Text(&self.namespace),
            Param::Int(self.generation),
            Param::Text(&self.min_available),
            Param::Text(&self.max_unavailable),
            Param::Text(&self.spec),
            Param::Text(&self.hash),
            Param::OptionalInt(self.deletion_timestamp),
        ]
    }
}

/// Pod disruption budget snapshots keyed by UID.
pub struct PdbStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> PdbStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// The latest snapshot per budget taken before `cutoff`, leaving out
    /// budgets already deleted at `cutoff`.
    ///
    /// # Errors
    ///
    /// `NotFound` when no budget qualifies.
    pub fn load_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<PodDisruptionBudgetInfo>> {
        let op = Op::SelectPdbInfosBefore;
        let key = cutoff_key(&cutoff);
        instrumented(op, &key, || {
            query_many::<PdbRow>(self.conn, op, &key, &[Param::Timestamp(cutoff)])
        })
    }
}

impl SnapshotStore for PdbStore<'_> {
    type Info = PodDisruptionBudgetInfo;

    fn store(&self, info: &PodDisruptionBudgetInfo) -> Result<i64> {
        let op = Op::InsertPdbInfo;
        instrumented(op, &info.uid, || {
            insert_row::<PdbRow>(self.conn, op, &info.uid, info)
        })
    }

    fn update_deletion_timestamp(&self, uid: &str, deleted_at: DateTime<Utc>) -> Result<usize> {
        let op = Op::UpdatePdbInfoDeletionTimestamp;
        instrumented(op, uid, || {
            execute(
                self.conn,
                op,
                uid,
                &[Param::Timestamp(deleted_at), Param::Text(uid)],
            )
        })
    }

    fn load_latest(&self, uid: &str) -> Result<PodDisruptionBudgetInfo> {
        let op = Op::SelectLatestPdbInfo;
        instrumented(op, uid, || {
            query_one::<PdbRow>(self.conn, op, uid, &[Param::Text(uid)])
        })
    }

    fn count_with_key_and_hash(&self, uid: &str, hash: &str) -> Result<HashCount> {
        let op = Op::CountPdbInfoWithUidAndHash;
        instrumented(op, uid, || {
            query_count(self.conn, op, uid, &[Param::Text(uid), Param::Text(hash)])
                .map(HashCount::from)
        })
    }
}
