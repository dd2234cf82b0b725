//! Machine deployment snapshots (`mcd_info`).

use super::{cutoff_key, HashCount, SnapshotStore};
use crate::errors::Result;
use crate::mapping::{
    execute, insert_row, instrumented, query_count, query_many, query_one, query_text, Param,
    SnapshotRow,
};
use crate::statements::Op;
use chrono::{DateTime, Utc};
use gcr_core::codec::{
    int_or_string_from_text, int_or_string_to_text, millis_to_timestamp,
    optional_millis_to_timestamp, timestamp_to_millis,
};
use gcr_core::errors::CodecError;
use gcr_core::{ContentHash, MachineDeploymentInfo};
use rusqlite::{Connection, Row};

pub(crate) struct MachineDeploymentRow {
    creation_timestamp: i64,
    snapshot_timestamp: i64,
    deletion_timestamp: Option<i64>,
    name: String,
    namespace: String,
    replicas: i32,
    pool_name: String,
    zone: String,
    max_surge: String,
    max_unavailable: String,
    machine_class_name: String,
    hash: String,
}

impl SnapshotRow for MachineDeploymentRow {
    type Info = MachineDeploymentInfo;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            creation_timestamp: row.get("CreationTimestamp")?,
            snapshot_timestamp: row.get("SnapshotTimestamp")?,
            deletion_timestamp: row.get("DeletionTimestamp")?,
            name: row.get("Name")?,
            namespace: row.get("Namespace")?,
            replicas: row.get("Replicas")?,
            pool_name: row.get("PoolName")?,
            zone: row.get("Zone")?,
            max_surge: row.get("MaxSurge")?,
            max_unavailable: row.get("MaxUnavailable")?,
            machine_class_name: row.get("MachineClassName")?,
            hash: row.get("Hash")?,
        })
    }

    fn into_info(self) -> std::result::Result<MachineDeploymentInfo, CodecError> {
        Ok(MachineDeploymentInfo {
            creation_timestamp: millis_to_timestamp("CreationTimestamp", self.creation_timestamp)?,
            snapshot_timestamp: millis_to_timestamp("SnapshotTimestamp", self.snapshot_timestamp)?,
            deletion_timestamp: optional_millis_to_timestamp(
                "DeletionTimestamp",
                self.deletion_timestamp,
            )?,
            name: self.name,
            namespace: self.namespace,
            replicas: self.replicas,
            pool_name: self.pool_name,
            zone: self.zone,
            max_surge: int_or_string_from_text("MaxSurge", &self.max_surge)?,
            max_unavailable: int_or_string_from_text("MaxUnavailable", &self.max_unavailable)?,
            machine_class_name: self.machine_class_name,
            hash: self.hash,
        })
    }

    fn from_info(info: &MachineDeploymentInfo) -> std::result::Result<Self, CodecError> {
        Ok(Self {
            creation_timestamp: timestamp_to_millis(&info.creation_timestamp),
            snapshot_timestamp: timestamp_to_millis(&info.snapshot_timestamp),
            deletion_timestamp: info.deletion_timestamp.as_ref().map(timestamp_to_millis),
            name: info.name.clone(),
            namespace: info.namespace.clone(),
            replicas: info.replicas,
            pool_name: info.pool_name.clone(),
            zone: info.zone.clone(),
            max_surge: int_or_string_to_text("MaxSurge", info.max_surge.as_ref())?,
            max_unavailable: int_or_string_to_text(
                "MaxUnavailable",
                info.max_unavailable.as_ref(),
            )?,
            machine_class_name: info.machine_class_name.clone(),
            hash: info.hash_or_compute()?,
        })
    }

    fn insert_params(&self) -> Vec<Param<'_>> {
        vec![
            Param::Int(self.creation_timestamp),
            Param::Int(self.snapshot_timestamp),
            Param::Text(&self.name),
            Param::Text(&self.namespace),
            Param::Int(i64::from(self.replicas)),
            Param::Text(&self.pool_name),
            Param::Text(&self.zone),
            Param::Text(&self.max_surge),
            Param::Text(&self.max_unavailable),
            Param::Text(&self.machine_class_name),
            Param::Text(&self.hash),
            Param::OptionalInt(self.deletion_timestamp),
        ]
    }
}

/// Machine deployment snapshots keyed by deployment name.
pub struct MachineDeploymentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> MachineDeploymentStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// The latest snapshot per deployment taken before `cutoff`, leaving
    /// out deployments already deleted at `cutoff`. Ordered by name.
    ///
    /// # Errors
    ///
    /// `NotFound` when no deployment qualifies.
    pub fn load_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<MachineDeploymentInfo>> {
        let op = Op::SelectMcdInfosBefore;
        let key = cutoff_key(&cutoff);
        instrumented(op, &key, || {
            query_many::<MachineDeploymentRow>(self.conn, op, &key, &[Param::Timestamp(cutoff)])
        })
    }

    /// Hash of the latest row for `name`, or an empty string if the
    /// deployment was never recorded.
    ///
    /// # Errors
    ///
    /// `Scan` if the lookup fails.
    pub fn latest_hash(&self, name: &str) -> Result<String> {
        let op = Op::SelectMcdInfoHash;
        instrumented(op, name, || {
            query_text(self.conn, op, name, &[Param::Text(name)]).map(Option::unwrap_or_default)
        })
    }
}

impl SnapshotStore for MachineDeploymentStore<'_> {
    type Info = MachineDeploymentInfo;

    fn store(&self, info: &MachineDeploymentInfo) -> Result<i64> {
        let op = Op::InsertMcdInfo;
        instrumented(op, &info.name, || {
            insert_row::<MachineDeploymentRow>(self.conn, op, &info.name, info)
        })
    }

    fn update_deletion_timestamp(&self, name: &str, deleted_at: DateTime<Utc>) -> Result<usize> {
        let op = Op::UpdateMcdInfoDeletionTimestamp;
        instrumented(op, name, || {
            execute(
                self.conn,
                op,
                name,
                &[Param::Timestamp(deleted_at), Param::Text(name)],
            )
        })
    }

    fn load_latest(&self, name: &str) -> Result<MachineDeploymentInfo> {
        let op = Op::SelectLatestMcdInfo;
        instrumented(op, name, || {
            query_one::<MachineDeploymentRow>(self.conn, op, name, &[Param::Text(name)])
        })
    }

    fn count_with_key_and_hash(&self, name: &str, hash: &str) -> Result<HashCount> {
        let op = Op::CountMcdInfoWithNameAndHash;
        instrumented(op, name, || {
            query_count(self.conn, op, name, &[Param::Text(name), Param::Text(hash)])
                .map(HashCount::from)
        })
    }
}
