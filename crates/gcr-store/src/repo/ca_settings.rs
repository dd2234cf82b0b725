//! Cluster autoscaler settings (`ca_settings_info`).
//!
//! The settings are cluster-wide, so the hash is the only key.

use super::HashCount;
use crate::errors::Result;
use crate::mapping::{insert_row, instrumented, query_count, query_one, Param, SnapshotRow};
use crate::statements::Op;
use gcr_core::codec::{millis_to_timestamp, timestamp_to_millis};
use gcr_core::errors::CodecError;
use gcr_core::{AutoscalerSettingsInfo, ContentHash};
use rusqlite::{Connection, Row};

pub(crate) struct AutoscalerSettingsRow {
    snapshot_timestamp: i64,
    expander: String,
    max_nodes_total: i32,
    priorities: String,
    hash: String,
}

impl SnapshotRow for AutoscalerSettingsRow {
    type Info = AutoscalerSettingsInfo;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            snapshot_timestamp: row.get("SnapshotTimestamp")?,
            expander: row.get("Expander")?,
            max_nodes_total: row.get("MaxNodesTotal")?,
            priorities: row.get("Priorities")?,
            hash: row.get("Hash")?,
        })
    }

    fn into_info(self) -> std::result::Result<AutoscalerSettingsInfo, CodecError> {
        Ok(AutoscalerSettingsInfo {
            snapshot_timestamp: millis_to_timestamp("SnapshotTimestamp", self.snapshot_timestamp)?,
            expander: self.expander,
            max_nodes_total: self.max_nodes_total,
            priorities: self.priorities,
            hash: self.hash,
        })
    }

    fn from_info(info: &AutoscalerSettingsInfo) -> std::result::Result<Self, CodecError> {
        Ok(Self {
            snapshot_timestamp: timestamp_to_millis(&info.snapshot_timestamp),
            expander: info.expander.clone(),
            max_nodes_total: info.max_nodes_total,
            priorities: info.priorities.clone(),
            hash: info.hash_or_compute()?,
        })
    }

    fn insert_params(&self) -> Vec<Param<'_>> {
        vec![
            Param::Int(self.snapshot_timestamp),
            Param::Text(&self.expander),
            Param::Int(i64::from(self.max_nodes_total)),
            Param::Text(&self.priorities),
            Param::Text(&self.hash),
        ]
    }
}

const LATEST_KEY: &str = "latest";

pub struct AutoscalerSettingsStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> AutoscalerSettingsStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Append a settings snapshot, computing its hash when unset.
    ///
    /// # Errors
    ///
    /// `Encode` if the hash cannot be computed, `Exec` if the insert fails.
    pub fn store(&self, settings: &AutoscalerSettingsInfo) -> Result<i64> {
        let op = Op::InsertCaSettingsInfo;
        let key = if settings.hash.is_empty() {
            LATEST_KEY
        } else {
            settings.hash.as_str()
        };
        instrumented(op, key, || {
            insert_row::<AutoscalerSettingsRow>(self.conn, op, key, settings)
        })
    }

    /// # Errors
    ///
    /// `NotFound` if no settings were ever recorded.
    pub fn load_latest(&self) -> Result<AutoscalerSettingsInfo> {
        let op = Op::SelectLatestCaSettingsInfo;
        instrumented(op, LATEST_KEY, || {
            query_one::<AutoscalerSettingsRow>(self.conn, op, LATEST_KEY, &[])
        })
    }

    /// # Errors
    ///
    /// `NotFound` if no settings with `hash` were recorded.
    pub fn load_with_hash(&self, hash: &str) -> Result<AutoscalerSettingsInfo> {
        let op = Op::SelectCaSettingsInfoWithHash;
        instrumented(op, hash, || {
            query_one::<AutoscalerSettingsRow>(self.conn, op, hash, &[Param::Text(hash)])
        })
    }

    /// # Errors
    ///
    /// `Scan` if the count query fails.
    pub fn count_with_hash(&self, hash: &str) -> Result<HashCount> {
        let op = Op::CountCaSettingsInfoWithHash;
        instrumented(op, hash, || {
            query_count(self.conn, op, hash, &[Param::Text(hash)]).map(HashCount::from)
        })
    }
}
