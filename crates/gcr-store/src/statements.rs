//! Named statement registry.
//!
//! Every operation the store performs is an [`Op`] with a fixed SQL text.
//! [`prepare_all`] compiles the whole set into the connection's statement
//! cache at init, so a typo in any statement fails startup instead of the
//! first call that needs it. Later lookups go through [`statement`] and hit
//! the cache.
//!
//! As-of queries pick the latest row per key with `MAX(RowID)`, since rows
//! are append-only and RowID grows with insertion order. A row counts as
//! deleted at a cutoff when its DeletionTimestamp is at or before it.

use crate::errors::{prepare_error, Result};
use rusqlite::{CachedStatement, Connection};

macro_rules! operations {
    ($($variant:ident => $name:literal, $sql:expr;)*) => {
        /// A named, prepared store operation
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Op {
            $($variant,)*
        }

        impl Op {
            /// Every registered operation, in declaration order
            pub const ALL: &'static [Op] = &[$(Op::$variant,)*];

            /// Stable operation name, used in logs and error context
            pub const fn name(self) -> &'static str {
                match self {
                    $(Op::$variant => $name,)*
                }
            }

            pub const fn sql(self) -> &'static str {
                match self {
                    $(Op::$variant => $sql,)*
                }
            }
        }
    };
}

operations! {
    // worker_pool_info
    InsertWorkerPoolInfo => "insert_worker_pool_info",
        "INSERT INTO worker_pool_info (CreationTimestamp, SnapshotTimestamp, Name, Namespace, \
         MachineType, Architecture, Minimum, Maximum, MaxSurge, MaxUnavailable, Zones, Hash, \
         DeletionTimestamp) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)";
    UpdateWorkerPoolInfoDeletionTimestamp => "update_worker_pool_info_deletion_timestamp",
        "UPDATE worker_pool_info SET DeletionTimestamp = ?1 \
         WHERE Name = ?2 AND DeletionTimestamp IS NULL";
    SelectWorkerPoolInfosBefore => "select_worker_pool_infos_before",
        "SELECT * FROM worker_pool_info WHERE RowID IN ( \
           SELECT MAX(RowID) FROM worker_pool_info WHERE SnapshotTimestamp < ?1 GROUP BY Name) \
         AND (DeletionTimestamp IS NULL OR DeletionTimestamp > ?1) \
         ORDER BY Name";
    SelectLatestWorkerPoolInfo => "select_latest_worker_pool_info",
        "SELECT * FROM worker_pool_info WHERE Name = ?1 ORDER BY RowID DESC LIMIT 1";
    CountWorkerPoolInfoWithNameAndHash => "count_worker_pool_info_with_name_and_hash",
        "SELECT COUNT(*) FROM worker_pool_info WHERE Name = ?1 AND Hash = ?2";

    // mcd_info
    InsertMcdInfo => "insert_mcd_info",
        "INSERT INTO mcd_info (CreationTimestamp, SnapshotTimestamp, Name, Namespace, Replicas, \
         PoolName, Zone, MaxSurge, MaxUnavailable, MachineClassName, Hash, DeletionTimestamp) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";
    UpdateMcdInfoDeletionTimestamp => "update_mcd_info_deletion_timestamp",
        "UPDATE mcd_info SET DeletionTimestamp = ?1 WHERE Name = ?2 AND DeletionTimestamp IS NULL";
    SelectMcdInfosBefore => "select_mcd_infos_before",
        "SELECT * FROM mcd_info WHERE RowID IN ( \
           SELECT MAX(RowID) FROM mcd_info WHERE SnapshotTimestamp < ?1 GROUP BY Name) \
         AND (DeletionTimestamp IS NULL OR DeletionTimestamp > ?1) \
         ORDER BY Name";
    SelectLatestMcdInfo => "select_latest_mcd_info",
        "SELECT * FROM mcd_info WHERE Name = ?1 ORDER BY RowID DESC LIMIT 1";
    SelectMcdInfoHash => "select_mcd_info_hash",
        "SELECT Hash FROM mcd_info WHERE Name = ?1 ORDER BY RowID DESC LIMIT 1";
    CountMcdInfoWithNameAndHash => "count_mcd_info_with_name_and_hash",
        "SELECT COUNT(*) FROM mcd_info WHERE Name = ?1 AND Hash = ?2";

    // node_info
    InsertNodeInfo => "insert_node_info",
        "INSERT INTO node_info (CreationTimestamp, SnapshotTimestamp, Name, Namespace, \
         ProviderID, AllocatableVolumes, Labels, Taints, Allocatable, Capacity, Hash, \
         DeletionTimestamp) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";
    UpdateNodeInfoDeletionTimestamp => "update_node_info_deletion_timestamp",
        "UPDATE node_info SET DeletionTimestamp = ?1 WHERE Name = ?2 AND DeletionTimestamp IS NULL";
    SelectNodeInfosBefore => "select_node_infos_before",
        "SELECT * FROM node_info WHERE CreationTimestamp < ?1 ORDER BY RowID";
    SelectLatestNodesBeforeAndNotDeleted => "select_latest_nodes_before_and_not_deleted",
        "SELECT * FROM node_info WHERE RowID IN ( \
           SELECT MAX(RowID) FROM node_info WHERE SnapshotTimestamp < ?1 GROUP BY Name) \
         AND (DeletionTimestamp IS NULL OR DeletionTimestamp > ?1) \
         ORDER BY Name";
    SelectLatestNodeInfo => "select_latest_node_info",
        "SELECT * FROM node_info WHERE Name = ?1 ORDER BY RowID DESC LIMIT 1";
    CountNodeInfoWithNameAndHash => "count_node_info_with_name_and_hash",
        "SELECT COUNT(*) FROM node_info WHERE Name = ?1 AND Hash = ?2";

    // pod_info
    InsertPodInfo => "insert_pod_info",
        "INSERT INTO pod_info (CreationTimestamp, SnapshotTimestamp, Name, Namespace, UID, \
         NodeName, NominatedNodeName, Labels, Requests, Spec, ScheduleStatus, Hash, \
         DeletionTimestamp) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)";
    UpdatePodInfoDeletionTimestamp => "update_pod_info_deletion_timestamp",
        "UPDATE pod_info SET DeletionTimestamp = ?1 WHERE UID = ?2 AND DeletionTimestamp IS NULL";
    SelectLatestPodInfo => "select_latest_pod_info",
        "SELECT * FROM pod_info WHERE UID = ?1 ORDER BY RowID DESC LIMIT 1";
    SelectLatestPodInfoWithName => "select_latest_pod_info_with_name",
        "SELECT * FROM pod_info WHERE Name = ?1 ORDER BY CreationTimestamp DESC, RowID DESC LIMIT 1";
    CountPodInfoWithUidAndHash => "count_pod_info_with_uid_and_hash",
        "SELECT COUNT(*) FROM pod_info WHERE UID = ?1 AND Hash = ?2";
    SelectUnscheduledPodsBefore => "select_unscheduled_pods_before",
        "SELECT * FROM pod_info WHERE RowID IN ( \
           SELECT MAX(RowID) FROM pod_info WHERE CreationTimestamp < ?1 GROUP BY UID) \
         AND NodeName = '' \
         AND (DeletionTimestamp IS NULL OR DeletionTimestamp > ?1) \
         ORDER BY CreationTimestamp, RowID";
    SelectScheduledPodsBefore => "select_scheduled_pods_before",
        "SELECT * FROM pod_info WHERE RowID IN ( \
           SELECT MAX(RowID) FROM pod_info WHERE SnapshotTimestamp < ?1 GROUP BY UID) \
         AND NodeName != '' \
         AND (DeletionTimestamp IS NULL OR DeletionTimestamp > ?1) \
         ORDER BY SnapshotTimestamp, RowID";
    SelectLatestPodInfosBeforeSnapshotTimestamp => "select_latest_pod_infos_before_snapshot_timestamp",
        "SELECT * FROM pod_info WHERE RowID IN ( \
           SELECT MAX(RowID) FROM pod_info WHERE SnapshotTimestamp < ?1 GROUP BY UID) \
         ORDER BY SnapshotTimestamp, RowID";

    // pdb_info
    InsertPdbInfo => "insert_pdb_info",
        "INSERT INTO pdb_info (CreationTimestamp, SnapshotTimestamp, UID, Name, Namespace, \
         Generation, MinAvailable, MaxUnavailable, Spec, Hash, DeletionTimestamp) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";
    UpdatePdbInfoDeletionTimestamp => "update_pdb_info_deletion_timestamp",
        "UPDATE pdb_info SET DeletionTimestamp = ?1 WHERE UID = ?2 AND DeletionTimestamp IS NULL";
    SelectPdbInfosBefore => "select_pdb_infos_before",
        "SELECT * FROM pdb_info WHERE RowID IN ( \
           SELECT MAX(RowID) FROM pdb_info WHERE SnapshotTimestamp < ?1 GROUP BY UID) \
         AND (DeletionTimestamp IS NULL OR DeletionTimestamp > ?1) \
         ORDER BY Namespace, Name";
    SelectLatestPdbInfo => "select_latest_pdb_info",
        "SELECT * FROM pdb_info WHERE UID = ?1 ORDER BY RowID DESC LIMIT 1";
    CountPdbInfoWithUidAndHash => "count_pdb_info_with_uid_and_hash",
        "SELECT COUNT(*) FROM pdb_info WHERE UID = ?1 AND Hash = ?2";

    // event_info
    InsertEventInfo => "insert_event_info",
        "INSERT INTO event_info (UID, EventTime, ReportingController, Reason, Message, \
         InvolvedObjectKind, InvolvedObjectName, InvolvedObjectNamespace, InvolvedObjectUID) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";
    SelectEventInfoWithUid => "select_event_info_with_uid",
        "SELECT * FROM event_info WHERE UID = ?1 ORDER BY RowID DESC LIMIT 1";
    SelectAllEventInfos => "select_all_event_infos",
        "SELECT * FROM event_info ORDER BY EventTime, RowID";
    SelectEventInfosBefore => "select_event_infos_before",
        "SELECT * FROM event_info WHERE EventTime < ?1 ORDER BY EventTime, RowID";

    // ca_settings_info
    InsertCaSettingsInfo => "insert_ca_settings_info",
        "INSERT INTO ca_settings_info (SnapshotTimestamp, Expander, MaxNodesTotal, Priorities, Hash) \
         VALUES (?1, ?2, ?3, ?4, ?5)";
    SelectLatestCaSettingsInfo => "select_latest_ca_settings_info",
        "SELECT * FROM ca_settings_info ORDER BY RowID DESC LIMIT 1";
    SelectCaSettingsInfoWithHash => "select_ca_settings_info_with_hash",
        "SELECT * FROM ca_settings_info WHERE Hash = ?1 ORDER BY RowID DESC LIMIT 1";
    CountCaSettingsInfoWithHash => "count_ca_settings_info_with_hash",
        "SELECT COUNT(*) FROM ca_settings_info WHERE Hash = ?1";
}

/// Compile every registered operation into the statement cache.
///
/// The cache is sized to hold the whole registry so no entry is evicted.
///
/// # Errors
///
/// Returns a `Prepare` error naming the first operation that fails to compile.
pub fn prepare_all(conn: &Connection) -> Result<usize> {
    conn.set_prepared_statement_cache_capacity(Op::ALL.len());
    for op in Op::ALL {
        conn.prepare_cached(op.sql())
            .map_err(|e| prepare_error(*op, e))?;
    }
    Ok(Op::ALL.len())
}

/// Fetch the compiled statement for `op` from the cache.
///
/// # Errors
///
/// Returns a `Prepare` error if the statement has to be recompiled and fails.
pub fn statement(conn: &Connection, op: Op) -> Result<CachedStatement<'_>> {
    conn.prepare_cached(op.sql()).map_err(|e| prepare_error(op, e))
}
