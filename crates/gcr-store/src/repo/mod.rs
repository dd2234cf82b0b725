//! Per-kind snapshot stores.
//!
//! Each store borrows the facade's connection and exposes the kind's
//! operation set. The operations every keyed, hashed kind shares are on
//! [`SnapshotStore`]; as-of lookups are inherent methods, since each kind
//! defines its own cutoff predicate.

pub mod ca_settings;
pub mod event;
pub mod machine_deployment;
pub mod node;
pub mod pdb;
pub mod pod;
pub mod worker_pool;

use crate::errors::Result;
use chrono::{DateTime, SecondsFormat, Utc};

pub use ca_settings::AutoscalerSettingsStore;
pub use event::EventStore;
pub use machine_deployment::MachineDeploymentStore;
pub use node::NodeStore;
pub use pdb::PdbStore;
pub use pod::PodStore;
pub use worker_pool::WorkerPoolStore;

/// Result of the dedup lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashCount {
    Found(u64),
    NotFound,
}

impl HashCount {
    pub fn count(self) -> u64 {
        match self {
            HashCount::Found(n) => n,
            HashCount::NotFound => 0,
        }
    }

    pub fn is_found(self) -> bool {
        matches!(self, HashCount::Found(_))
    }
}

impl From<u64> for HashCount {
    fn from(count: u64) -> Self {
        if count == 0 {
            HashCount::NotFound
        } else {
            HashCount::Found(count)
        }
    }
}

/// Operations shared by every keyed snapshot kind.
///
/// Rows are append-only: `store` never touches an existing row, and
/// `update_deletion_timestamp` is the only mutation.
pub trait SnapshotStore {
    type Info;

    /// Append a snapshot and return its RowID. The hash is computed when
    /// the object carries none.
    ///
    /// # Errors
    ///
    /// `Encode` if a nested attribute cannot be serialized, `Exec` if the
    /// insert fails.
    fn store(&self, info: &Self::Info) -> Result<i64>;

    /// Mark every not yet deleted row for `key` as deleted at `deleted_at`.
    /// Returns the number of rows marked.
    ///
    /// # Errors
    ///
    /// `Exec` if the update fails.
    fn update_deletion_timestamp(&self, key: &str, deleted_at: DateTime<Utc>) -> Result<usize>;

    /// The most recently inserted row for `key`.
    ///
    /// # Errors
    ///
    /// `NotFound` if nothing was ever recorded for `key`.
    fn load_latest(&self, key: &str) -> Result<Self::Info>;

    /// How many rows for `key` carry `hash`.
    ///
    /// # Errors
    ///
    /// `Scan` if the count query fails.
    fn count_with_key_and_hash(&self, key: &str, hash: &str) -> Result<HashCount>;
}

/// Log key for as-of queries.
pub(crate) fn cutoff_key(cutoff: &DateTime<Utc>) -> String {
    cutoff.to_rfc3339_opts(SecondsFormat::Millis, true)
}
