use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cluster-autoscaler deployment settings.
///
/// There is a single autoscaler per cluster, so the content hash is the only
/// key distinguishing one recorded configuration from another.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AutoscalerSettingsInfo {
    pub snapshot_timestamp: DateTime<Utc>,
    pub expander: String,
    pub max_nodes_total: i32,
    /// Raw priority-expander configuration
    pub priorities: String,

    /// Content hash; empty until computed
    pub hash: String,
}
