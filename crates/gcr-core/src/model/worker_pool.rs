use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::{Deserialize, Serialize};

/// Sizing and placement of one worker pool of the shoot cluster.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkerPoolInfo {
    pub creation_timestamp: DateTime<Utc>,
    pub snapshot_timestamp: DateTime<Utc>,
    pub deletion_timestamp: Option<DateTime<Utc>>,

    /// Natural key
    pub name: String,
    pub namespace: String,
    pub machine_type: String,
    pub architecture: String,
    pub minimum: i32,
    pub maximum: i32,
    pub max_surge: Option<IntOrString>,
    pub max_unavailable: Option<IntOrString>,
    pub zones: Vec<String>,

    /// Content hash; empty until computed
    pub hash: String,
}
