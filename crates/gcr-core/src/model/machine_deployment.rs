use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::{Deserialize, Serialize};

/// Observed state of a machine deployment backing one zone of a worker pool.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MachineDeploymentInfo {
    pub creation_timestamp: DateTime<Utc>,
    pub snapshot_timestamp: DateTime<Utc>,
    pub deletion_timestamp: Option<DateTime<Utc>>,

    /// Natural key
    pub name: String,
    pub namespace: String,
    pub replicas: i32,
    pub pool_name: String,
    pub zone: String,
    pub max_surge: Option<IntOrString>,
    pub max_unavailable: Option<IntOrString>,
    pub machine_class_name: String,

    /// Content hash; empty until computed
    pub hash: String,
}
