use chrono::{DateTime, Utc};
use k8s_openapi::api::policy::v1::PodDisruptionBudgetSpec;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::{Deserialize, Serialize};

/// Observed state of a pod disruption budget.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PodDisruptionBudgetInfo {
    pub creation_timestamp: DateTime<Utc>,
    pub snapshot_timestamp: DateTime<Utc>,
    pub deletion_timestamp: Option<DateTime<Utc>>,

    /// Natural key
    pub uid: String,
    pub name: String,
    pub namespace: String,
    pub generation: i64,
    pub min_available: Option<IntOrString>,
    pub max_unavailable: Option<IntOrString>,
    pub spec: PodDisruptionBudgetSpec,

    /// Content hash; empty until computed
    pub hash: String,
}
