use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::PodSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ResourceList;
use crate::errors::CodecError;

/// Scheduling outcome as last observed by the collector.
///
/// Persisted as its integer discriminant in the `ScheduleStatus` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PodScheduleStatus {
    #[default]
    Unknown,
    Scheduled,
    Unschedulable,
    Nominated,
}

impl PodScheduleStatus {
    pub fn as_i32(self) -> i32 {
        match self {
            PodScheduleStatus::Unknown => 0,
            PodScheduleStatus::Scheduled => 1,
            PodScheduleStatus::Unschedulable => -1,
            PodScheduleStatus::Nominated => 2,
        }
    }
}

impl TryFrom<i32> for PodScheduleStatus {
    type Error = CodecError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PodScheduleStatus::Unknown),
            1 => Ok(PodScheduleStatus::Scheduled),
            -1 => Ok(PodScheduleStatus::Unschedulable),
            2 => Ok(PodScheduleStatus::Nominated),
            other => Err(CodecError::Decode {
                field: "ScheduleStatus",
                text: other.to_string(),
                reason: "unknown schedule status".to_string(),
            }),
        }
    }
}

/// Observed state of a pod.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PodInfo {
    pub creation_timestamp: DateTime<Utc>,
    pub snapshot_timestamp: DateTime<Utc>,
    pub deletion_timestamp: Option<DateTime<Utc>>,

    pub name: String,
    pub namespace: String,
    /// Natural key
    pub uid: String,
    pub node_name: String,
    pub nominated_node_name: String,
    pub labels: BTreeMap<String, String>,
    pub requests: ResourceList,
    pub spec: PodSpec,
    pub schedule_status: PodScheduleStatus,

    /// Content hash; empty until computed
    pub hash: String,
}

impl PodInfo {
    /// A pod counts as scheduled once it is bound to a node.
    pub fn is_scheduled(&self) -> bool {
        !self.node_name.is_empty()
    }
}
