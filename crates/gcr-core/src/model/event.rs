use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cluster event. Events are immutable once emitted, so they carry no
/// hash and are never soft-deleted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventInfo {
    /// Natural key
    pub uid: String,
    pub event_time: DateTime<Utc>,
    pub reporting_controller: String,
    pub reason: String,
    pub message: String,
    pub involved_object_kind: String,
    pub involved_object_name: String,
    pub involved_object_namespace: String,
    pub involved_object_uid: String,
}
