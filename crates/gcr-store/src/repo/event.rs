//! Cluster events (`event_info`).
//!
//! Events are recorded once and never deleted or deduplicated, so this
//! store has no hash or deletion operations.

use super::cutoff_key;
use crate::errors::Result;
use crate::mapping::{insert_row, instrumented, query_many, query_one, Param, SnapshotRow};
use crate::statements::Op;
use chrono::{DateTime, Utc};
use gcr_core::codec::{millis_to_timestamp, timestamp_to_millis};
use gcr_core::errors::CodecError;
use gcr_core::EventInfo;
use rusqlite::{Connection, Row};

pub(crate) struct EventRow {
    uid: String,
    event_time: i64,
    reporting_controller: String,
    reason: String,
    message: String,
    involved_object_kind: String,
    involved_object_name: String,
    involved_object_namespace: String,
    involved_object_uid: String,
}

impl SnapshotRow for EventRow {
    type Info = EventInfo;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uid: row.get("UID")?,
            event_time: row.get("EventTime")?,
            reporting_controller: row.get("ReportingController")?,
            reason: row.get("Reason")?,
            message: row.get("Message")?,
            involved_object_kind: row.get("InvolvedObjectKind")?,
            involved_object_name: row.get("InvolvedObjectName")?,
            involved_object_namespace: row.get("InvolvedObjectNamespace")?,
            involved_object_uid: row.get("InvolvedObjectUID")?,
        })
    }

    fn into_info(self) -> std::result::Result<EventInfo, CodecError> {
        Ok(EventInfo {
            uid: self.uid,
            event_time: millis_to_timestamp("EventTime", self.event_time)?,
            reporting_controller: self.reporting_controller,
            reason: self.reason,
            message: self.message,
            involved_object_kind: self.involved_object_kind,
            involved_object_name: self.involved_object_name,
            involved_object_namespace: self.involved_object_namespace,
            involved_object_uid: self.involved_object_uid,
        })
    }

    fn from_info(info: &EventInfo) -> std::result::Result<Self, CodecError> {
        Ok(Self {
            uid: info.uid.clone(),
            event_time: timestamp_to_millis(&info.event_time),
            reporting_controller: info.reporting_controller.clone(),
            reason: info.reason.clone(),
            message: info.message.clone(),
            involved_object_kind: info.involved_object_kind.clone(),
            involved_object_name: info.involved_object_name.clone(),
            involved_object_namespace: info.involved_object_namespace.clone(),
            involved_object_uid: info.involved_object_uid.clone(),
        })
    }

    fn insert_params(&self) -> Vec<Param<'_>> {
        vec![
            Param::Text(&self.uid),
            Param::Int(self.event_time),
            Param::Text(&self.reporting_controller),
            Param::Text(&self.reason),
            Param::Text(&self.message),
            Param::Text(&self.involved_object_kind),
            Param::Text(&self.involved_object_name),
            Param::Text(&self.involved_object_namespace),
            Param::Text(&self.involved_object_uid),
        ]
    }
}

const ALL_EVENTS_KEY: &str = "*";

pub struct EventStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> EventStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// # Errors
    ///
    /// `Exec` if the insert fails.
    pub fn store(&self, event: &EventInfo) -> Result<i64> {
        let op = Op::InsertEventInfo;
        instrumented(op, &event.uid, || {
            insert_row::<EventRow>(self.conn, op, &event.uid, event)
        })
    }

    /// # Errors
    ///
    /// `NotFound` if no event with `uid` was recorded.
    pub fn load_with_uid(&self, uid: &str) -> Result<EventInfo> {
        let op = Op::SelectEventInfoWithUid;
        instrumented(op, uid, || {
            query_one::<EventRow>(self.conn, op, uid, &[Param::Text(uid)])
        })
    }

    /// Every recorded event, oldest first.
    ///
    /// # Errors
    ///
    /// `NotFound` when no event was recorded.
    pub fn load_all(&self) -> Result<Vec<EventInfo>> {
        let op = Op::SelectAllEventInfos;
        instrumented(op, ALL_EVENTS_KEY, || {
            query_many::<EventRow>(self.conn, op, ALL_EVENTS_KEY, &[])
        })
    }

    /// Events that happened before `cutoff`, oldest first.
    ///
    /// # Errors
    ///
    /// `NotFound` when no event qualifies.
    pub fn load_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<EventInfo>> {
        let op = Op::SelectEventInfosBefore;
        let key = cutoff_key(&cutoff);
        instrumented(op, &key, || {
            query_many::<EventRow>(self.conn, op, &key, &[Param::Timestamp(cutoff)])
        })
    }
}
