//! Row mapping layer.
//!
//! Bridges flat `*_info` rows and the rich domain types in `gcr_core::model`.
//! Each kind has a row struct implementing [`SnapshotRow`]: `from_info`
//! encodes nested attributes and timestamps into column values,
//! `into_info` decodes them back. The query primitives below are generic
//! over that trait and resolve their SQL through the [`Op`] registry.
//!
//! Zero rows is always `NotFound` for [`query_one`] and [`query_many`]; a
//! caller that wants "nothing recorded" to read as empty maps it itself.

use crate::errors::{codec_error, exec_error, not_found, scan_error, Result};
use crate::statements::{statement, Op};
use chrono::{DateTime, Utc};
use gcr_core::codec::timestamp_to_millis;
use gcr_core::errors::CodecError;
use gcr_core::{log_op_end, log_op_error, log_op_start};
use rusqlite::types::{Null, ToSqlOutput};
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row, ToSql};
use std::time::Instant;

/// Bidirectional adapter between a persisted row and its domain object.
pub trait SnapshotRow: Sized {
    type Info;

    /// Read the row's columns by name.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Decode nested attributes and timestamps into the domain object.
    fn into_info(self) -> std::result::Result<Self::Info, CodecError>;

    /// Encode a domain object for insertion, computing its hash if unset.
    fn from_info(info: &Self::Info) -> std::result::Result<Self, CodecError>;

    /// Values for the kind's insert statement, in placeholder order.
    fn insert_params(&self) -> Vec<Param<'_>>;
}

/// A bound statement parameter.
///
/// Timestamps always bind as milliseconds since the Unix epoch, UTC.
#[derive(Debug, Clone, PartialEq)]
pub enum Param<'a> {
    Text(&'a str),
    Int(i64),
    OptionalInt(Option<i64>),
    Timestamp(DateTime<Utc>),
}

impl ToSql for Param<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Param::Text(text) => text.to_sql(),
            Param::Int(n) => Ok(ToSqlOutput::from(*n)),
            Param::OptionalInt(Some(n)) => Ok(ToSqlOutput::from(*n)),
            Param::OptionalInt(None) => Ok(ToSqlOutput::from(Null)),
            Param::Timestamp(ts) => Ok(ToSqlOutput::from(timestamp_to_millis(ts))),
        }
    }
}

/// Run `f` bracketed by start/end log events for `op`.
pub(crate) fn instrumented<T>(op: Op, key: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let started = Instant::now();
    log_op_start!(op.name(), key = key);

    let result = f();
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    match &result {
        Ok(_) => {
            log_op_end!(op.name(), duration_ms = duration_ms, key = key);
        }
        Err(err) => {
            log_op_error!(op.name(), err, duration_ms = duration_ms, key = key);
        }
    }
    result
}

fn decode_row<R: SnapshotRow>(op: Op, key: &str, row: &Row<'_>) -> Result<R::Info> {
    R::from_row(row)
        .map_err(|e| scan_error(op, key, e))?
        .into_info()
        .map_err(|e| codec_error(op, key, e))
}

/// Fetch exactly one domain object.
///
/// # Errors
///
/// `NotFound` on zero rows, `Scan` on a column mismatch, `Decode` when a
/// nested column cannot be decoded.
pub fn query_one<R: SnapshotRow>(
    conn: &Connection,
    op: Op,
    key: &str,
    params: &[Param<'_>],
) -> Result<R::Info> {
    let mut stmt = statement(conn, op)?;
    let mut rows = stmt
        .query(params_from_iter(params.iter()))
        .map_err(|e| scan_error(op, key, e))?;
    match rows.next().map_err(|e| scan_error(op, key, e))? {
        Some(row) => decode_row::<R>(op, key, row),
        None => Err(not_found(op, key)),
    }
}

/// Fetch every matching domain object, in the statement's order.
///
/// # Errors
///
/// Same as [`query_one`]; zero rows is `NotFound`.
pub fn query_many<R: SnapshotRow>(
    conn: &Connection,
    op: Op,
    key: &str,
    params: &[Param<'_>],
) -> Result<Vec<R::Info>> {
    let mut stmt = statement(conn, op)?;
    let mut rows = stmt
        .query(params_from_iter(params.iter()))
        .map_err(|e| scan_error(op, key, e))?;

    let mut infos = Vec::new();
    while let Some(row) = rows.next().map_err(|e| scan_error(op, key, e))? {
        infos.push(decode_row::<R>(op, key, row)?);
    }

    if infos.is_empty() {
        return Err(not_found(op, key));
    }
    Ok(infos)
}

/// Run a `SELECT COUNT(*)` operation.
///
/// # Errors
///
/// `Scan` if the query fails.
pub fn query_count(conn: &Connection, op: Op, key: &str, params: &[Param<'_>]) -> Result<u64> {
    let mut stmt = statement(conn, op)?;
    let count: i64 = stmt
        .query_row(params_from_iter(params.iter()), |row| row.get(0))
        .map_err(|e| scan_error(op, key, e))?;
    Ok(u64::try_from(count).unwrap_or(0))
}

/// Run a single-column text lookup; `None` when no row matches.
///
/// # Errors
///
/// `Scan` if the query fails.
pub fn query_text(
    conn: &Connection,
    op: Op,
    key: &str,
    params: &[Param<'_>],
) -> Result<Option<String>> {
    let mut stmt = statement(conn, op)?;
    stmt.query_row(params_from_iter(params.iter()), |row| row.get(0))
        .optional()
        .map_err(|e| scan_error(op, key, e))
}

/// Encode and append one row, returning its RowID.
///
/// # Errors
///
/// `Encode` if a nested attribute cannot be serialized, `Exec` if the
/// insert fails.
pub fn insert_row<R: SnapshotRow>(
    conn: &Connection,
    op: Op,
    key: &str,
    info: &R::Info,
) -> Result<i64> {
    let row = R::from_info(info).map_err(|e| codec_error(op, key, e))?;
    let mut stmt = statement(conn, op)?;
    stmt.insert(params_from_iter(row.insert_params().iter()))
        .map_err(|e| exec_error(op, key, e))
}

/// Run an update, returning the number of rows changed.
///
/// # Errors
///
/// `Exec` if the statement fails.
pub fn execute(conn: &Connection, op: Op, key: &str, params: &[Param<'_>]) -> Result<usize> {
    let mut stmt = statement(conn, op)?;
    stmt.execute(params_from_iter(params.iter()))
        .map_err(|e| exec_error(op, key, e))
}
