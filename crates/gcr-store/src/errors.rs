//! Error handling for gcr-store
//!
//! Wraps gcr-core ExError with store-specific helpers

use crate::statements::Op;
use gcr_core::errors::{CodecError, ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a connection error for opening or configuring the database
pub fn connection_error(target: &str, err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Connection)
        .with_op("open")
        .with_entity_id(target.to_string())
        .with_message(err.to_string())
}

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Schema)
        .with_op("migration")
        .with_entity_id(migration_id.to_string())
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::Schema)
        .with_op("migration_checksum")
        .with_entity_id(migration_id.to_string())
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create an error for a registry statement that failed to compile
pub fn prepare_error(op: Op, err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Prepare)
        .with_op(op.name())
        .with_message(err.to_string())
}

/// Create an error for a failed insert or update
pub fn exec_error(op: Op, key: &str, err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Exec)
        .with_op(op.name())
        .with_entity_id(key.to_string())
        .with_message(err.to_string())
}

/// Create an error for a failed query or a row that did not fit its type
pub fn scan_error(op: Op, key: &str, err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Scan)
        .with_op(op.name())
        .with_entity_id(key.to_string())
        .with_message(err.to_string())
}

/// Create a not found error for a query that returned zero rows
pub fn not_found(op: Op, key: &str) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_op(op.name())
        .with_entity_id(key.to_string())
        .with_message("no rows recorded")
}

/// Attach operation and key context to a codec failure
pub fn codec_error(op: Op, key: &str, err: CodecError) -> ExError {
    ExError::from(err)
        .with_op(op.name())
        .with_entity_id(key.to_string())
}

/// Create a lifecycle error for misuse of the facade
pub fn lifecycle_error(op: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Lifecycle)
        .with_op(op.to_string())
        .with_message(reason.to_string())
}

/// Create an error for an unusable configuration value
pub fn invalid_config(variable: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op("config")
        .with_field(variable.to_string())
        .with_message(reason.to_string())
}
