//! Database connection management
//!
//! Opens the SQLite connection and applies the configured pragmas

use crate::config::StoreConfig;
use crate::errors::{connection_error, Result};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// Open the database described by `config` and apply its pragmas
pub fn open(config: &StoreConfig) -> Result<Connection> {
    let conn = if config.in_memory {
        open_in_memory()?
    } else {
        open_path(&config.path)?
    };
    configure(&conn, config)?;
    Ok(conn)
}

/// Open a SQLite database at the given path
pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let target = path.as_ref().display().to_string();
    Connection::open(path).map_err(|e| connection_error(&target, e))
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(|e| connection_error(":memory:", e))
}

/// Apply journal mode and busy timeout
///
/// Returns the journal mode SQLite actually selected; in-memory databases
/// always report `memory`.
pub fn configure(conn: &Connection, config: &StoreConfig) -> Result<String> {
    let target = config.path.display().to_string();

    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|e| connection_error(&target, e))?;

    // journal_mode answers with a row, so it cannot go through execute
    let mode: String = conn
        .query_row(
            &format!("PRAGMA journal_mode = {}", config.journal_mode.pragma_value()),
            [],
            |row| row.get(0),
        )
        .map_err(|e| connection_error(&target, e))?;

    Ok(mode)
}
