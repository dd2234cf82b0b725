//! Subcommand implementations

pub mod init;
pub mod query;

use gcr_core::errors::ExError;
use gcr_store::{RecorderStore, StoreConfig};
use serde::Serialize;
use std::path::PathBuf;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Open and initialise the store; `--db` wins over the environment.
pub fn open_store(db: Option<PathBuf>) -> Result<RecorderStore, Box<dyn std::error::Error>> {
    let mut config = StoreConfig::from_env()?;
    if let Some(path) = db {
        config.path = path;
    }
    let mut store = RecorderStore::new(config);
    store.init()?;
    Ok(store)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// "Nothing recorded" prints as an empty list rather than an error.
pub fn or_empty<T>(result: Result<Vec<T>, ExError>) -> Result<Vec<T>, ExError> {
    match result {
        Err(err) if err.is_not_found() => Ok(Vec::new()),
        other => other,
    }
}
