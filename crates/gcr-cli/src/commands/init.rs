//! Schema initialisation

use super::CommandResult;
use gcr_store::RecorderStore;

/// `open_store` already ran the migrations; report where.
pub fn execute(store: &RecorderStore) -> CommandResult {
    let applied: i64 = store.connection()?.query_row(
        "SELECT COUNT(*) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    println!(
        "Initialised {} ({} migrations recorded)",
        store.config().path.display(),
        applied
    );
    Ok(())
}
