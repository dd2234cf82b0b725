// Store configuration from the environment

#![allow(clippy::unwrap_used, clippy::expect_used)]

use gcr_store::config::{ENV_BUSY_TIMEOUT_MS, ENV_DB_PATH, ENV_JOURNAL_MODE};
use gcr_store::{JournalMode, StoreConfig};
use std::path::PathBuf;

// Single test: the process environment is shared between test threads.
#[test]
fn test_from_env_reads_overrides_and_rejects_bad_mode() {
    std::env::set_var(ENV_DB_PATH, "/var/lib/gcr/recorder.db");
    std::env::set_var(ENV_BUSY_TIMEOUT_MS, "250");
    std::env::set_var(ENV_JOURNAL_MODE, "DELETE");

    let config = StoreConfig::from_env().unwrap();
    assert_eq!(config.path, PathBuf::from("/var/lib/gcr/recorder.db"));
    assert_eq!(config.busy_timeout_ms, 250);
    assert_eq!(config.journal_mode, JournalMode::Delete);
    assert!(!config.in_memory);

    std::env::set_var(ENV_BUSY_TIMEOUT_MS, "not-a-number");
    assert_eq!(StoreConfig::from_env().unwrap().busy_timeout_ms, 5_000);

    std::env::set_var(ENV_JOURNAL_MODE, "memory");
    let err = StoreConfig::from_env().unwrap_err();
    assert_eq!(err.code(), "ERR_INVALID_INPUT");
    assert_eq!(err.field(), Some(ENV_JOURNAL_MODE));

    std::env::remove_var(ENV_DB_PATH);
    std::env::remove_var(ENV_BUSY_TIMEOUT_MS);
    std::env::remove_var(ENV_JOURNAL_MODE);
}
