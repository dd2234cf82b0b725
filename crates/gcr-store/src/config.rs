//! Store configuration loaded from the environment.
//!
//! Settings come from environment variables, optionally seeded from a `.env`
//! file via `dotenvy`:
//!
//! | Variable                  | Default          |
//! |---------------------------|------------------|
//! | `GCR_DB_PATH`             | `gcr.db`         |
//! | `GCR_DB_BUSY_TIMEOUT_MS`  | `5000`           |
//! | `GCR_DB_JOURNAL_MODE`     | `wal`            |

use crate::errors::{invalid_config, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_DB_PATH: &str = "GCR_DB_PATH";
pub const ENV_BUSY_TIMEOUT_MS: &str = "GCR_DB_BUSY_TIMEOUT_MS";
pub const ENV_JOURNAL_MODE: &str = "GCR_DB_JOURNAL_MODE";

const DEFAULT_DB_PATH: &str = "gcr.db";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// SQLite journal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalMode {
    #[default]
    Wal,
    Delete,
}

impl JournalMode {
    /// Returns the SQLite pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

impl FromStr for JournalMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wal" => Ok(Self::Wal),
            "delete" => Ok(Self::Delete),
            other => Err(format!("unsupported journal mode '{}'", other)),
        }
    }
}

/// Connection settings for the recorder database.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Database file; ignored when `in_memory` is set
    pub path: PathBuf,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    #[serde(default)]
    pub journal_mode: JournalMode,
    #[serde(default)]
    pub in_memory: bool,
}

const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_PATH),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: JournalMode::default(),
            in_memory: false,
        }
    }
}

impl StoreConfig {
    /// File-backed configuration with default pragmas.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Private in-memory database, used by tests.
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::from(":memory:"),
            in_memory: true,
            ..Self::default()
        }
    }

    /// Load configuration from the environment.
    ///
    /// Calls `dotenvy::dotenv().ok()` first so a `.env` file may supply any
    /// of the variables. Missing or unparsable numbers fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidInput` error if `GCR_DB_JOURNAL_MODE` names an
    /// unsupported mode.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = std::env::var(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB_PATH));
        let busy_timeout_ms = parse_env(ENV_BUSY_TIMEOUT_MS, DEFAULT_BUSY_TIMEOUT_MS);
        let journal_mode = match std::env::var(ENV_JOURNAL_MODE) {
            Ok(raw) => raw
                .parse::<JournalMode>()
                .map_err(|reason| invalid_config(ENV_JOURNAL_MODE, &reason))?,
            Err(_) => JournalMode::default(),
        };

        Ok(Self {
            path,
            busy_timeout_ms,
            journal_mode,
            in_memory: false,
        })
    }
}

fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
