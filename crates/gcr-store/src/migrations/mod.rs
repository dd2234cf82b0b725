//! Migration framework
//!
//! Provides:
//! - Migration runner with checksum verification
//! - Idempotent application, safe on every startup
//! - Embedded SQL migrations

mod checksums;
mod embedded;
mod runner;

pub use embedded::{Migration, MIGRATIONS};
pub use runner::apply_migrations;
