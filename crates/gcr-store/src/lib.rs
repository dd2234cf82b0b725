//! GCR Store - SQLite persistence for recorded cluster snapshots
//!
//! Provides:
//! - Embedded, checksummed schema migrations
//! - A registry of named prepared operations
//! - The row mapping layer between flat rows and domain objects
//! - One append-only snapshot store per resource kind
//! - The `RecorderStore` facade owning connection lifecycle

pub mod config;
pub mod db;
pub mod errors;
pub mod facade;
pub mod mapping;
pub mod migrations;
pub mod repo;
pub mod statements;

pub use config::{JournalMode, StoreConfig};
pub use errors::Result;
pub use facade::RecorderStore;
pub use repo::{HashCount, SnapshotStore};
pub use statements::Op;
