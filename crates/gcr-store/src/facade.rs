//! Store facade.
//!
//! [`RecorderStore`] owns the connection and, through rusqlite's statement
//! cache, every prepared operation. Per-kind stores are borrowed from it
//! and cannot outlive it.

use crate::config::StoreConfig;
use crate::db;
use crate::errors::{connection_error, lifecycle_error, Result};
use crate::migrations::apply_migrations;
use crate::repo::{
    AutoscalerSettingsStore, EventStore, MachineDeploymentStore, NodeStore, PdbStore, PodStore,
    WorkerPoolStore,
};
use crate::statements::prepare_all;
use gcr_core::{log_op_end, log_op_error, log_op_start};
use rusqlite::Connection;
use std::time::Instant;

/// Lifecycle: `new` → `init` → per-kind stores → `close`.
pub struct RecorderStore {
    config: StoreConfig,
    conn: Option<Connection>,
}

impl RecorderStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config, conn: None }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Open the database, apply pending migrations and prepare every
    /// registered operation.
    ///
    /// # Errors
    ///
    /// `Lifecycle` if the store is already open. `Connection`, `Schema` or
    /// `Prepare` if startup fails; the store stays closed in that case.
    pub fn init(&mut self) -> Result<()> {
        if self.conn.is_some() {
            return Err(lifecycle_error("init", "store is already initialised"));
        }

        let target = self.target();
        let started = Instant::now();
        log_op_start!("init", path = %target);

        match Self::open_and_prepare(&self.config) {
            Ok((conn, migrations_applied, statements)) => {
                self.conn = Some(conn);
                log_op_end!(
                    "init",
                    duration_ms = elapsed_ms(started),
                    path = %target,
                    migrations_applied = migrations_applied,
                    statements = statements
                );
                Ok(())
            }
            Err(err) => {
                log_op_error!("init", &err, duration_ms = elapsed_ms(started), path = %target);
                Err(err)
            }
        }
    }

    fn open_and_prepare(config: &StoreConfig) -> Result<(Connection, usize, usize)> {
        let mut conn = db::open(config)?;
        let migrations_applied = apply_migrations(&mut conn)?;
        let statements = prepare_all(&conn)?;
        Ok((conn, migrations_applied, statements))
    }

    /// Release the connection and its prepared statements.
    ///
    /// A no-op when the store is not open.
    ///
    /// # Errors
    ///
    /// `Connection` if SQLite refuses to close; the store stays open and
    /// `close` may be retried.
    pub fn close(&mut self) -> Result<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };

        match conn.close() {
            Ok(()) => {
                tracing::info!(path = %self.target(), "store closed");
                Ok(())
            }
            Err((conn, err)) => {
                tracing::warn!(path = %self.target(), error = %err, "store close failed");
                self.conn = Some(conn);
                Err(connection_error(&self.target(), err))
            }
        }
    }

    /// The open connection.
    ///
    /// # Errors
    ///
    /// `Lifecycle` before `init` or after `close`.
    pub fn connection(&self) -> Result<&Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| lifecycle_error("connection", "store is not initialised"))
    }

    /// # Errors
    ///
    /// `Lifecycle` before `init` or after `close`.
    pub fn worker_pools(&self) -> Result<WorkerPoolStore<'_>> {
        self.connection().map(WorkerPoolStore::new)
    }

    /// # Errors
    ///
    /// `Lifecycle` before `init` or after `close`.
    pub fn machine_deployments(&self) -> Result<MachineDeploymentStore<'_>> {
        self.connection().map(MachineDeploymentStore::new)
    }

    /// # Errors
    ///
    /// `Lifecycle` before `init` or after `close`.
    pub fn nodes(&self) -> Result<NodeStore<'_>> {
        self.connection().map(NodeStore::new)
    }

    /// # Errors
    ///
    /// `Lifecycle` before `init` or after `close`.
    pub fn pods(&self) -> Result<PodStore<'_>> {
        self.connection().map(PodStore::new)
    }

    /// # Errors
    ///
    /// `Lifecycle` before `init` or after `close`.
    pub fn pdbs(&self) -> Result<PdbStore<'_>> {
        self.connection().map(PdbStore::new)
    }

    /// # Errors
    ///
    /// `Lifecycle` before `init` or after `close`.
    pub fn events(&self) -> Result<EventStore<'_>> {
        self.connection().map(EventStore::new)
    }

    /// # Errors
    ///
    /// `Lifecycle` before `init` or after `close`.
    pub fn autoscaler_settings(&self) -> Result<AutoscalerSettingsStore<'_>> {
        self.connection().map(AutoscalerSettingsStore::new)
    }

    fn target(&self) -> String {
        if self.config.in_memory {
            ":memory:".to_string()
        } else {
            self.config.path.display().to_string()
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
