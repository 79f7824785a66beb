//! SQLite storage.
//!
//! [`Database`] owns the connection and the schema. The query functions in
//! the submodules take a plain `&Connection`, so they run the same way on
//! their own or inside a `rusqlite::Transaction` opened by the caller.

mod budgets;
mod categories;
mod schema;
mod transactions;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;

use crate::models::CATALOG;

pub(crate) use budgets::*;
pub(crate) use categories::*;
pub(crate) use transactions::*;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        db.seed_catalog()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        db.seed_catalog()?;
        Ok(db)
    }

    /// Bring the schema up to [`schema::CURRENT_VERSION`]. A fresh database
    /// gets the whole schema; an older one runs every migration past its
    /// stored version, all in one transaction.
    fn migrate(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        let has_version_table: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            tx.execute_batch(schema::SCHEMA_V1)?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tx.commit()?;
            tracing::info!(version = schema::CURRENT_VERSION, "created database schema");
            return Ok(());
        }

        let stored: Option<i32> = tx
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()
            .context("Failed to read schema version")?;
        let current = stored.unwrap_or(0);
        if current > schema::CURRENT_VERSION {
            anyhow::bail!(
                "Database schema version {current} is newer than this build supports ({})",
                schema::CURRENT_VERSION
            );
        }

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                tracing::info!(from_version, "applying migration");
                tx.execute_batch(sql)?;
            }
        }

        match stored {
            None => {
                tx.execute(
                    "INSERT INTO schema_version (version) VALUES (?1)",
                    params![schema::CURRENT_VERSION],
                )?;
            }
            Some(version) if version < schema::CURRENT_VERSION => {
                tx.execute(
                    "UPDATE schema_version SET version = ?1",
                    params![schema::CURRENT_VERSION],
                )?;
            }
            Some(_) => {}
        }
        tx.commit()?;
        Ok(())
    }

    /// Fill the global category catalog on first open. Categories retired
    /// later stay retired: this never runs again once the table has rows.
    fn seed_catalog(&mut self) -> Result<()> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        for (key, label, icon) in CATALOG {
            insert_category(&tx, key, label, icon)?;
        }
        tx.commit()?;
        tracing::debug!(categories = CATALOG.len(), "seeded category catalog");
        Ok(())
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open a write transaction. `IMMEDIATE` takes the write lock up front so
    /// a balance read inside the transaction cannot go stale before the
    /// update lands.
    pub(crate) fn begin(&mut self) -> crate::Result<rusqlite::Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}
