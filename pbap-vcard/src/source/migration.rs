// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Record Store Schema Migrations
//!
//! Versioned SQL migrations tracked in a `schema_version` table. Pending
//! migrations run in order within a single transaction.

use rusqlite::Connection;

use super::SourceError;

/// A single schema migration step.
pub struct Migration {
    /// Monotonically increasing version number (starting at 1).
    pub version: u32,
    /// Human-readable name for this migration.
    pub name: &'static str,
    pub sql: &'static str,
}

/// Runs schema migrations against a database connection.
pub struct MigrationRunner;

impl MigrationRunner {
    /// Runs all pending migrations in a transaction.
    ///
    /// If any migration fails, all changes are rolled back.
    pub fn run(conn: &Connection, migrations: &[Migration]) -> Result<(), SourceError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at INTEGER NOT NULL
            );",
        )?;

        let current_version = Self::current_version(conn)?;

        let pending: Vec<&Migration> = migrations
            .iter()
            .filter(|m| m.version > current_version)
            .collect();

        if pending.is_empty() {
            return Ok(());
        }

        for window in pending.windows(2) {
            if window[0].version >= window[1].version {
                return Err(SourceError::Migration(format!(
                    "Migrations are not in order: v{} before v{}",
                    window[0].version, window[1].version
                )));
            }
        }

        conn.execute_batch("BEGIN EXCLUSIVE TRANSACTION;")?;

        for migration in &pending {
            if let Err(e) = conn.execute_batch(migration.sql) {
                conn.execute_batch("ROLLBACK;")?;
                return Err(SourceError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e
                )));
            }

            if let Err(e) = conn.execute(
                "INSERT INTO schema_version (version, applied_at) \
                 VALUES (?1, strftime('%s', 'now'))",
                rusqlite::params![migration.version],
            ) {
                conn.execute_batch("ROLLBACK;")?;
                return Err(SourceError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e
                )));
            }
            tracing::debug!(
                version = migration.version,
                name = migration.name,
                "applied migration"
            );
        }

        conn.execute_batch("COMMIT;")?;
        Ok(())
    }

    /// Returns the current schema version, or 0 if no migrations have been applied.
    pub fn current_version(conn: &Connection) -> Result<u32, SourceError> {
        let table_exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |row| row.get(0),
        )?;

        if !table_exists {
            return Ok(0);
        }

        let version: Option<u32> =
            conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                row.get(0)
            })?;

        Ok(version.unwrap_or(0))
    }
}

const MIGRATION_V1_BASELINE: &str = "
CREATE TABLE contacts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    display_name TEXT,
    given_name TEXT,
    family_name TEXT,
    nickname TEXT,
    organization TEXT,
    title TEXT,
    note TEXT,
    birthday TEXT,
    photo BLOB,
    in_visible_group INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE contact_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    contact_id INTEGER NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
    kind TEXT NOT NULL,
    subtype TEXT,
    label TEXT,
    value TEXT NOT NULL
);

CREATE TABLE calls (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    number TEXT,
    presentation INTEGER NOT NULL DEFAULT 1,
    call_type INTEGER NOT NULL,
    date_ms INTEGER NOT NULL,
    cached_name TEXT,
    cached_number_kind TEXT
);
";

const MIGRATION_V2_LOOKUP_INDEXES: &str = "
CREATE INDEX idx_contact_data_contact ON contact_data(contact_id);
CREATE INDEX idx_contact_data_value ON contact_data(kind, value);
CREATE INDEX idx_calls_type ON calls(call_type, id);
";

/// Returns all registered migrations in version order.
pub fn all_migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            name: "baseline_schema",
            sql: MIGRATION_V1_BASELINE,
        },
        Migration {
            version: 2,
            name: "lookup_indexes",
            sql: MIGRATION_V2_LOOKUP_INDEXES,
        },
    ]
}
