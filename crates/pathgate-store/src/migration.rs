//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;
use tracing::debug;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {current} is newer than supported version {CURRENT_VERSION}"
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            debug!(version, "applying schema migration");
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Latest cid per canonical path. Upsert only, never deleted.
        CREATE TABLE file_records (
            path_hash BLOB PRIMARY KEY,       -- 32 bytes, keccak256(canonical path)
            cid TEXT NOT NULL,
            updated_seq INTEGER NOT NULL      -- seq of the event that last wrote it
        );

        -- Prefix set and revocation flag per permission key.
        CREATE TABLE permission_records (
            contract BLOB NOT NULL,           -- 20 bytes
            token_id BLOB NOT NULL,           -- 32 bytes, big-endian
            prefixes BLOB NOT NULL,           -- CBOR array of canonical prefixes
            revoked INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (contract, token_id)
        );

        -- Single-row administrator state. NULL owner means renounced.
        CREATE TABLE admin (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            owner BLOB
        );

        -- Append-only audit log.
        CREATE TABLE events (
            seq INTEGER PRIMARY KEY,          -- 1-based, dense
            kind TEXT NOT NULL,
            key_contract BLOB,                -- NULL for admin events
            key_token BLOB,
            path_hash BLOB,                   -- only for file events
            body BLOB NOT NULL                -- CBOR EventBody
        );

        CREATE INDEX idx_events_key ON events (key_contract, key_token, seq);
        CREATE INDEX idx_events_path ON events (path_hash, seq);
        "#,
    )?;

    Ok(())
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
