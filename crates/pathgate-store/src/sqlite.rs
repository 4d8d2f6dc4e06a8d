//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend for the Pathgate registry. It uses
//! rusqlite with bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use tracing::debug;

use pathgate_core::{
    Address, CanonicalPrefix, Cid, Event, EventBody, PathHash, PermissionKey,
};
use pathgate_perms::{AdminState, PermissionRecord};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{FileRecord, Store};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime, and every mutation runs in a
/// single transaction together with its audit log entry.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(format!("mutex poisoned: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Encoding helpers
// ─────────────────────────────────────────────────────────────────────────────

fn to_cbor<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

fn from_cbor<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    ciborium::from_reader(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode_address(bytes: &[u8]) -> Result<Address> {
    if bytes.len() != 20 {
        return Err(StoreError::InvalidData(format!(
            "address must be 20 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(Address::from_slice(bytes))
}

/// Append `body` to the log inside `tx` and return the sequenced event.
fn append_event(tx: &Transaction<'_>, body: EventBody) -> Result<Event> {
    let seq: u64 = tx.query_row("SELECT COALESCE(MAX(seq), 0) + 1 FROM events", [], |row| {
        row.get(0)
    })?;

    let (key_contract, key_token) = match body.key() {
        Some(key) => (
            Some(key.contract.as_slice().to_vec()),
            Some(key.token_id.to_be_bytes().to_vec()),
        ),
        None => (None, None),
    };
    let path_hash = body.path_hash().map(|h| h.as_bytes().to_vec());

    tx.execute(
        "INSERT INTO events (seq, kind, key_contract, key_token, path_hash, body)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![seq, body.name(), key_contract, key_token, path_hash, to_cbor(&body)?],
    )?;

    debug!(seq, kind = body.name(), "appended audit event");
    Ok(Event::new(seq, body))
}

fn collect_events(
    stmt: &mut rusqlite::Statement<'_>,
    args: impl rusqlite::Params,
) -> Result<Vec<Event>> {
    let rows = stmt.query_map(args, |row| {
        Ok((row.get::<_, u64>(0)?, row.get::<_, Vec<u8>>(1)?))
    })?;

    let mut events = Vec::new();
    for row in rows {
        let (seq, body) = row?;
        events.push(Event::new(seq, from_cbor(&body)?));
    }
    Ok(events)
}

#[async_trait]
impl Store for SqliteStore {
    async fn get_file(&self, path_hash: &PathHash) -> Result<Option<FileRecord>> {
        let path_hash = *path_hash;
        self.blocking(move |conn| {
            let cid: Option<String> = conn
                .query_row(
                    "SELECT cid FROM file_records WHERE path_hash = ?1",
                    params![path_hash.as_bytes().as_slice()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(cid.map(|cid| FileRecord {
                path_hash,
                cid: Cid::new(cid),
            }))
        })
        .await
    }

    async fn upsert_file(&self, record: &FileRecord, event: EventBody) -> Result<Event> {
        let record = record.clone();
        self.blocking(move |conn| {
            let tx = conn.transaction()?;
            let event = append_event(&tx, event)?;
            tx.execute(
                "INSERT INTO file_records (path_hash, cid, updated_seq) VALUES (?1, ?2, ?3)
                 ON CONFLICT(path_hash)
                 DO UPDATE SET cid = excluded.cid, updated_seq = excluded.updated_seq",
                params![record.path_hash.as_bytes().as_slice(), record.cid.as_str(), event.seq],
            )?;
            tx.commit()?;
            Ok(event)
        })
        .await
    }

    async fn get_permission(&self, key: &PermissionKey) -> Result<Option<PermissionRecord>> {
        let key = *key;
        self.blocking(move |conn| {
            let row: Option<(Vec<u8>, bool)> = conn
                .query_row(
                    "SELECT prefixes, revoked FROM permission_records
                     WHERE contract = ?1 AND token_id = ?2",
                    params![key.contract.as_slice(), key.token_id.to_be_bytes().as_slice()],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            let Some((prefixes, revoked)) = row else {
                return Ok(None);
            };
            // Deserializing re-validates every stored prefix.
            let prefixes: Vec<CanonicalPrefix> = from_cbor(&prefixes)?;
            Ok(Some(PermissionRecord {
                prefixes: prefixes.into_iter().collect(),
                revoked,
            }))
        })
        .await
    }

    async fn put_permission(
        &self,
        key: &PermissionKey,
        record: &PermissionRecord,
        event: EventBody,
    ) -> Result<Event> {
        let key = *key;
        let prefixes = to_cbor(&record.prefixes.as_slice())?;
        let revoked = record.revoked;
        self.blocking(move |conn| {
            let tx = conn.transaction()?;
            let event = append_event(&tx, event)?;
            tx.execute(
                "INSERT INTO permission_records (contract, token_id, prefixes, revoked)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(contract, token_id) DO UPDATE SET
                    prefixes = excluded.prefixes, revoked = excluded.revoked",
                params![
                    key.contract.as_slice(),
                    key.token_id.to_be_bytes().as_slice(),
                    prefixes,
                    revoked
                ],
            )?;
            tx.commit()?;
            Ok(event)
        })
        .await
    }

    async fn get_admin(&self) -> Result<Option<AdminState>> {
        self.blocking(|conn| {
            let row: Option<Option<Vec<u8>>> = conn
                .query_row("SELECT owner FROM admin WHERE id = 1", [], |row| row.get(0))
                .optional()?;
            match row {
                None => Ok(None),
                Some(None) => Ok(Some(AdminState::Disabled)),
                Some(Some(owner)) => Ok(Some(AdminState::Owner(decode_address(&owner)?))),
            }
        })
        .await
    }

    async fn put_admin(&self, state: &AdminState, event: EventBody) -> Result<Event> {
        let owner = state.owner().map(|a| a.as_slice().to_vec());
        self.blocking(move |conn| {
            let tx = conn.transaction()?;
            let event = append_event(&tx, event)?;
            tx.execute(
                "INSERT INTO admin (id, owner) VALUES (1, ?1)
                 ON CONFLICT(id) DO UPDATE SET owner = excluded.owner",
                params![owner],
            )?;
            tx.commit()?;
            Ok(event)
        })
        .await
    }

    async fn events_since(&self, after_seq: u64) -> Result<Vec<Event>> {
        self.blocking(move |conn| {
            let mut stmt =
                conn.prepare_cached("SELECT seq, body FROM events WHERE seq > ?1 ORDER BY seq")?;
            collect_events(&mut stmt, params![after_seq.min(i64::MAX as u64)])
        })
        .await
    }

    async fn events_for_key(&self, key: &PermissionKey) -> Result<Vec<Event>> {
        let key = *key;
        self.blocking(move |conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT seq, body FROM events
                 WHERE key_contract = ?1 AND key_token = ?2 ORDER BY seq",
            )?;
            collect_events(
                &mut stmt,
                params![key.contract.as_slice(), key.token_id.to_be_bytes().as_slice()],
            )
        })
        .await
    }

    async fn events_for_path(&self, path_hash: &PathHash) -> Result<Vec<Event>> {
        let path_hash = *path_hash;
        self.blocking(move |conn| {
            let mut stmt = conn
                .prepare_cached("SELECT seq, body FROM events WHERE path_hash = ?1 ORDER BY seq")?;
            collect_events(&mut stmt, params![path_hash.as_bytes().as_slice()])
        })
        .await
    }

    async fn head_seq(&self) -> Result<u64> {
        self.blocking(|conn| {
            Ok(conn.query_row("SELECT COALESCE(MAX(seq), 0) FROM events", [], |row| row.get(0))?)
        })
        .await
    }
}
