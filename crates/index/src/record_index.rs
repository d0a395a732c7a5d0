//! SQLite mirror of current record metadata
//!
//! Holds one row per record key with the denormalized fields of the latest
//! snapshot. The index is a derived view: the reconciler keeps it current and
//! repair rebuilds it from the snapshot files.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tcestore_core::{IndexFields, RecordKey, StoreResult};
use tracing::debug;

use crate::index_err;
use crate::schema::init_schema;

/// One row of the record index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRow {
    /// Record key (`idUnico`)
    pub record_key: String,
    /// `matriculaEstagiario` of the latest snapshot
    pub registration_number: Option<String>,
    /// `nomeEstagiario` of the latest snapshot
    pub intern_name: Option<String>,
    /// `nomeEmpresa` of the latest snapshot
    pub company_name: Option<String>,
    /// Highest stored version
    pub latest_version: u32,
    /// When the first snapshot was indexed
    pub created_at: DateTime<Utc>,
    /// When the latest snapshot was indexed
    pub updated_at: DateTime<Utc>,
}

/// Result of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new row was created
    Inserted,
    /// An existing row was refreshed
    Updated,
}

const SELECT_COLUMNS: &str = "record_key, registration_number, intern_name, company_name,
     latest_version, created_at, updated_at";

fn read_row(row: &Row<'_>) -> rusqlite::Result<IndexRow> {
    Ok(IndexRow {
        record_key: row.get(0)?,
        registration_number: row.get(1)?,
        intern_name: row.get(2)?,
        company_name: row.get(3)?,
        latest_version: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// SQLite-backed record index.
///
/// The connection is shared behind a mutex; every method is a short
/// statement or a single transaction.
pub struct RecordIndex {
    conn: Mutex<Connection>,
}

impl fmt::Debug for RecordIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordIndex").finish_non_exhaustive()
    }
}

impl RecordIndex {
    /// Open (creating if needed) an index database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref()).map_err(index_err)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(index_err)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory index (for testing).
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(index_err)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Insert or refresh the row for `key`, stamped with the current time.
    pub fn upsert(
        &self,
        key: &RecordKey,
        fields: &IndexFields,
        version: u32,
    ) -> StoreResult<UpsertOutcome> {
        self.upsert_at(key, fields, version, Utc::now())
    }

    /// Insert or refresh the row for `key` with an explicit timestamp.
    ///
    /// One existence check followed by an `INSERT` or `UPDATE`, inside a
    /// single SQLite transaction. An update refreshes the denormalized
    /// fields, `latest_version` and `updated_at`; `created_at` is kept.
    pub fn upsert_at(
        &self,
        key: &RecordKey,
        fields: &IndexFields,
        version: u32,
        now: DateTime<Utc>,
    ) -> StoreResult<UpsertOutcome> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(index_err)?;

        let exists: bool = tx
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM records WHERE record_key = ?1)",
                params![key.as_str()],
                |row| row.get(0),
            )
            .map_err(index_err)?;

        let outcome = if exists {
            tx.execute(
                "UPDATE records
                 SET registration_number = ?2, intern_name = ?3, company_name = ?4,
                     latest_version = ?5, updated_at = ?6
                 WHERE record_key = ?1",
                params![
                    key.as_str(),
                    fields.registration_number,
                    fields.intern_name,
                    fields.company_name,
                    version,
                    now,
                ],
            )
            .map_err(index_err)?;
            UpsertOutcome::Updated
        } else {
            tx.execute(
                "INSERT INTO records (record_key, registration_number, intern_name, company_name,
                     latest_version, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                params![
                    key.as_str(),
                    fields.registration_number,
                    fields.intern_name,
                    fields.company_name,
                    version,
                    now,
                ],
            )
            .map_err(index_err)?;
            UpsertOutcome::Inserted
        };

        tx.commit().map_err(index_err)?;
        debug!(target: "tcestore::index", key = %key, version, outcome = ?outcome, "Index row upserted");
        Ok(outcome)
    }

    /// Row for `key`, if any.
    pub fn get(&self, key: &RecordKey) -> StoreResult<Option<IndexRow>> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("SELECT {SELECT_COLUMNS} FROM records WHERE record_key = ?1"),
            params![key.as_str()],
            read_row,
        )
        .optional()
        .map_err(index_err)
    }

    /// Every row, ordered by intern name then key.
    ///
    /// Rows without an intern name sort first.
    pub fn list_all(&self) -> StoreResult<Vec<IndexRow>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM records ORDER BY intern_name ASC, record_key ASC"
            ))
            .map_err(index_err)?;
        let rows = stmt
            .query_map([], read_row)
            .map_err(index_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(index_err)?;
        Ok(rows)
    }

    /// Remove the row for `key`. Returns whether a row existed.
    pub fn delete(&self, key: &RecordKey) -> StoreResult<bool> {
        let conn = self.conn.lock();
        let removed = conn
            .execute("DELETE FROM records WHERE record_key = ?1", params![key.as_str()])
            .map_err(index_err)?;
        Ok(removed > 0)
    }

    /// Number of rows.
    pub fn count(&self) -> StoreResult<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
            .map_err(index_err)?;
        Ok(count as usize)
    }

    /// Every indexed key, sorted.
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT record_key FROM records ORDER BY record_key ASC")
            .map_err(index_err)?;
        let keys = stmt
            .query_map([], |row| row.get(0))
            .map_err(index_err)?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(index_err)?;
        Ok(keys)
    }

    /// Fold the WAL back into the main database file.
    pub fn checkpoint(&self) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            .map_err(index_err)
    }
}
