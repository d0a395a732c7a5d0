//! Record index schema
//!
//! One table, `records`, with one row per record key. The `meta` table
//! records the schema version so a newer on-disk schema is refused instead
//! of misread.

use rusqlite::{params, Connection, OptionalExtension};
use tcestore_core::{StoreError, StoreResult};

/// Schema version written by this crate.
pub const SCHEMA_VERSION: u32 = 1;

const CREATE_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS records (
        record_key TEXT PRIMARY KEY,
        registration_number TEXT,
        intern_name TEXT,
        company_name TEXT,
        latest_version INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_records_intern_name ON records(intern_name);
";

/// Create tables and indexes if missing and check the schema version.
pub fn init_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(CREATE_SCHEMA).map_err(super::index_err)?;

    let stored: Option<String> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(super::index_err)?;

    match stored {
        None => {
            conn.execute(
                "INSERT INTO meta (key, value) VALUES ('schema_version', ?1)",
                params![SCHEMA_VERSION.to_string()],
            )
            .map_err(super::index_err)?;
        }
        Some(v) => {
            let version: u32 = v.parse().map_err(|_| {
                StoreError::index(format!("unreadable schema version '{}'", v))
            })?;
            if version > SCHEMA_VERSION {
                return Err(StoreError::index(format!(
                    "index schema version {} is newer than supported version {}",
                    version, SCHEMA_VERSION
                )));
            }
        }
    }
    Ok(())
}
