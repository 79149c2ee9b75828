//! Versioned JSON documents keyed like the dashboard's browser storage.
//!
//! Each key holds one document with a schema version and a revision. Writes
//! are compare-and-swap on the revision; revision 0 means "absent".

use crate::records::{Record, RecordSet};
use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const SCHEMA_VERSION: i64 = 1;

pub mod keys {
    pub const SESSION: &str = "hostel_user";
    pub const STUDENTS: &str = "hostel_students";
    pub const ROOMS: &str = "rooms";
    pub const FEES: &str = "fees";
    pub const ATTENDANCE: &str = "attendance";
    pub const REQUESTS: &str = "requests";
    pub const ASSETS: &str = "assets";
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{key} changed underneath this write (expected revision {expected}, found {actual})")]
    Conflict {
        key: String,
        expected: i64,
        actual: i64,
    },
    #[error("{key} has schema version {found}; this build supports up to {SCHEMA_VERSION}")]
    UnsupportedSchema { key: String, found: i64 },
}

#[derive(Debug)]
pub enum Document<T> {
    Missing,
    Corrupt { revision: i64, error: String },
    Found { value: T, revision: i64 },
}

pub fn read_document<T: DeserializeOwned>(
    conn: &Connection,
    key: &str,
) -> Result<Document<T>, StoreError> {
    let row: Option<(i64, i64, String)> = conn
        .query_row(
            "SELECT schema_version, revision, payload FROM documents WHERE key = ?",
            [key],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .optional()?;
    let Some((schema_version, revision, payload)) = row else {
        return Ok(Document::Missing);
    };
    if schema_version > SCHEMA_VERSION {
        return Err(StoreError::UnsupportedSchema {
            key: key.to_string(),
            found: schema_version,
        });
    }
    match serde_json::from_str::<T>(&payload) {
        Ok(value) => Ok(Document::Found { value, revision }),
        Err(e) => Ok(Document::Corrupt {
            revision,
            error: e.to_string(),
        }),
    }
}

pub fn current_revision(conn: &Connection, key: &str) -> Result<i64, StoreError> {
    let rev: Option<i64> = conn
        .query_row(
            "SELECT revision FROM documents WHERE key = ?",
            [key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(rev.unwrap_or(0))
}

/// Writes `value` if the stored revision still equals `expected_revision`.
/// Returns the new revision.
pub fn write_document<T: Serialize + ?Sized>(
    conn: &Connection,
    key: &str,
    value: &T,
    expected_revision: i64,
) -> Result<i64, StoreError> {
    let payload = serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    let now = chrono::Utc::now().to_rfc3339();

    let changed = if expected_revision == 0 {
        conn.execute(
            "INSERT INTO documents(key, schema_version, revision, payload, updated_at)
             VALUES(?, ?, 1, ?, ?)
             ON CONFLICT(key) DO NOTHING",
            (key, SCHEMA_VERSION, &payload, &now),
        )?
    } else {
        conn.execute(
            "UPDATE documents
             SET schema_version = ?, revision = revision + 1, payload = ?, updated_at = ?
             WHERE key = ? AND revision = ?",
            (SCHEMA_VERSION, &payload, &now, key, expected_revision),
        )?
    };

    if changed == 0 {
        return Err(StoreError::Conflict {
            key: key.to_string(),
            expected: expected_revision,
            actual: current_revision(conn, key)?,
        });
    }
    tracing::debug!(key, revision = expected_revision + 1, "document written");
    Ok(expected_revision + 1)
}

pub fn delete_document(conn: &Connection, key: &str) -> Result<(), StoreError> {
    conn.execute("DELETE FROM documents WHERE key = ?", [key])?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub records: RecordSet<T>,
    pub revision: i64,
}

/// Reads a record array, seeding it on first use. A corrupt document is
/// replaced by the seed.
pub fn load_records<T, F>(conn: &Connection, key: &str, seed: F) -> Result<Loaded<T>, StoreError>
where
    T: Record + Serialize + DeserializeOwned,
    F: FnOnce() -> Vec<T>,
{
    let (items, expected) = match read_document::<Vec<T>>(conn, key)? {
        Document::Found { value, revision } => {
            return Ok(Loaded {
                records: RecordSet::new(value),
                revision,
            })
        }
        Document::Missing => (seed(), 0),
        Document::Corrupt { revision, error } => {
            tracing::warn!(key, %error, "discarding unreadable store document");
            (seed(), revision)
        }
    };
    let revision = write_document(conn, key, &items, expected)?;
    let records = RecordSet::new(items);
    tracing::info!(key, count = records.len(), revision, "store seeded");
    Ok(Loaded { records, revision })
}

pub fn save_records<T>(
    conn: &Connection,
    key: &str,
    records: &RecordSet<T>,
    expected_revision: i64,
) -> Result<i64, StoreError>
where
    T: Record + Serialize,
{
    write_document(conn, key, records.as_slice(), expected_revision)
}
