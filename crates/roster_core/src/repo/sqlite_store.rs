//! SQLite backend keeping the roster document in a single-row table.
//!
//! # Invariants
//! - Row `id = 1` is the only row in `roster_documents`.
//! - Every write bumps `revision` by one inside a single statement.

use crate::db::{open_db, open_db_in_memory};
use crate::model::RosterDocument;
use crate::repo::document_store::{DocumentStore, StoreResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

pub struct SqliteDocumentStore {
    conn: Connection,
}

impl SqliteDocumentStore {
    /// Opens the database file, creating it and applying migrations as needed.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        if let Some(parent) = path.as_ref().parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Number of writes applied so far; `0` before the first write.
    pub fn revision(&self) -> StoreResult<u64> {
        let revision = self
            .conn
            .query_row(
                "SELECT revision FROM roster_documents WHERE id = 1;",
                [],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(revision.map_or(0, |value| u64::try_from(value).unwrap_or(0)))
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn read(&self) -> StoreResult<RosterDocument> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM roster_documents WHERE id = 1;",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        match body {
            Some(body) => Ok(serde_json::from_str(&body)?),
            None => Ok(RosterDocument::default()),
        }
    }

    fn write(&self, document: &RosterDocument) -> StoreResult<()> {
        let body = serde_json::to_string(document)?;
        self.conn.execute(
            "INSERT INTO roster_documents (id, body) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET
                body = excluded.body,
                revision = roster_documents.revision + 1,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![body],
        )?;
        Ok(())
    }
}
