//! Document store contract and shared backend plumbing.
//!
//! # Responsibility
//! - Define the read/write contract over the whole roster document.
//! - Provide the in-memory backend and backend selection by [`StoreKind`].
//!
//! # Invariants
//! - `read` on a store that was never written yields an empty roster.
//! - `write` replaces the full document; partial writes are never visible.

use crate::db::DbError;
use crate::model::RosterDocument;
use crate::repo::json_store::JsonFileStore;
use crate::repo::sqlite_store::SqliteDocumentStore;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

pub type StoreResult<T> = Result<T, StoreError>;

/// Backend failure while reading or writing the roster document.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
    Db(DbError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "roster store I/O error: {err}"),
            Self::Serialization(err) => write!(f, "roster document is not valid JSON: {err}"),
            Self::Db(err) => write!(f, "roster database error: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Whole-document persistence contract.
pub trait DocumentStore: Send {
    fn read(&self) -> StoreResult<RosterDocument>;
    fn write(&self, document: &RosterDocument) -> StoreResult<()>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for Box<S> {
    fn read(&self) -> StoreResult<RosterDocument> {
        (**self).read()
    }

    fn write(&self, document: &RosterDocument) -> StoreResult<()> {
        (**self).write(document)
    }
}

/// Process-local store. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    document: Mutex<RosterDocument>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: RosterDocument) -> Self {
        Self {
            document: Mutex::new(document),
        }
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn read(&self) -> StoreResult<RosterDocument> {
        let document = self.document.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(document.clone())
    }

    fn write(&self, document: &RosterDocument) -> StoreResult<()> {
        let mut current = self.document.lock().unwrap_or_else(PoisonError::into_inner);
        *current = document.clone();
        Ok(())
    }
}

/// What the roster service does when a stored document cannot be read.
///
/// A missing backing file is never a failure; it reads as an empty roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadFailurePolicy {
    /// Log the failure and continue with an empty roster.
    #[default]
    RecoverEmpty,
    /// Surface the failure to the caller.
    Fail,
}

impl FromStr for ReadFailurePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "recover" | "recover_empty" | "empty" => Ok(Self::RecoverEmpty),
            "fail" | "strict" => Ok(Self::Fail),
            other => Err(format!(
                "unsupported read failure policy `{other}`; expected recover|fail"
            )),
        }
    }
}

/// Supported persistence backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Json,
    Sqlite,
    Memory,
}

impl StoreKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Sqlite => "sqlite",
            Self::Memory => "memory",
        }
    }
}

impl Display for StoreKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(format!(
                "unsupported store kind `{other}`; expected json|sqlite|memory"
            )),
        }
    }
}

/// Opens the backend selected by `kind`. `path` is ignored for memory stores.
pub fn open_store(kind: StoreKind, path: &Path) -> StoreResult<Box<dyn DocumentStore>> {
    let store: Box<dyn DocumentStore> = match kind {
        StoreKind::Json => Box::new(JsonFileStore::new(path)),
        StoreKind::Sqlite => Box::new(SqliteDocumentStore::open(path)?),
        StoreKind::Memory => Box::new(MemoryDocumentStore::new()),
    };
    log::info!(
        "event=store_open module=repo status=ok kind={} path={}",
        kind,
        path.display()
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::{ReadFailurePolicy, StoreKind};

    #[test]
    fn store_kind_parses_case_insensitively() {
        assert_eq!(" SQLite ".parse::<StoreKind>(), Ok(StoreKind::Sqlite));
        assert_eq!("json".parse::<StoreKind>(), Ok(StoreKind::Json));
        let err = "postgres".parse::<StoreKind>().unwrap_err();
        assert!(err.contains("json|sqlite|memory"));
    }

    #[test]
    fn read_failure_policy_accepts_aliases() {
        assert_eq!(
            "recover".parse::<ReadFailurePolicy>(),
            Ok(ReadFailurePolicy::RecoverEmpty)
        );
        assert_eq!("strict".parse::<ReadFailurePolicy>(), Ok(ReadFailurePolicy::Fail));
        assert!("ignore".parse::<ReadFailurePolicy>().is_err());
    }
}
