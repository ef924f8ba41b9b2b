//! JSON file backend (`{"students": [...]}`, pretty-printed).
//!
//! # Invariants
//! - Writes go to a sibling temp file that is renamed over the target, so a
//!   crash leaves either the previous or the new document on disk.
//! - A missing or empty file reads as an empty roster.

use crate::model::RosterDocument;
use crate::repo::document_store::{DocumentStore, StoreResult};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("roster"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl DocumentStore for JsonFileStore {
    fn read(&self) -> StoreResult<RosterDocument> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Ok(RosterDocument::default());
            }
            Err(err) => return Err(err.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(RosterDocument::default());
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    fn write(&self, document: &RosterDocument) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let bytes = serde_json::to_vec_pretty(document)?;
        let temp_path = self.temp_path();
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}
