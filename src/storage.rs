//! Persistence of the roster as a single serialized blob.
//!
//! The whole collection is rewritten on every mutation. The dataset is small
//! and the medium is a local file, so there is no incremental encoding and no
//! cross-process coordination (concurrent writers are last-writer-wins).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::warn;

use crate::model::StudentRecord;

/// Fixed storage key; the roster lives at `<data-dir>/<STORAGE_KEY>.json`.
pub const STORAGE_KEY: &str = "dtm-students";

/// Error reading or writing the stored roster.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode roster: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable round-trip of the full collection.
///
/// The roster calls `save` after every successful mutation and `load` exactly
/// once at startup, so implementations never see partial updates.
pub trait RosterStore {
    /// Read the persisted collection. An absent blob is an empty roster.
    fn load(&self) -> Result<Vec<StudentRecord>, StorageError>;

    /// Overwrite the persisted blob with the full collection.
    fn save(&self, students: &[StudentRecord]) -> Result<(), StorageError>;
}

/// File-backed store holding the roster as a JSON array under the fixed key.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(format!("{STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RosterStore for JsonFileStore {
    fn load(&self) -> Result<Vec<StudentRecord>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&raw) {
            Ok(students) => Ok(students),
            // An unreadable blob is recovered from, not fatal: start empty and
            // let the next save replace it.
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "stored roster is unreadable, starting empty"
                );
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, students: &[StudentRecord]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string(students)?)?;
        Ok(())
    }
}

/// In-memory store for tests and benchmarks. Clones share the same backing
/// collection, so a test can hand one to a roster and inspect it afterwards.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    students: Arc<Mutex<Vec<StudentRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RosterStore for MemoryStore {
    fn load(&self) -> Result<Vec<StudentRecord>, StorageError> {
        Ok(self.students.lock().unwrap().clone())
    }

    fn save(&self, students: &[StudentRecord]) -> Result<(), StorageError> {
        *self.students.lock().unwrap() = students.to_vec();
        Ok(())
    }
}
