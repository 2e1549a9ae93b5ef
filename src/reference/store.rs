//! Reference data store
//!
//! Holds the loaded analyte table for the whole process. Readers take a
//! cheap `Arc` snapshot; a reload parses the file completely before swapping
//! the snapshot, so readers only ever see a complete table.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use thiserror::Error;

use super::analyte::{AnalyteRecord, AnalyteTable};

/// Reference data error types
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Reference data file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Reference data schema error: {0}")]
    Schema(String),

    #[error("Reference data I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for reference data operations
pub type DataResult<T> = Result<T, DataError>;

/// Shared handle to the process-wide analyte table
#[derive(Clone)]
pub struct ReferenceData {
    path: PathBuf,
    table: Arc<RwLock<Arc<AnalyteTable>>>,
    reload_lock: Arc<Mutex<()>>,
}

impl ReferenceData {
    /// Load the dataset at `path`; fails if the file is missing or malformed
    pub fn open<P: AsRef<Path>>(path: P) -> DataResult<Self> {
        let path = path.as_ref().to_path_buf();
        let table = AnalyteTable::load(&path)?;
        tracing::info!(
            "Loaded {} analytes from {}",
            table.len(),
            path.display()
        );
        Ok(Self::from_table(path, table))
    }

    /// Wrap an already-validated table
    pub fn from_table(path: PathBuf, table: AnalyteTable) -> Self {
        Self {
            path,
            table: Arc::new(RwLock::new(Arc::new(table))),
            reload_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Current table; stays valid even if a reload happens afterwards
    pub fn snapshot(&self) -> Arc<AnalyteTable> {
        // A poisoned lock still guards a complete table
        let guard = self.table.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Case-insensitive lookup against the current table
    pub fn lookup(&self, name: &str) -> Option<AnalyteRecord> {
        self.snapshot().lookup(name).cloned()
    }

    /// Analyte names in load order
    pub fn list_all(&self) -> Vec<String> {
        self.snapshot().list_all()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the backing file and replace the table in one step.
    ///
    /// Reloads are serialized. On failure the previous table stays in
    /// service and the error is returned.
    pub fn reload(&self) -> DataResult<usize> {
        let _serialized = self.reload_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let fresh = match AnalyteTable::load(&self.path) {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!("Reload of {} failed, keeping previous data: {}", self.path.display(), e);
                return Err(e);
            }
        };
        let count = fresh.len();

        {
            let mut guard = self.table.write().unwrap_or_else(PoisonError::into_inner);
            *guard = Arc::new(fresh);
        }

        tracing::info!("Reloaded {} analytes from {}", count, self.path.display());
        Ok(count)
    }
}
