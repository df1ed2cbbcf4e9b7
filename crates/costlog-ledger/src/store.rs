// SPDX-FileCopyrightText: 2026 Costlog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Snapshot persistence for ledger state.
//!
//! Each experiment run owns one JSON file holding the full [`LedgerState`].
//! Every write replaces the whole file, so the stored record is always a
//! complete snapshot and never needs replay. Writes go through a temp file in
//! the same folder that is fsynced and renamed over the target; a crash
//! mid-write leaves the previous snapshot in place.
//!
//! The store never writes on its own initiative. Only the ledger's `record`
//! operation calls [`LogStore::write`].

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use costlog_core::CostLogError;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::ledger::LedgerState;

/// Extension of persisted ledger snapshots.
pub const LOG_EXTENSION: &str = "json";

/// Identity of one persisted ledger: the path of its snapshot file.
///
/// Derived once from experiment name and creation timestamp; never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogHandle {
    path: PathBuf,
}

impl LogHandle {
    /// Handle for an existing snapshot file.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// File name of the snapshot for `experiment_name` created at `creation_timestamp`.
pub fn log_file_name(experiment_name: &str, creation_timestamp: &str) -> String {
    format!("{experiment_name}_{creation_timestamp}.{LOG_EXTENSION}")
}

/// JSON snapshot store rooted at a log folder.
#[derive(Debug, Clone)]
pub struct LogStore {
    folder: PathBuf,
}

impl LogStore {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Create the backing file for a new experiment run.
    ///
    /// Creates the log folder (and parents) and writes an empty snapshot. An
    /// existing log with the same identity is reported as
    /// `StorageUnavailable` rather than overwritten.
    pub fn create(
        &self,
        experiment_name: &str,
        creation_timestamp: &str,
    ) -> Result<LogHandle, CostLogError> {
        fs::create_dir_all(&self.folder)
            .map_err(|e| CostLogError::storage(&self.folder, e))?;

        let handle = LogHandle {
            path: self
                .folder
                .join(log_file_name(experiment_name, creation_timestamp)),
        };
        let state = LedgerState::new(experiment_name, creation_timestamp);
        let tmp = self.stage(&handle, &state)?;
        tmp.persist_noclobber(&handle.path)
            .map_err(|e| CostLogError::storage(&handle.path, e.error))?;

        debug!(path = %handle.path.display(), "cost log created");
        Ok(handle)
    }

    /// Serialize the full snapshot and replace the stored representation.
    pub fn write(&self, handle: &LogHandle, state: &LedgerState) -> Result<(), CostLogError> {
        let tmp = self.stage(handle, state)?;
        tmp.persist(&handle.path)
            .map_err(|e| CostLogError::storage(&handle.path, e.error))?;

        debug!(
            path = %handle.path.display(),
            total_responses = state.total_responses,
            "cost log written"
        );
        Ok(())
    }

    /// Deserialize the snapshot behind `handle`.
    pub fn read(&self, handle: &LogHandle) -> Result<LedgerState, CostLogError> {
        read_path(&handle.path)
    }

    /// Write `state` to a synced temp file next to the target.
    fn stage(
        &self,
        handle: &LogHandle,
        state: &LedgerState,
    ) -> Result<NamedTempFile, CostLogError> {
        let dir = handle.path.parent().unwrap_or(self.folder.as_path());
        let json = to_json(state)?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".costlog-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| CostLogError::storage(dir, e))?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| CostLogError::storage(tmp.path(), e))?;
        Ok(tmp)
    }
}

/// Serialize a snapshot in the persisted format (pretty JSON).
pub fn to_json(state: &LedgerState) -> Result<String, CostLogError> {
    serde_json::to_string_pretty(state)
        .map_err(|e| CostLogError::Internal(format!("failed to serialize ledger state: {e}")))
}

/// Read a ledger snapshot from an arbitrary path.
///
/// A missing or unreadable file is `StorageUnavailable`; content that does
/// not parse as a ledger snapshot is `CorruptLog`.
pub fn read_path(path: &Path) -> Result<LedgerState, CostLogError> {
    let bytes = fs::read(path).map_err(|e| CostLogError::storage(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| CostLogError::corrupt(path, e))
}
