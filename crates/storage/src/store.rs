// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One JSON document per workspace key.
//!
//! Layout: `<data_dir>/<session>/<user>/<repo>.json`. Each file has exactly
//! one writer and one reader (the owning actor), so there is no locking;
//! saves are atomic (write `.tmp`, fsync, rename) so a crash never leaves a
//! half-written record. The provider is the ground truth — a lost or corrupt
//! record only costs a list/create round on the next cold start.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use porter_core::{MachineId, WorkspaceKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Errors from state store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt record at {path}: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("key component unsafe for filesystem: {0:?}")]
    InvalidKey(String),
}

/// Persisted state for one workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineRecord {
    pub machine_id: MachineId,
    /// Epoch milliseconds when the machine was first adopted or created
    #[serde(default)]
    pub created_at_ms: u64,
}

/// Filesystem-backed store of [`MachineRecord`]s
#[derive(Debug, Clone)]
pub struct StateStore {
    data_dir: PathBuf,
}

impl StateStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load the record for a key.
    ///
    /// A missing file is `Ok(None)`. Unparseable JSON is `Err(Corrupt)`;
    /// callers treat that as absent and recreate rather than poisoning the
    /// workspace.
    pub fn load(&self, key: &WorkspaceKey) -> Result<Option<MachineRecord>, StoreError> {
        let path = self.record_path(key)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&content) {
            Ok(record) => Ok(Some(record)),
            Err(source) => {
                warn!(path = %path.display(), error = %source, "corrupt machine record");
                Err(StoreError::Corrupt { path, source })
            }
        }
    }

    /// Save the record atomically (write to `.tmp`, fsync, rename).
    pub fn save(&self, key: &WorkspaceKey, record: &MachineRecord) -> Result<(), StoreError> {
        let path = self.record_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, record).map_err(std::io::Error::other)?;
            writer.flush()?;
            writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        }
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Path of the record for a key.
    ///
    /// The key constructor already guarantees hostname-safe components; this
    /// re-checks for path separators as defense in depth before touching the
    /// filesystem.
    fn record_path(&self, key: &WorkspaceKey) -> Result<PathBuf, StoreError> {
        for component in [key.session.as_str(), &key.user, &key.repo] {
            check_path_component(component)?;
        }
        Ok(self
            .data_dir
            .join(key.session.as_str())
            .join(&key.user)
            .join(format!("{}.json", key.repo)))
    }
}

fn check_path_component(component: &str) -> Result<(), StoreError> {
    let unsafe_component = component.is_empty()
        || component == "."
        || component == ".."
        || component.contains(['/', '\\', '\0']);
    if unsafe_component {
        return Err(StoreError::InvalidKey(component.to_string()));
    }
    Ok(())
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
