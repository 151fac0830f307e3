//! Storage layout for taskdeck
//!
//! Everything lives in one data directory:
//!
//! ```text
//! <data_dir>/
//!   taskdeck.toml               # Optional configuration
//!   <slot_key>.json             # The task collection (JSON array)
//!   <slot_key>.json.lock        # Advisory lock taken while writing
//! ```
//!
//! The data directory is chosen from (first match wins): the `--data-dir`
//! flag or `TASKDECK_DIR`, `storage.data_dir` in the config file, then the
//! platform data directory.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::{Error, Result};
use crate::lock;
use crate::slot::DurableSlot;

/// Configuration file name inside the data directory
pub const CONFIG_FILE: &str = "taskdeck.toml";

/// Storage manager for taskdeck state
#[derive(Debug, Clone)]
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Platform default, e.g. `~/.local/share/taskdeck` on Linux
    pub fn default_data_dir() -> Result<PathBuf> {
        ProjectDirs::from("", "", "taskdeck")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                Error::InvalidConfig(
                    "could not determine a home directory; pass --data-dir".to_string(),
                )
            })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    pub fn slot_file(&self, slot_key: &str) -> PathBuf {
        self.data_dir.join(format!("{slot_key}.json"))
    }

    pub fn open_slot(&self, slot_key: &str, lock_timeout_ms: u64) -> FileSlot {
        FileSlot::new(self.slot_file(slot_key), lock_timeout_ms)
    }
}

/// Slot backed by a single JSON file, replaced atomically on every write.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
    lock_timeout_ms: u64,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>, lock_timeout_ms: u64) -> Self {
        Self {
            path: path.into(),
            lock_timeout_ms,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DurableSlot for FileSlot {
    fn read(&self) -> Result<Option<Vec<u8>>> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "task slot is empty");
            return Ok(None);
        }
        let data = fs::read(&self.path)?;
        tracing::debug!(path = %self.path.display(), bytes = data.len(), "read task slot");
        Ok(Some(data))
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        lock::write_atomic_locked(&self.path, data, self.lock_timeout_ms).map_err(|err| {
            tracing::debug!(path = %self.path.display(), error = %err, "task slot write failed");
            Error::Persistence(format!("{}: {err}", self.path.display()))
        })?;
        tracing::debug!(path = %self.path.display(), bytes = data.len(), "wrote task slot");
        Ok(())
    }
}
