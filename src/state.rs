use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use uuid::Uuid;

use crate::fs_utils::{atomic_write, ensure_parent_dir};

/// State stored in <data dir>/state.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct State {
    /// Name of the last profile fully applied by audiodeck
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_profile: Option<String>,

    /// Id of that profile, which survives renames
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_profile_id: Option<Uuid>,

    /// When the state was last updated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl State {
    /// Read state from file, returning default if file doesn't exist
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {:?}", path))
    }

    /// Write state to file atomically (without locking - use LockedState for concurrent safety)
    pub fn write(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize state")?;
        atomic_write(path, content.as_bytes())
            .with_context(|| format!("Failed to write state file: {:?}", path))
    }
}

/// A locked state file handle.
///
/// Holding one serializes profile switches across processes: a second
/// `audiodeck --profile` blocks here until the first one finishes.
pub struct LockedState {
    file: File,
    state: State,
    path: std::path::PathBuf,
}

impl LockedState {
    /// Open and lock the state file for exclusive access
    pub fn lock(path: &Path) -> Result<Self> {
        ensure_parent_dir(path)
            .with_context(|| format!("Failed to create state directory for {:?}", path))?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("Failed to open state file: {:?}", path))?;

        // Blocks until available
        file.lock_exclusive()
            .with_context(|| format!("Failed to lock state file: {:?}", path))?;

        let state = Self::read_from_file(&file, path)?;

        Ok(Self {
            file,
            state,
            path: path.to_path_buf(),
        })
    }

    fn read_from_file(mut file: &File, path: &Path) -> Result<State> {
        let mut content = String::new();
        file.read_to_string(&mut content)
            .with_context(|| format!("Failed to read state file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(State::default());
        }

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {:?}", path))
    }

    /// Get the current state
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Update and save the state
    pub fn update<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut State),
    {
        f(&mut self.state);
        self.state.updated_at = Some(Utc::now());
        self.save()
    }

    fn save(&mut self) -> Result<()> {
        let content =
            serde_json::to_string_pretty(&self.state).context("Failed to serialize state")?;

        // The lock is tied to this handle, so rewrite in place rather than rename
        self.file
            .set_len(0)
            .with_context(|| format!("Failed to truncate state file: {:?}", self.path))?;
        self.file
            .seek(SeekFrom::Start(0))
            .with_context(|| format!("Failed to seek state file: {:?}", self.path))?;
        self.file
            .write_all(content.as_bytes())
            .with_context(|| format!("Failed to write state file: {:?}", self.path))?;
        self.file
            .sync_all()
            .with_context(|| format!("Failed to sync state file: {:?}", self.path))?;

        Ok(())
    }
}

impl Drop for LockedState {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
