//! Persistence of the "last announcement shown" marker.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors from an announcement store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode announcement record: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Where the last shown announcement id is kept
pub trait AnnouncementStore: Send + Sync {
    /// Id of the last announcement shown, if any
    fn last_shown(&self) -> Result<Option<String>, StoreError>;

    /// Record `id` as shown
    fn mark_shown(&self, id: &str) -> Result<(), StoreError>;
}

/// In-memory store, forgotten on exit
#[derive(Debug, Default)]
pub struct MemoryAnnouncementStore {
    last_shown: RwLock<Option<String>>,
}

impl MemoryAnnouncementStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnnouncementStore for MemoryAnnouncementStore {
    fn last_shown(&self) -> Result<Option<String>, StoreError> {
        Ok(self.last_shown.read().clone())
    }

    fn mark_shown(&self, id: &str) -> Result<(), StoreError> {
        *self.last_shown.write() = Some(id.to_string());
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnouncementRecord {
    #[serde(default)]
    last_shown_announcement_id: Option<String>,
}

/// JSON file store, written atomically
#[derive(Debug, Clone)]
pub struct FileAnnouncementStore {
    path: PathBuf,
}

impl FileAnnouncementStore {
    /// Store backed by the file at `path` (created on first write)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn ensure_parent_dir(&self) -> Result<(), StoreError> {
        let Some(dir) = self.path.parent() else {
            return Ok(());
        };
        if dir.as_os_str().is_empty() || dir.exists() {
            return Ok(());
        }
        fs::create_dir_all(dir).map_err(|e| self.io_error(dir, e))?;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o700))
            .map_err(|e| self.io_error(dir, e))
    }
}

impl AnnouncementStore for FileAnnouncementStore {
    fn last_shown(&self) -> Result<Option<String>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(&self.path, e)),
        };

        let record: AnnouncementRecord =
            serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;
        Ok(record.last_shown_announcement_id)
    }

    fn mark_shown(&self, id: &str) -> Result<(), StoreError> {
        self.ensure_parent_dir()?;

        let record = AnnouncementRecord {
            last_shown_announcement_id: Some(id.to_string()),
        };
        let json = serde_json::to_string_pretty(&record).map_err(StoreError::Encode)?;

        let temp_path = self.path.with_extension("tmp");
        // leftover from an interrupted write
        let _ = fs::remove_file(&temp_path);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .map_err(|e| self.io_error(&temp_path, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| self.io_error(&temp_path, e))?;
        file.sync_all().map_err(|e| self.io_error(&temp_path, e))?;

        fs::rename(&temp_path, &self.path).map_err(|e| self.io_error(&self.path, e))?;

        debug!("Recorded announcement {} as shown in {:?}", id, self.path);
        Ok(())
    }
}
