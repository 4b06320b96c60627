//! Cached access to the combined dataset.
//!
//! The dataset is parsed once and kept until the file on disk changes
//! (modification time or length) or the caller forces a refresh.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::Dataset;
use dashboard_data::reader::load_dataset;

/// File identity used to detect changes on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl FileStamp {
    fn read(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DashboardError::DatasetNotFound(path.to_path_buf()),
            _ => DashboardError::FileRead {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        Ok(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

// ── DataManager ───────────────────────────────────────────────────────────────

/// File-change-aware cache around [`load_dataset`].
///
/// # Example
/// ```no_run
/// use dashboard_runtime::data_manager::DataManager;
///
/// let mut mgr = DataManager::new("combined_dataset.csv");
/// let dataset = mgr.get_dataset(false).expect("dataset loads");
/// println!("{} records", dataset.len());
/// ```
pub struct DataManager {
    path: PathBuf,
    cache: Option<Dataset>,
    /// Stamp of the file the cache was loaded from.
    cache_stamp: Option<FileStamp>,
    /// Incremented on every successful reload.
    generation: u64,
    last_error: Option<String>,
}

impl DataManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: None,
            cache_stamp: None,
            generation: 0,
            last_error: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return the dataset, reloading it when the file changed.
    ///
    /// When `force_refresh` is `true` the cache is bypassed. A failed reload
    /// drops the cache, so stale data is never served after the file
    /// changed.
    pub fn get_dataset(&mut self, force_refresh: bool) -> Result<&Dataset> {
        let stamp = match FileStamp::read(&self.path) {
            Ok(stamp) => stamp,
            Err(e) => return Err(self.fail(e)),
        };

        if !force_refresh && self.cache.is_some() && self.cache_stamp == Some(stamp) {
            tracing::debug!("returning cached dataset");
        } else {
            match load_dataset(&self.path) {
                Ok(dataset) => {
                    self.generation += 1;
                    tracing::debug!(
                        records = dataset.len(),
                        generation = self.generation,
                        "dataset cache updated"
                    );
                    self.cache = Some(dataset);
                    self.cache_stamp = Some(stamp);
                    self.last_error = None;
                }
                Err(e) => return Err(self.fail(e)),
            }
        }

        self.cache
            .as_ref()
            .ok_or_else(|| DashboardError::DatasetNotFound(self.path.clone()))
    }

    /// Discard the current cache, forcing the next call to reload.
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
        self.cache_stamp = None;
        tracing::debug!("cache invalidated");
    }

    /// The cached dataset, without checking the file.
    pub fn cached(&self) -> Option<&Dataset> {
        self.cache.as_ref()
    }

    /// Number of successful loads so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Human-readable description of the last load error, or `None`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn fail(&mut self, error: DashboardError) -> DashboardError {
        tracing::warn!(error = %error, path = %self.path.display(), "dataset load failed");
        self.invalidate_cache();
        self.last_error = Some(error.to_string());
        error
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
