//! Per-file usage cache
//!
//! Maps a content file (relative to the project root) to its modification time
//! and the classes extracted from it. A file whose mtime is unchanged is not
//! re-read. The map is a `DashMap` so rayon workers can update it directly.

use crate::{QuantError, Result};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{debug, warn};

/// Default file name of the persisted usage cache
pub const DEFAULT_USAGE_CACHE_FILE: &str = ".quantcache.json";

/// Cached extraction result for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEntry {
    /// Modification time in milliseconds since the Unix epoch
    pub mtime: u64,
    pub classes: Vec<String>,
}

/// Usage cache for one project
#[derive(Debug)]
pub struct UsageCache {
    root: PathBuf,
    path: Option<PathBuf>,
    entries: DashMap<String, UsageEntry>,
}

impl UsageCache {
    /// Load the cache file at `path`; missing or corrupt files give an empty cache
    pub fn load(path: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries: DashMap<String, UsageEntry> = if path.exists() {
            match read_entries(&path) {
                Ok(map) => {
                    debug!("Loaded {} usage cache entries from {}", map.len(), path.display());
                    map.into_iter().collect()
                }
                Err(e) => {
                    warn!("Ignoring unreadable usage cache {}: {}", path.display(), e);
                    DashMap::new()
                }
            }
        } else {
            DashMap::new()
        };

        Self {
            root: root.into(),
            path: Some(path),
            entries,
        }
    }

    /// A cache that is never persisted
    pub fn in_memory(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            path: None,
            entries: DashMap::new(),
        }
    }

    /// Project-relative, forward-slash key for a file
    pub fn key(&self, file: &Path) -> String {
        let relative = file.strip_prefix(&self.root).unwrap_or(file);
        relative.to_string_lossy().replace('\\', "/")
    }

    /// Cached classes for `file` if its mtime is unchanged
    pub fn get(&self, file: &Path, mtime: u64) -> Option<Vec<String>> {
        self.entries
            .get(&self.key(file))
            .filter(|entry| entry.mtime == mtime)
            .map(|entry| entry.classes.clone())
    }

    pub fn update(&self, file: &Path, mtime: u64, classes: Vec<String>) {
        self.entries
            .insert(self.key(file), UsageEntry { mtime, classes });
    }

    /// Drop entries whose file no longer exists; returns how many were removed
    pub fn prune_stale(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| self.root.join(key).exists());
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!("Pruned {} stale usage cache entries", removed);
        }
        removed
    }

    /// Write the cache as JSON with sorted keys
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let sorted: BTreeMap<String, UsageEntry> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        let content = serde_json::to_string_pretty(&sorted)
            .map_err(|e| QuantError::cache_error(format!("Failed to serialize usage cache: {e}")))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| QuantError::io_error(parent, e))?;
        }
        fs::write(path, content).map_err(|e| QuantError::io_error(path, e))?;
        debug!("Saved {} usage cache entries to {}", sorted.len(), path.display());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn read_entries(path: &Path) -> std::result::Result<BTreeMap<String, UsageEntry>, String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&content).map_err(|e| e.to_string())
}

/// Modification time of a file in milliseconds since the Unix epoch
pub fn file_mtime(path: &Path) -> Result<u64> {
    let modified = fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|e| QuantError::io_error(path, e))?;
    let millis = modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    Ok(millis)
}
