//! Whole-build cache keyed by two content hashes
//!
//! One record holds the SHA-256 of the DSL source, the SHA-256 of the used
//! class set and the rule texts produced from them. A build whose two hashes
//! both match reuses the rules and skips the pipeline entirely.

use crate::{QuantError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Format version of the persisted record
pub const CACHE_VERSION: u32 = 1;

/// Default file name of the persisted record
pub const DEFAULT_BUILD_CACHE_FILE: &str = ".quant-jitcache.json";

/// Persisted build record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JitCache {
    pub version: u32,
    pub source_hash: String,
    pub used_hash: String,
    /// Compilation settings the rules were produced under
    #[serde(default)]
    pub settings: String,
    pub css: Vec<String>,
}

impl JitCache {
    pub fn new(source_hash: impl Into<String>, used_hash: impl Into<String>, css: Vec<String>) -> Self {
        Self {
            version: CACHE_VERSION,
            source_hash: source_hash.into(),
            used_hash: used_hash.into(),
            settings: String::new(),
            css,
        }
    }

    pub fn with_settings(mut self, settings: impl Into<String>) -> Self {
        self.settings = settings.into();
        self
    }

    /// True when both inputs are unchanged since this record was written
    pub fn is_fresh(&self, source_hash: &str, used_hash: &str) -> bool {
        self.version == CACHE_VERSION && self.source_hash == source_hash && self.used_hash == used_hash
    }
}

/// Hex SHA-256 of the raw DSL source
pub fn hash_source(source: &str) -> String {
    format!("{:x}", Sha256::digest(source.as_bytes()))
}

/// Hex SHA-256 of the used-class set
///
/// The classes are sorted and deduplicated, then newline-joined, so scan order
/// does not affect the key.
pub fn hash_used<S: AsRef<str>>(used: &[S]) -> String {
    let mut classes: Vec<&str> = used.iter().map(AsRef::as_ref).collect();
    classes.sort_unstable();
    classes.dedup();
    format!("{:x}", Sha256::digest(classes.join("\n").as_bytes()))
}

/// Single-slot storage for the build record
pub trait CacheStore {
    /// Read the record; absent or unreadable data is `None`
    fn load(&self) -> Option<JitCache>;

    fn save(&self, record: &JitCache) -> Result<()>;
}

/// Record stored as pretty JSON in one file
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    path: PathBuf,
}

impl FileCacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheStore for FileCacheStore {
    fn load(&self) -> Option<JitCache> {
        if !self.path.exists() {
            debug!("No build cache at {}", self.path.display());
            return None;
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read build cache {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<JitCache>(&content) {
            Ok(record) if record.version == CACHE_VERSION => Some(record),
            Ok(record) => {
                debug!(
                    "Ignoring build cache with version {} (expected {})",
                    record.version, CACHE_VERSION
                );
                None
            }
            Err(e) => {
                warn!("Ignoring corrupt build cache {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn save(&self, record: &JitCache) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| QuantError::io_error(parent, e))?;
        }
        let content = serde_json::to_string_pretty(record)
            .map_err(|e| QuantError::cache_error(format!("Failed to serialize build cache: {e}")))?;
        fs::write(&self.path, content).map_err(|e| QuantError::io_error(&self.path, e))?;
        debug!("Saved build cache to {}", self.path.display());
        Ok(())
    }
}

/// In-process store, used when persistence is off and in tests
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    slot: Mutex<Option<JitCache>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: JitCache) -> Self {
        Self {
            slot: Mutex::new(Some(record)),
        }
    }

    pub fn record(&self) -> Option<JitCache> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl CacheStore for MemoryCacheStore {
    fn load(&self) -> Option<JitCache> {
        self.record()
    }

    fn save(&self, record: &JitCache) -> Result<()> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(record.clone());
        Ok(())
    }
}

/// Store that never remembers anything (`--no-cache`)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCacheStore;

impl CacheStore for NoopCacheStore {
    fn load(&self) -> Option<JitCache> {
        None
    }

    fn save(&self, _record: &JitCache) -> Result<()> {
        Ok(())
    }
}
