//! Project-wide usage scan

use super::extract::extract_classes;
use super::usage_cache::{UsageCache, file_mtime};
use crate::catalog::PropertyCatalog;
use crate::discovery::{DEFAULT_EXTENSIONS, DefaultFileDiscovery, FileDiscovery};
use crate::result::ResultExt;
use crate::{QuantError, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Outcome of a usage scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageReport {
    /// Every distinct class observed, sorted
    pub used: Vec<String>,
    /// Classes whose tail (after the last colon) is not a known property
    pub unknown: Vec<String>,
}

impl UsageReport {
    /// Build a report from raw class names
    pub fn from_classes<I>(classes: I, catalog: &PropertyCatalog) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let used: Vec<String> = classes
            .into_iter()
            .filter(|class| !class.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let unknown = used
            .iter()
            .filter(|class| !catalog.contains(class_tail(class)))
            .cloned()
            .collect();
        Self { used, unknown }
    }
}

/// Segment after the last colon
pub fn class_tail(class: &str) -> &str {
    class.rsplit(':').next().unwrap_or(class)
}

/// Scans a content root for class usage, in parallel
pub struct ProjectScanner {
    root: PathBuf,
    extensions: Vec<String>,
    catalog: PropertyCatalog,
    cache: UsageCache,
    no_cache: bool,
}

impl ProjectScanner {
    /// Scanner over `root` with the default extensions and no persisted cache
    pub fn new(root: impl Into<PathBuf>, catalog: PropertyCatalog) -> Self {
        let root = root.into();
        Self {
            cache: UsageCache::in_memory(&root),
            root,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            catalog,
            no_cache: false,
        }
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Persist the per-file cache at `path`, keyed relative to `project_root`
    pub fn with_cache_file(mut self, path: impl Into<PathBuf>, project_root: impl Into<PathBuf>) -> Self {
        self.cache = UsageCache::load(path, project_root);
        self
    }

    /// Ignore cached entries (they are still refreshed and saved)
    pub fn no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scan(&self) -> Result<UsageReport> {
        let files = DefaultFileDiscovery::new(&self.root).discover_files(&self.extensions)?;
        self.cache.prune_stale();

        let per_file: Vec<Vec<String>> = files
            .par_iter()
            .filter_map(|file| self.scan_file(file).log_and_continue())
            .collect();

        if let Err(e) = self.cache.save() {
            tracing::warn!("Failed to save usage cache: {}", e);
        }

        let report = UsageReport::from_classes(per_file.into_iter().flatten(), &self.catalog);
        info!(
            "Scanned {} files: {} classes used, {} unknown",
            files.len(),
            report.used.len(),
            report.unknown.len()
        );
        Ok(report)
    }

    fn scan_file(&self, file: &Path) -> Result<Vec<String>> {
        let mtime = file_mtime(file)?;
        if !self.no_cache
            && let Some(classes) = self.cache.get(file, mtime)
        {
            return Ok(classes);
        }

        let source = fs::read_to_string(file).map_err(|e| {
            QuantError::scan_error(file, format!("failed to read content file: {e}"))
        })?;
        let classes = extract_classes(&source);
        debug!("{}: {} classes", file.display(), classes.len());
        self.cache.update(file, mtime, classes.clone());
        Ok(classes)
    }
}
