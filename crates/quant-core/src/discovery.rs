//! Content file discovery and change watching
//!
//! Discovery walks the content root and keeps files whose extension is in the
//! configured list. The watcher bridges `notify` events into a tokio channel
//! with per-path debouncing, for `quant dev`.

use crate::{QuantError, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc as tokio_mpsc;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Markup and template extensions scanned for class usage
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "html", "htm", "js", "jsx", "ts", "tsx", "vue", "svelte", "pug",
];

/// Directories never descended into
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git", "target", "dist"];

/// Finds content files under a root
pub trait FileDiscovery {
    fn discover_files(&self, extensions: &[String]) -> Result<Vec<PathBuf>>;

    fn should_include(&self, path: &Path, extensions: &[String]) -> bool {
        has_extension(path, extensions)
    }
}

/// Walks the content root with `walkdir`
#[derive(Debug, Clone)]
pub struct DefaultFileDiscovery {
    pub root_dir: PathBuf,
}

impl DefaultFileDiscovery {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }
}

impl FileDiscovery for DefaultFileDiscovery {
    fn discover_files(&self, extensions: &[String]) -> Result<Vec<PathBuf>> {
        if !self.root_dir.is_dir() {
            return Err(QuantError::scan_error(
                &self.root_dir,
                "content root is not a directory",
            ));
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&self.root_dir)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                let name = entry.file_name().to_string_lossy();
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !SKIPPED_DIRS.contains(&name.as_ref())
            })
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| self.should_include(path, extensions))
            .collect();

        files.sort();
        debug!(
            "Discovered {} content files in {}",
            files.len(),
            self.root_dir.display()
        );
        Ok(files)
    }
}

/// Case-insensitive extension check
pub fn has_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|allowed| allowed.as_ref().eq_ignore_ascii_case(&ext))
        })
}

/// File change event
#[derive(Debug, Clone)]
pub struct FileChangeEvent {
    pub path: PathBuf,
    pub kind: FileChangeKind,
    pub timestamp: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChangeKind {
    Created,
    Modified,
    Deleted,
}

/// Recursive watcher over one or more roots
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    receiver: tokio_mpsc::UnboundedReceiver<FileChangeEvent>,
    debounce_duration: Duration,
    last_events: HashMap<PathBuf, Instant>,
}

impl FileWatcher {
    /// Watch every existing root recursively; missing roots are skipped
    pub fn new<P: AsRef<Path>>(roots: &[P]) -> Result<Self> {
        let (tx, rx) = tokio_mpsc::unbounded_channel();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let kind = match event.kind {
                    EventKind::Create(_) => FileChangeKind::Created,
                    EventKind::Remove(_) => FileChangeKind::Deleted,
                    EventKind::Modify(_) => FileChangeKind::Modified,
                    _ => return,
                };

                for path in event.paths {
                    let change = FileChangeEvent {
                        path,
                        kind,
                        timestamp: Instant::now(),
                    };
                    if let Err(e) = tx.send(change) {
                        warn!("Failed to send file change event: {}", e);
                    }
                }
            }
            Err(e) => warn!("File watcher error: {}", e),
        })
        .map_err(|e| QuantError::watch_error(".", format!("Failed to create file watcher: {e}")))?;

        for root in roots {
            let root = root.as_ref();
            if !root.exists() {
                warn!("Not watching {}: path does not exist", root.display());
                continue;
            }
            watcher
                .watch(root, RecursiveMode::Recursive)
                .map_err(|e| QuantError::watch_error(root, format!("Failed to watch: {e}")))?;
            debug!("Watching {}", root.display());
        }

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            debounce_duration: Duration::from_millis(100),
            last_events: HashMap::new(),
        })
    }

    /// Next change, skipping repeats of the same path inside the debounce window
    pub async fn next_event(&mut self) -> Option<FileChangeEvent> {
        while let Some(event) = self.receiver.recv().await {
            let now = Instant::now();

            if let Some(last) = self.last_events.get(&event.path)
                && now.duration_since(*last) < self.debounce_duration
            {
                continue;
            }

            self.last_events.insert(event.path.clone(), now);
            self.last_events
                .retain(|_, &mut last| now.duration_since(last) < Duration::from_secs(60));

            return Some(event);
        }
        None
    }

    /// First event (waiting) plus whatever follows within a short quiet period
    pub async fn next_events_batch(&mut self, max_batch_size: usize) -> Vec<FileChangeEvent> {
        let mut events = Vec::new();

        match self.next_event().await {
            Some(first) => events.push(first),
            None => return events,
        }

        while events.len() < max_batch_size {
            match tokio::time::timeout(self.debounce_duration, self.next_event()).await {
                Ok(Some(event)) => events.push(event),
                _ => break,
            }
        }

        events
    }

    pub fn set_debounce_duration(&mut self, duration: Duration) {
        self.debounce_duration = duration;
    }

    pub fn debounce_duration(&self) -> Duration {
        self.debounce_duration
    }

    pub fn has_pending_events(&self) -> bool {
        !self.receiver.is_empty()
    }

    /// Keep events whose path has one of `extensions`
    pub fn filter_by_extension<S: AsRef<str>>(
        events: Vec<FileChangeEvent>,
        extensions: &[S],
    ) -> Vec<FileChangeEvent> {
        events
            .into_iter()
            .filter(|event| has_extension(&event.path, extensions))
            .collect()
    }
}
