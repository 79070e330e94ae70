//! Class usage scanning
//!
//! Content files are walked in parallel, class attributes are extracted with
//! regexes and per-file results are cached by modification time.

pub mod extract;
pub mod scan;
pub mod usage_cache;

pub use extract::{clean_source, extract_classes};
pub use scan::{ProjectScanner, UsageReport, class_tail};
pub use usage_cache::{DEFAULT_USAGE_CACHE_FILE, UsageCache, UsageEntry, file_mtime};
