//! Error types and handling for QuantCSS operations

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for QuantCSS operations
///
/// Parse problems and validation findings are not represented here: the
/// parser recovers locally and the validator reports diagnostics. This type
/// covers what can actually abort a build or a command.
#[derive(Debug, Error)]
pub enum QuantError {
    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cache-related errors (only raised when persisting; loading degrades to a cold cache)
    #[error("Cache error: {message}")]
    CacheError { message: String },

    /// Usage scanner errors
    #[error("Scan error in '{root}': {message}")]
    ScanError { root: PathBuf, message: String },

    /// File watcher errors
    #[error("Watch error for '{path}': {message}")]
    WatchError { path: PathBuf, message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Io,
    Cache,
    Scan,
    Watch,
    Internal,
}

impl QuantError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuantError::ConfigError { .. } => ErrorKind::Config,
            QuantError::IoError { .. } => ErrorKind::Io,
            QuantError::CacheError { .. } => ErrorKind::Cache,
            QuantError::ScanError { .. } => ErrorKind::Scan,
            QuantError::WatchError { .. } => ErrorKind::Watch,
            QuantError::InternalError { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error is recoverable (processing of other inputs can continue)
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Cache | ErrorKind::Scan)
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create a cache error
    pub fn cache_error(message: impl Into<String>) -> Self {
        Self::CacheError {
            message: message.into(),
        }
    }

    /// Create a scan error
    pub fn scan_error(root: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ScanError {
            root: root.into(),
            message: message.into(),
        }
    }

    /// Create a watch error
    pub fn watch_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::WatchError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for QuantError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}
