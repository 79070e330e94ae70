//! Result type alias for QuantCSS operations

use crate::error::QuantError;

/// Standard Result type for QuantCSS operations
pub type Result<T> = std::result::Result<T, QuantError>;

/// Extension trait for Result to provide additional convenience methods
pub trait ResultExt<T> {
    /// Convert an error to a recoverable error if possible
    fn recoverable(self) -> Result<Option<T>>;

    /// Log the error and continue with None
    fn log_and_continue(self) -> Option<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn recoverable(self) -> Result<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_recoverable() => {
                tracing::warn!("Recoverable error: {}", err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn log_and_continue(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                if err.is_recoverable() {
                    tracing::warn!("Continuing after error: {}", err);
                } else {
                    tracing::error!("Skipping after error: {}", err);
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_passes_through_fatal() {
        let fatal: Result<()> = Err(QuantError::internal_error("boom"));
        assert!(fatal.recoverable().is_err());

        let soft: Result<()> = Err(QuantError::cache_error("corrupt"));
        assert!(matches!(soft.recoverable(), Ok(None)));
    }

    #[test]
    fn test_log_and_continue() {
        let ok: Result<u8> = Ok(3);
        assert_eq!(ok.log_and_continue(), Some(3));

        let err: Result<u8> = Err(QuantError::io_error("x", std::io::Error::other("x")));
        assert_eq!(err.log_and_continue(), None);
    }
}
