//! Error types for careerwatch.
//!
//! Library crates use [`CareerWatchError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all careerwatch operations.
#[derive(Debug, thiserror::Error)]
pub enum CareerWatchError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching the careers page or posting a webhook.
    #[error("network error: {0}")]
    Network(String),

    /// A bounded wait ran out.
    #[error("timed out after {secs}s: {what}")]
    Timeout { what: String, secs: u64 },

    /// Markup or embedded page data could not be parsed.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Seen-set persistence error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Notification delivery error.
    #[error("notification error: {0}")]
    Notification(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CareerWatchError>;

impl CareerWatchError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a timeout error for the named operation.
    pub fn timeout(what: impl Into<String>, secs: u64) -> Self {
        Self::Timeout {
            what: what.into(),
            secs,
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = CareerWatchError::config("keywords.target must be a list");
        assert_eq!(err.to_string(), "config error: keywords.target must be a list");

        let err = CareerWatchError::timeout("fetch https://openai.com/careers/search/", 30);
        assert_eq!(
            err.to_string(),
            "timed out after 30s: fetch https://openai.com/careers/search/"
        );
    }

    #[test]
    fn io_error_keeps_path() {
        let err = CareerWatchError::io(
            "/tmp/known_jobs.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("known_jobs.json"));
    }
}
