//! Error types for qaharvest.
//!
//! Library crates use [`HarvestError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Only page-level and infrastructure failures live here. Fragment-level
//! problems (a bad vote count, an empty tag) are recovered locally by the
//! assembler and never travel through this type.

use std::path::PathBuf;

/// Top-level error type for all qaharvest operations.
#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching a page or a discovery listing.
    #[error("network error: {0}")]
    Network(String),

    /// HTML, CSV or API payload could not be parsed.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Record sink failure (serialization or write).
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad URL, empty input, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A page is missing an element the record cannot be built without.
    #[error("{url}: required element not found: {element}")]
    StructuralLookup { url: String, element: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, HarvestError>;

impl HarvestError {
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

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// A required page element could not be located.
    pub fn structural(url: impl Into<String>, element: impl Into<String>) -> Self {
        Self::StructuralLookup {
            url: url.into(),
            element: element.into(),
        }
    }

    /// Whether this error aborts a single page only (the batch may continue).
    pub fn is_page_level(&self) -> bool {
        matches!(
            self,
            Self::StructuralLookup { .. } | Self::Network(_) | Self::Io { .. } | Self::Parse { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = HarvestError::config("bad selector");
        assert_eq!(err.to_string(), "config error: bad selector");

        let err = HarvestError::structural("https://example.com/q/1", "question title");
        assert_eq!(
            err.to_string(),
            "https://example.com/q/1: required element not found: question title"
        );
    }

    #[test]
    fn page_level_classification() {
        assert!(HarvestError::structural("u", "title").is_page_level());
        assert!(HarvestError::Network("timeout".into()).is_page_level());
        assert!(!HarvestError::config("x").is_page_level());
        assert!(!HarvestError::Storage("disk full".into()).is_page_level());
    }
}
