//! Error types for the record collector.
//!
//! Only failures that happen outside a parse pass are errors: opening a
//! source, building a configuration, serializing output. Malformed markup
//! inside a pass is captured on the collector as a
//! [`ParseFailure`](crate::event::ParseFailure) and never surfaces here.

use thiserror::Error;

/// Main error type for the bookshelf library.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Tag or attribute name that is not a valid XML local name.
    #[error("Invalid tag name: '{0}'. Expected an XML name without prefix (e.g., book)")]
    InvalidTag(String),

    /// The same tag was configured both as the record tag and as a field tag.
    #[error("Tag <{0}> cannot be both the record tag and a field tag")]
    ConflictingTag(String),

    /// IO error while opening or reading a source.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for bookshelf operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
