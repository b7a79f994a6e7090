//! Error types for template analysis and deck generation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while analyzing templates or building decks.
#[derive(Error, Debug)]
pub enum Error {
    /// The input template or document does not exist.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The document extension is not recognized.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// A format-specific reader was not compiled into this build.
    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    /// Required configuration (such as an API credential) is absent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An external service call failed. The AI-assisted analyzer absorbs these.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error.
    #[error("ZIP error: {0}")]
    Zip(String),

    /// XML parsing or writing error.
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The template package is structurally unusable.
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// A template descriptor is missing required archetype data.
    #[error("Invalid template descriptor: {0}")]
    InvalidDescriptor(String),
}
