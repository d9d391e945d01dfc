//! Error types for triangle field generation and rendering

use thiserror::Error;

/// Errors that can occur while triangulating, configuring or exporting a field
#[derive(Debug, Error)]
pub enum FieldError {
    /// Three points share a y coordinate (within epsilon), so no circumcircle exists
    #[error("coincident points: {i}, {j}, {k}")]
    CoincidentPoints { i: usize, j: usize, k: usize },
    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A color string could not be parsed
    #[error("invalid color: {0}")]
    InvalidColor(String),
    /// The requested backend cannot produce output on this system
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    /// Image encoding failed
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    /// Writing an export failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for triangle field operations
pub type Result<T> = std::result::Result<T, FieldError>;
