//! Error types for carbonarr.
//!
//! Every fallible operation in the crate returns [`Result`], built on the
//! [`CarbonarrError`] enum below.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for carbonarr operations.
#[derive(Error, Debug)]
pub enum CarbonarrError {
    /// A layer source path does not exist
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Malformed vector data
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// A basemap name missing from the catalog
    #[error("Unknown basemap: {name}")]
    Resolution { name: String },

    /// Invalid argument errors (control positions, layer options)
    #[error("Invalid argument: {param} - {message}")]
    InvalidArgument { param: String, message: String },

    /// Raster source could not be opened or georeferenced
    #[error("Raster error: {message}")]
    Raster { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CarbonarrError {
    /// Shorthand for a [`CarbonarrError::InvalidArgument`]
    pub fn invalid_argument(param: impl Into<String>, message: impl Into<String>) -> Self {
        CarbonarrError::InvalidArgument {
            param: param.into(),
            message: message.into(),
        }
    }
}

/// Convenience type alias for Results with CarbonarrError
pub type Result<T> = std::result::Result<T, CarbonarrError>;
