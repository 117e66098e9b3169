//! Error types for the grid index.

use netcdf_parser::NetCdfError;
use thiserror::Error;

/// Errors that can occur while indexing or materializing grid data.
#[derive(Error, Debug)]
pub enum GridIndexError {
    /// A grid file could not be opened.
    #[error("failed to open grid file {path}: {reason}")]
    OpenFailed { path: String, reason: String },

    /// Rows could not be read from an open grid file.
    #[error("failed to read grid data: {0}")]
    ReadFailed(String),

    /// The requested global index range is empty or inverted.
    #[error("invalid range: start {start} must be less than end {end}")]
    InvalidRange { start: usize, end: usize },

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// The overlay lock was poisoned by a panicking writer.
    #[error("overlay store lock poisoned")]
    LockPoisoned,

    /// NetCDF decoding error.
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] NetCdfError),
}

impl GridIndexError {
    /// Create an OpenFailed error.
    pub fn open_failed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::OpenFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a ReadFailed error.
    pub fn read_failed(msg: impl Into<String>) -> Self {
        Self::ReadFailed(msg.into())
    }
}

impl From<std::io::Error> for GridIndexError {
    fn from(err: std::io::Error) -> Self {
        Self::ReadFailed(err.to_string())
    }
}

impl From<serde_yaml::Error> for GridIndexError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::ConfigError(err.to_string())
    }
}

/// Result type for grid index operations.
pub type Result<T> = std::result::Result<T, GridIndexError>;
