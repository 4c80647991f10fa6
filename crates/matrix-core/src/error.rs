//! Error types for matrix-core

use std::path::PathBuf;

/// Result type for matrix-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in matrix-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration tree root does not exist
    #[error("Configuration directory not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Reference (matrix) tree root does not exist
    #[error("Matrix directory not found at {path}")]
    MatrixNotFound { path: PathBuf },

    /// A product descriptor is structurally invalid
    #[error("Invalid product descriptor at {path}: {message}")]
    InvalidDescriptor { path: PathBuf, message: String },

    /// The `__config__` table could not be interpreted
    #[error("Invalid global options: {0}")]
    InvalidOptions(#[source] serde_json::Error),

    /// Filesystem error from matrix-fs
    #[error(transparent)]
    Fs(#[from] matrix_fs::Error),
}
