//! Error types for fetch operations

use std::path::PathBuf;

/// Errors that can occur while running the fetch engine
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The nvchecker executable could not be started
    #[error("nvchecker not found at {program}. Install it or pass its path explicitly.")]
    ProgramNotFound {
        /// The program that was invoked
        program: PathBuf,
    },

    /// Subprocess exited with an unexpected status
    #[error("Command failed (exit code {code}): {stderr}")]
    CommandFailed {
        /// Exit code from the subprocess
        code: i32,
        /// Captured stderr output
        stderr: String,
    },

    /// The merged configuration cannot be expressed as nvchecker TOML
    #[error("Failed to serialize nvchecker config: {0}")]
    Serialize(String),

    /// A version file could not be read back
    #[error("Failed to parse version file {path}: {message}")]
    ParseOutput { path: PathBuf, message: String },

    /// Invalid merged configuration
    #[error(transparent)]
    Core(#[from] matrix_core::Error),

    /// I/O error in the scratch directory
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for fetch operations
pub type Result<T> = std::result::Result<T, FetchError>;
