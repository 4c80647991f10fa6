//! Error types for matrix-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from matrix-core
    #[error(transparent)]
    Core(#[from] matrix_core::Error),

    /// Error from matrix-fs
    #[error(transparent)]
    Fs(#[from] matrix_fs::Error),

    /// Error from the fetch engine
    #[error(transparent)]
    Fetch(#[from] matrix_fetch::FetchError),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The fetch engine could not check every configured item
    #[error("Version fetch reported failures; no report written")]
    FetchFailed,

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
