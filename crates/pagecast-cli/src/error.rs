//! CLI-specific error types and mappings.
//!
//! Domain errors are mapped to `CliError` so `main` can pick an exit code.

use pagecast_core::{CoreError, LibraryError, PathError, RepositoryError};
use pagecast_voice::PlaybackError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Core domain error.
    #[error("{0}")]
    Core(String),

    /// Argument error (unknown document, bad value).
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// The document yielded no readable text.
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// Audio output error.
    #[error("Playback error: {0}")]
    Playback(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Core(_) => 1,
            Self::Arguments(_) => 2,  // EX_USAGE
            Self::Extraction(_) => 65, // EX_DATAERR
            Self::Playback(_) => 69,   // EX_UNAVAILABLE
            Self::Io(_) => 74,         // EX_IOERR
            Self::Database(_) => 73,   // EX_CANTCREAT (closest fit)
            Self::Config(_) => 78,     // EX_CONFIG
        }
    }
}

impl From<RepositoryError> for CliError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => Self::Arguments(format!("{what} not found")),
            other => Self::Database(other.to_string()),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Repository(repo_err) => repo_err.into(),
            CoreError::Settings(settings_err) => Self::Config(settings_err.to_string()),
        }
    }
}

impl From<LibraryError> for CliError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::ExtractionFailure(msg) => Self::Extraction(msg),
            LibraryError::Repository(repo_err) => repo_err.into(),
        }
    }
}

impl From<PlaybackError> for CliError {
    fn from(err: PlaybackError) -> Self {
        Self::Playback(err.to_string())
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
