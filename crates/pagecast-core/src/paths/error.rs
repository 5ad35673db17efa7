//! Errors from locating the pagecast data directory.

use std::path::PathBuf;
use thiserror::Error;

/// Why the library location could not be resolved.
#[derive(Debug, Error)]
pub enum PathError {
    /// The platform has no per-user data directory and no override was given.
    #[error("No per-user data directory on this platform; set PAGECAST_DATA_DIR")]
    NoDataDir,

    #[error("Data path {0} is a file, expected a directory")]
    NotADirectory(PathBuf),

    #[error("Could not create {path}: {reason}")]
    CreateFailed { path: PathBuf, reason: String },

    /// `--data-dir ""` or an empty `PAGECAST_DATA_DIR`.
    #[error("Data directory override is empty")]
    EmptyPath,
}
