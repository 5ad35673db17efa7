//! Platform-specific data directory resolution.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::PathError;

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "PAGECAST_DATA_DIR";

/// Get the root directory for application data (database, settings).
///
/// Resolution order:
/// 1. `PAGECAST_DATA_DIR` environment variable
/// 2. System data directory (e.g., `~/.local/share/pagecast`)
pub fn data_root() -> Result<PathBuf, PathError> {
    let override_dir = env::var_os(DATA_DIR_ENV).map(PathBuf::from);
    resolve_data_root(override_dir.as_deref())
}

/// Resolve the data root from an explicit override, falling back to the
/// system data directory. The directory is created if missing.
pub fn resolve_data_root(override_dir: Option<&Path>) -> Result<PathBuf, PathError> {
    let root = match override_dir {
        Some(path) if path.as_os_str().is_empty() => return Err(PathError::EmptyPath),
        Some(path) => path.to_path_buf(),
        None => dirs::data_local_dir()
            .ok_or(PathError::NoDataDir)?
            .join("pagecast"),
    };

    if root.exists() {
        if !root.is_dir() {
            return Err(PathError::NotADirectory(root));
        }
    } else {
        fs::create_dir_all(&root).map_err(|e| PathError::CreateFailed {
            path: root.clone(),
            reason: e.to_string(),
        })?;
    }

    Ok(root)
}
