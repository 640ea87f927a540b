//! Unified path management for rtichat files on disk.
//!
//! All rtichat configuration and cached state live under one directory,
//! resolved per platform via the `dirs` crate.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for rtichat.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/rtichat/           # Config directory (platform-resolved)
/// ├── config.toml              # Remote endpoint configuration
/// └── snapshot.json            # Persisted session snapshot
/// ```
pub struct RtichatPaths;

impl RtichatPaths {
    /// Returns the rtichat configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/rtichat/`)
    /// - `Err(PathError::ConfigDirNotFound)`: Could not determine directory
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join("rtichat"))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the persisted session snapshot.
    pub fn snapshot_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("snapshot.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_file_lives_in_config_dir() {
        let dir = RtichatPaths::config_dir().unwrap();
        let file = RtichatPaths::snapshot_file().unwrap();
        assert!(file.starts_with(&dir));
        assert_eq!(file.file_name().unwrap(), "snapshot.json");
    }
}
