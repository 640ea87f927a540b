//! Remote endpoint configuration.
//!
//! Reads the `[remote]` table of `~/.config/rtichat/config.toml`. A missing
//! file yields the defaults; a file that exists but does not parse is a
//! startup error, not a silent fallback.

use rtichat_core::error::{ChatError, Result};
use rtichat_infrastructure::paths::RtichatPaths;
use serde::Deserialize;
use std::fs;

/// Default backend endpoint, matching a local development server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Default request timeout. Assistant replies can take a while.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the HTTP conversation client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the backend API, including the version prefix.
    pub base_url: String,
    /// Bearer token attached to every request, when present.
    pub auth_token: Option<String>,
    /// User id forwarded with message sends, when the backend wants one.
    pub user_id: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_token: None,
            user_id: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Root structure of config.toml.
#[derive(Debug, Default, Deserialize)]
struct RootConfig {
    #[serde(default)]
    remote: RemoteConfig,
}

impl RemoteConfig {
    /// Loads the configuration from the default config file path.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::Config` if the file exists but cannot be read or
    /// parsed. A missing file is not an error.
    pub fn load() -> Result<Self> {
        let path = RtichatPaths::config_file()
            .map_err(|e| ChatError::config(format!("Failed to resolve config path: {e}")))?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            ChatError::config(format!(
                "Failed to read config file at {}: {}",
                path.display(),
                e
            ))
        })?;

        let root: RootConfig = toml::from_str(&content).map_err(|e| {
            ChatError::config(format!(
                "Failed to parse config file at {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(root.remote)
    }
}
