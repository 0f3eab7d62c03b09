//! Client configuration for connecting to an ENSPM Hub server.
//!
//! ```toml
//! server = "https://hub.enspm.cm"
//! timeout_secs = 30
//! single_flight_refresh = true
//! session_file = "~/.local/share/enspm/session.json"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::paths::{client_config_path, expand_path, session_dir};
use crate::{ConfigError, Result};

/// Server used when nothing else is configured.
pub const DEFAULT_SERVER: &str = "http://localhost:8000";

/// Session filename under the session directory.
const SESSION_FILE: &str = "enspm-auth-storage.json";

// ─────────────────────────────────────────────────────────────────────────────
// Client Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root client configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server root URL, without the `/api/v1` suffix.
    pub server: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Share one token refresh between concurrent 401s.
    pub single_flight_refresh: bool,

    /// Where to persist the session instead of the default location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            timeout_secs: 30,
            single_flight_refresh: true,
            session_file: None,
        }
    }
}

impl ClientConfig {
    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Set the server URL after checking its scheme.
    pub fn set_server(&mut self, server: impl Into<String>) -> Result<()> {
        let server = server.into();
        check_server(&server)?;
        self.server = server.trim_end_matches('/').to_string();
        Ok(())
    }

    /// Resolved session file path.
    ///
    /// Uses `session_file` if set (with `~` expanded), otherwise
    /// `<config_dir>/enspm-auth-storage.json`.
    pub fn session_path(&self) -> Option<PathBuf> {
        match &self.session_file {
            Some(path) => Some(expand_path(path)),
            None => session_dir().map(|d| d.join(SESSION_FILE)),
        }
    }

    fn validate(&self) -> Result<()> {
        check_server(&self.server)?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "timeout_secs".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn check_server(server: &str) -> Result<()> {
    if server.starts_with("http://") || server.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field: "server".to_string(),
            reason: format!("'{}' must start with http:// or https://", server),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Loading / Saving
// ─────────────────────────────────────────────────────────────────────────────

/// Load the client configuration.
///
/// Returns a default config if the file doesn't exist.
pub fn load_client_config() -> Result<ClientConfig> {
    load_client_config_from(client_config_path().as_deref())
}

/// Load client config from a specific path.
pub fn load_client_config_from(path: Option<&Path>) -> Result<ClientConfig> {
    let Some(path) = path else {
        return Ok(ClientConfig::default());
    };

    if !path.exists() {
        return Ok(ClientConfig::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;

    ClientConfig::from_toml(&contents)
}

/// Save the client configuration.
pub fn save_client_config(config: &ClientConfig) -> Result<PathBuf> {
    let path = client_config_path().ok_or(ConfigError::NoConfigDir)?;
    save_client_config_to(config, &path)?;
    Ok(path)
}

/// Save client config to a specific path.
pub fn save_client_config_to(config: &ClientConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFile {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let contents = config.to_toml()?;
    std::fs::write(path, contents).map_err(|e| ConfigError::WriteFile {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
