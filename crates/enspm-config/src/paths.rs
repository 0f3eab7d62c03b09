//! Well-known locations on disk.
//!
//! # Environment Variables
//!
//! - `ENSPM_CONFIG_DIR` - Override the directory holding `client.toml`, the
//!   session file and logs

use std::path::{Path, PathBuf};

/// Application name used for the platform config directory.
pub const APP_NAME: &str = "enspm";

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "ENSPM_CONFIG_DIR";

/// Client config filename.
pub const CLIENT_CONFIG_FILE: &str = "client.toml";

/// Get the XDG config directory for enspm.
///
/// Checks `ENSPM_CONFIG_DIR` first, then falls back to the platform default.
pub fn xdg_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the path to the client config file.
pub fn client_config_path() -> Option<PathBuf> {
    xdg_config_dir().map(|d| d.join(CLIENT_CONFIG_FILE))
}

/// Directory the default session file lives in.
pub fn session_dir() -> Option<PathBuf> {
    xdg_config_dir()
}

/// Directory for rolling log files.
pub fn log_dir() -> Option<PathBuf> {
    xdg_config_dir().map(|d| d.join("logs"))
}

/// Expand ~ to home directory in paths.
pub fn expand_path(path: &Path) -> PathBuf {
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/"))
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path() {
        let path = PathBuf::from("~/enspm/session.json");
        let expanded = expand_path(&path);
        if dirs::home_dir().is_some() {
            assert!(!expanded.to_str().unwrap().starts_with("~/"));
            assert!(expanded.ends_with("enspm/session.json"));
        }

        let absolute = PathBuf::from("/var/lib/enspm/session.json");
        assert_eq!(expand_path(&absolute), absolute);
    }

    #[test]
    fn test_derived_paths_share_root() {
        let (Some(root), Some(config), Some(logs)) =
            (xdg_config_dir(), client_config_path(), log_dir())
        else {
            return;
        };
        assert_eq!(config, root.join("client.toml"));
        assert_eq!(logs, root.join("logs"));
        assert_eq!(session_dir(), Some(root));
    }
}
