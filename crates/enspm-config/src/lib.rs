//! Configuration for the ENSPM Hub command line.
//!
//! Provides a small TOML client config (`client.toml`) with:
//! - The server root URL and request timeout
//! - Whether concurrent 401s share a single token refresh
//! - An optional override for where the session is persisted
//!
//! Files live under the XDG config directory, overridable with
//! `ENSPM_CONFIG_DIR`.

pub mod client;
pub mod error;
pub mod paths;

pub use client::{
    DEFAULT_SERVER, ClientConfig, load_client_config, load_client_config_from, save_client_config,
    save_client_config_to,
};
pub use error::{ConfigError, Result};
pub use paths::{client_config_path, log_dir, session_dir, xdg_config_dir};
