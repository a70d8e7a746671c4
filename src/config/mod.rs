//! Configuration management for waba-node
//!
//! Configuration is loaded from `~/.waba-node/config.json` with environment
//! variable overrides.

mod types;
pub mod validate;

pub use types::*;

use crate::error::Result;
use std::path::{Path, PathBuf};

impl Config {
    /// Returns the waba-node configuration directory path (~/.waba-node)
    pub fn dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".waba-node")
    }

    /// Returns the path to the config file (~/.waba-node/config.json)
    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load configuration from the default path with environment overrides.
    ///
    /// If the config file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::path())
    }

    /// Load configuration from a specific path with environment overrides.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Environment variables follow the pattern: WABA_SECTION_KEY
    fn apply_env_overrides(&mut self) {
        // Credentials
        if let Ok(val) = std::env::var("WABA_CREDENTIALS_API_URL") {
            self.credentials.api_url = val;
        }
        if let Ok(val) = std::env::var("WABA_CREDENTIALS_APP_KEY") {
            self.credentials.app_key = val;
        }
        if let Ok(val) = std::env::var("WABA_CREDENTIALS_AUTH_KEY") {
            self.credentials.auth_key = val;
        }

        // Node
        if let Ok(val) = std::env::var("WABA_NODE_CONTINUE_ON_FAIL") {
            if let Ok(v) = val.parse() {
                self.node.continue_on_fail = v;
            }
        }

        // Logging
        if let Ok(val) = std::env::var("WABA_LOGGING_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("WABA_LOGGING_FORMAT") {
            if let Ok(v) = val.parse() {
                self.logging.format = v;
            }
        }
    }
}
