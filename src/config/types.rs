//! Configuration type definitions for waba-node
//!
//! All types implement serde traits for JSON serialization and have sensible defaults.

use serde::{Deserialize, Serialize};

pub use crate::credentials::WabaCredentials;

/// Main configuration struct for waba-node
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gateway credentials (API URL, app key, auth key)
    pub credentials: WabaCredentials,
    /// Node execution options
    pub node: NodeConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

// ============================================================================
// Node Configuration
// ============================================================================

/// Node execution options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Record item errors as `{ "error": ... }` outputs instead of aborting the batch.
    pub continue_on_fail: bool,
}

// ============================================================================
// Logging Configuration
// ============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable, coloured output
    Pretty,
    /// Compact `[LEVEL] target message {fields}` lines
    #[default]
    Component,
    /// JSON lines for log aggregators
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "component" => Ok(Self::Component),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Default filter level when `RUST_LOG` is unset
    pub level: String,
    /// Optional log file (appended to); stderr when unset
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: "info".to_string(),
            file: None,
        }
    }
}
