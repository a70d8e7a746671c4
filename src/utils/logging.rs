//! Logging initialization for waba-node.
//!
//! Supports three formats:
//! - `pretty`: tracing pretty-print (human-readable, coloured)
//! - `component`: `[timestamp] [LEVEL] target message {fields}`, compact and grep-friendly;
//!   use the [`log_component!`] macro to add a `component` field for per-subsystem filtering
//! - `json`: structured JSON lines for log aggregators
//!
//! Output goes to stderr so stdout stays free for node output records.

use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{Result, WabaError};

/// Build the filter: `RUST_LOG` wins, otherwise `cfg.level`.
fn env_filter(cfg: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level))
}

fn make_writer(cfg: &LoggingConfig) -> Result<BoxMakeWriter> {
    match &cfg.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            Ok(BoxMakeWriter::new(Mutex::new(file)))
        }
        None => Ok(BoxMakeWriter::new(std::io::stderr)),
    }
}

/// Initialize the global tracing subscriber from config.
///
/// Call this once at startup before any tracing events are emitted.
/// Fails if the log file cannot be opened or a subscriber is already set.
pub fn init_logging(cfg: &LoggingConfig) -> Result<()> {
    let filter = env_filter(cfg);
    let writer = make_writer(cfg)?;
    let ansi = cfg.file.is_none();

    let installed = match cfg.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(writer)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(filter)
            .with_ansi(ansi)
            .with_writer(writer)
            .try_init(),
        LogFormat::Component => tracing_subscriber::fmt()
            .compact()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(ansi)
            .with_writer(writer)
            .try_init(),
    };

    installed.map_err(|e| WabaError::Config(format!("failed to install logger: {}", e)))
}

/// Emit a component-tagged tracing event.
///
/// Works with any tracing level (`trace`, `debug`, `info`, `warn`, `error`).
/// The `component` field makes it easy to grep logs by subsystem:
///
/// ```
/// # use waba_node::log_component;
/// log_component!(info, "node", "executing batch");
/// log_component!(warn, "transport", "gateway slow", status = 503u16);
/// ```
#[macro_export]
macro_rules! log_component {
    ($level:ident, $component:expr, $msg:expr) => {
        tracing::$level!(component = $component, $msg)
    };
    ($level:ident, $component:expr, $msg:expr, $($key:ident = $val:expr),+ $(,)?) => {
        tracing::$level!(component = $component, $($key = $val,)+ $msg)
    };
}
