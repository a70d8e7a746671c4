//! waba-node - WABA gateway node for workflow automation hosts
//!
//! Sends template and free-form WhatsApp messages and lists approved
//! templates through a WABA gateway, one gateway call per input record.

pub mod config;
pub mod credentials;
pub mod error;
pub mod node;
pub mod transport;
pub mod utils;

pub use config::Config;
pub use credentials::WabaCredentials;
pub use error::{Result, WabaError};
pub use node::{InputRecord, OutputRecord, WabaNode};
pub use transport::{HttpTransport, ReqwestTransport};
