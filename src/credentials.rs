//! WABA API credentials.
//!
//! Holds the three values an operator configures once (API URL, app key and
//! auth key), the declarative descriptor the host renders as a form, and the
//! authenticate rule that places `appkey`/`authkey` into every request body.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{Result, WabaError};

/// Credential type name the node refers to.
pub const CREDENTIAL_NAME: &str = "wabaApi";

/// Default gateway base URL.
pub const DEFAULT_API_URL: &str = "https://waba.nxccontrols.in";

const DOCUMENTATION_URL: &str =
    "https://waba.nxccontrols.in/blog/how-to-connect-whatsapp-business-api-to-n8n";

/// Resolved WABA credentials.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WabaCredentials {
    /// Base URL of the gateway
    pub api_url: String,
    /// Application key
    pub app_key: String,
    /// Authentication key (secret)
    pub auth_key: String,
}

impl Default for WabaCredentials {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            app_key: String::new(),
            auth_key: String::new(),
        }
    }
}

// auth_key never reaches logs through `{:?}`.
impl fmt::Debug for WabaCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WabaCredentials")
            .field("api_url", &self.api_url)
            .field("app_key", &self.app_key)
            .field("auth_key", &"[REDACTED]")
            .finish()
    }
}

impl WabaCredentials {
    /// Create credentials for the given gateway.
    pub fn new(api_url: &str, app_key: &str, auth_key: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            app_key: app_key.to_string(),
            auth_key: auth_key.to_string(),
        }
    }

    /// Check that both required keys are present.
    pub fn validate(&self) -> Result<()> {
        if self.app_key.trim().is_empty() {
            return Err(WabaError::Config(
                "credentials.app_key is required; set it in config.json or \
                 WABA_CREDENTIALS_APP_KEY"
                    .into(),
            ));
        }
        if self.auth_key.trim().is_empty() {
            return Err(WabaError::Config(
                "credentials.auth_key is required; set it in config.json or \
                 WABA_CREDENTIALS_AUTH_KEY"
                    .into(),
            ));
        }
        Ok(())
    }

    /// API URL with a single trailing `/` removed.
    ///
    /// Only one slash is stripped: `https://host//` becomes `https://host/`.
    pub fn base_url(&self) -> &str {
        self.api_url.strip_suffix('/').unwrap_or(&self.api_url)
    }

    /// Join an endpoint path (starting with `/`) onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// The authenticate rule bound to these credentials.
    pub fn authenticator(&self) -> Authenticate<'_> {
        Authenticate { credentials: self }
    }
}

/// Generic body authentication: adds `appkey` and `authkey` to a JSON body.
#[derive(Debug, Clone, Copy)]
pub struct Authenticate<'a> {
    credentials: &'a WabaCredentials,
}

impl Authenticate<'_> {
    /// Inject the keys into `body`. The body must be a JSON object.
    pub fn apply(&self, body: &mut Value) -> Result<()> {
        let obj = body.as_object_mut().ok_or_else(|| {
            WabaError::Parameter("request body must be a JSON object".to_string())
        })?;
        obj.insert(
            "appkey".to_string(),
            Value::String(self.credentials.app_key.clone()),
        );
        obj.insert(
            "authkey".to_string(),
            Value::String(self.credentials.auth_key.clone()),
        );
        Ok(())
    }
}

/// A single field of the credential form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialProperty {
    pub display_name: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub default: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub password: bool,
    pub description: &'static str,
}

/// Declarative description of the `wabaApi` credential type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDescriptor {
    pub name: &'static str,
    pub display_name: &'static str,
    pub documentation_url: &'static str,
    pub properties: Vec<CredentialProperty>,
    pub authenticate: Value,
}

/// Build the credential descriptor.
pub fn describe() -> CredentialDescriptor {
    CredentialDescriptor {
        name: CREDENTIAL_NAME,
        display_name: "WABA API",
        documentation_url: DOCUMENTATION_URL,
        properties: vec![
            CredentialProperty {
                display_name: "API URL",
                name: "apiUrl",
                kind: "string",
                default: DEFAULT_API_URL,
                placeholder: Some(DEFAULT_API_URL),
                required: false,
                password: false,
                description: "The base URL for the WABA API",
            },
            CredentialProperty {
                display_name: "App Key",
                name: "appKey",
                kind: "string",
                default: "",
                placeholder: None,
                required: true,
                password: false,
                description: "Your WABA application key",
            },
            CredentialProperty {
                display_name: "Auth Key",
                name: "authKey",
                kind: "string",
                default: "",
                placeholder: None,
                required: true,
                password: true,
                description: "Your WABA authentication key",
            },
        ],
        authenticate: json!({
            "type": "generic",
            "properties": {
                "body": {
                    "appkey": "={{$credentials.appKey}}",
                    "authkey": "={{$credentials.authKey}}"
                }
            }
        }),
    }
}
