//! Request bodies sent to the gateway.
//!
//! One variant per operation, each with its own constructor. Bodies carry no
//! credentials; `appkey`/`authkey` are added by the credential's authenticate
//! rule right before sending.

use serde::Serialize;
use serde_json::{Map, Value};

use super::params::{
    KeyValue, NodeParameters, Operation, QuickReplyButton, Scalar, SendFreeformParams,
    SendTemplateParams,
};

/// Template id the gateway uses for free-form replies.
pub const FREEFORM_TEMPLATE_ID: &str = "chat_reply";

/// Language sent with free-form replies.
pub const FREEFORM_LANGUAGE: &str = "en";

/// Body of `POST /api/create-message`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateMessage {
    pub to: Scalar,
    pub template_id: Scalar,
    pub language: Scalar,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buttons: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// Body of `POST /api/create-message-json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreeformMessage {
    pub to: Vec<String>,
    pub template_id: &'static str,
    pub language: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buttons: Option<Map<String, Value>>,
}

/// Body of `POST /api/get_templates`; only the credentials are sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateListing {}

/// An outbound request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestBody {
    SendTemplate(TemplateMessage),
    SendFreeform(FreeformMessage),
    GetTemplates(TemplateListing),
}

impl RequestBody {
    /// Build the body for a templated message.
    pub fn send_template(params: &SendTemplateParams) -> Self {
        let (file, file_name) = if params.file.is_empty() {
            (None, None)
        } else {
            let name = (!params.file_name.is_empty()).then(|| params.file_name.clone());
            (Some(params.file.clone()), name)
        };

        Self::SendTemplate(TemplateMessage {
            to: params.to.clone(),
            template_id: params.template_id.clone(),
            language: params.language.clone(),
            variables: params.variables.as_deref().map(fold_pairs),
            buttons: params.buttons.as_deref().map(fold_pairs),
            file,
            file_name,
        })
    }

    /// Build the body for a free-form reply.
    pub fn send_freeform(params: &SendFreeformParams) -> Self {
        let buttons = if params.quick_reply_buttons.is_empty() {
            None
        } else {
            Some(quick_reply_buttons(&params.quick_reply_buttons))
        };

        Self::SendFreeform(FreeformMessage {
            to: split_recipients(&params.to),
            template_id: FREEFORM_TEMPLATE_ID,
            language: FREEFORM_LANGUAGE,
            message: params.message.clone(),
            buttons,
        })
    }

    /// Build the body for listing templates.
    pub fn get_templates() -> Self {
        Self::GetTemplates(TemplateListing {})
    }

    /// Build the body matching the item's parameters.
    pub fn from_params(params: &NodeParameters) -> Self {
        match params {
            NodeParameters::SendTemplate(p) => Self::send_template(p),
            NodeParameters::SendFreeform(p) => Self::send_freeform(p),
            NodeParameters::GetAll => Self::get_templates(),
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Self::SendTemplate(_) => Operation::SendTemplate,
            Self::SendFreeform(_) => Operation::SendFreeform,
            Self::GetTemplates(_) => Operation::GetAll,
        }
    }
}

/// Fold ordered `{key, value}` pairs into one object. Later keys overwrite
/// earlier ones.
pub fn fold_pairs(pairs: &[KeyValue]) -> Map<String, Value> {
    let mut out = Map::new();
    for pair in pairs {
        out.insert(pair.key.clone(), pair.value.clone());
    }
    out
}

/// Split a comma-separated recipient list. Segments are trimmed but empty
/// segments are kept.
pub fn split_recipients(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).collect()
}

/// Expand quick-reply buttons into `b{n}_type` / `b{n}_value` keys.
pub fn quick_reply_buttons(buttons: &[QuickReplyButton]) -> Map<String, Value> {
    let mut out = Map::new();
    for button in buttons {
        let n = &button.button_number;
        out.insert(
            format!("b{}_type", n),
            Value::String("quick_reply".to_string()),
        );
        out.insert(
            format!("b{}_value", n),
            Value::String(button.button_text.clone()),
        );
    }
    out
}
