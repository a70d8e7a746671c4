//! Declarative node description rendered by the host.

use serde_json::{json, Value};

use crate::credentials::CREDENTIAL_NAME;

use super::params::{Operation, Resource};

pub const NODE_NAME: &str = "waba";
pub const NODE_DISPLAY_NAME: &str = "WABA";
pub const NODE_VERSION: u32 = 1;

/// Subtitle shown under the node, e.g. `sendTemplate: message`.
pub fn subtitle(resource: Resource, operation: Operation) -> String {
    format!("{}: {}", operation, resource)
}

fn show(resource: &str, operation: &str) -> Value {
    json!({
        "show": {
            "resource": [resource],
            "operation": [operation]
        }
    })
}

fn key_value_collection(
    name: &str,
    display: &str,
    item: &str,
    item_display: &str,
    key_hint: &str,
    value_hint: &str,
) -> Value {
    json!({
        "displayName": display,
        "name": name,
        "type": "fixedCollection",
        "typeOptions": {"multipleValues": true},
        "default": {},
        "description": format!("Template {}", name),
        "options": [{
            "name": item,
            "displayName": item_display,
            "values": [
                {
                    "displayName": "Key",
                    "name": "key",
                    "type": "string",
                    "default": "",
                    "description": key_hint
                },
                {
                    "displayName": "Value",
                    "name": "value",
                    "type": "string",
                    "default": "",
                    "description": value_hint
                }
            ]
        }]
    })
}

/// Full node description: identity, credentials and the property list.
pub fn describe() -> Value {
    json!({
        "displayName": NODE_DISPLAY_NAME,
        "name": NODE_NAME,
        "icon": "file:waba.svg",
        "group": ["transform"],
        "version": NODE_VERSION,
        "subtitle": "={{$parameter[\"operation\"] + \": \" + $parameter[\"resource\"]}}",
        "description": "Send messages and manage templates via WABA API",
        "defaults": {"name": NODE_DISPLAY_NAME},
        "inputs": ["main"],
        "outputs": ["main"],
        "credentials": [{"name": CREDENTIAL_NAME, "required": true}],
        "properties": properties()
    })
}

/// Node parameters in form order.
pub fn properties() -> Vec<Value> {
    let send_template = show("message", "sendTemplate");
    let send_freeform = show("message", "sendFreeform");

    vec![
        json!({
            "displayName": "Resource",
            "name": "resource",
            "type": "options",
            "noDataExpression": true,
            "options": [
                {"name": "Message", "value": Resource::Message.as_str()},
                {"name": "Template", "value": Resource::Template.as_str()}
            ],
            "default": Resource::Message.as_str()
        }),
        json!({
            "displayName": "Operation",
            "name": "operation",
            "type": "options",
            "noDataExpression": true,
            "displayOptions": {"show": {"resource": ["message"]}},
            "options": [
                {
                    "name": "Send Template",
                    "value": Operation::SendTemplate.as_str(),
                    "description": "Send a templated message",
                    "action": "Send a templated message"
                },
                {
                    "name": "Send Freeform",
                    "value": Operation::SendFreeform.as_str(),
                    "description": "Send a free-form reply message",
                    "action": "Send a freeform message"
                }
            ],
            "default": Resource::Message.default_operation().as_str()
        }),
        json!({
            "displayName": "Operation",
            "name": "operation",
            "type": "options",
            "noDataExpression": true,
            "displayOptions": {"show": {"resource": ["template"]}},
            "options": [{
                "name": "Get All",
                "value": Operation::GetAll.as_str(),
                "description": "Get all approved templates",
                "action": "Get all approved templates"
            }],
            "default": Resource::Template.default_operation().as_str()
        }),
        json!({
            "displayName": "To",
            "name": "to",
            "type": "string",
            "required": true,
            "displayOptions": send_template,
            "default": "",
            "placeholder": "919876543210",
            "description": "Recipient phone number (with country code)"
        }),
        json!({
            "displayName": "Template ID",
            "name": "templateId",
            "type": "string",
            "required": true,
            "displayOptions": send_template,
            "default": "",
            "description": "The template ID to use"
        }),
        json!({
            "displayName": "Language",
            "name": "language",
            "type": "string",
            "displayOptions": send_template,
            "default": "en",
            "description": "Template language code"
        }),
        json!({
            "displayName": "Additional Fields",
            "name": "additionalFields",
            "type": "collection",
            "placeholder": "Add Field",
            "default": {},
            "displayOptions": send_template,
            "options": [
                key_value_collection(
                    "variables",
                    "Variables",
                    "variable",
                    "Variable",
                    "Variable name (e.g., v1, v2)",
                    "Variable value"
                ),
                key_value_collection(
                    "buttons",
                    "Buttons",
                    "button",
                    "Button",
                    "Button key (e.g., b1_type, b1_value)",
                    "Button value"
                ),
                {
                    "displayName": "File",
                    "name": "file",
                    "type": "string",
                    "default": "",
                    "description": "File URL or base64 string"
                },
                {
                    "displayName": "File Name",
                    "name": "fileName",
                    "type": "string",
                    "default": "",
                    "description": "File name (when file is provided)"
                }
            ]
        }),
        json!({
            "displayName": "To",
            "name": "toFreeform",
            "type": "string",
            "required": true,
            "displayOptions": send_freeform,
            "default": "",
            "placeholder": "919876543210,919876543211",
            "description": "Recipient phone number(s), comma-separated for multiple"
        }),
        json!({
            "displayName": "Message",
            "name": "message",
            "type": "string",
            "typeOptions": {"rows": 4},
            "required": true,
            "displayOptions": send_freeform,
            "default": "",
            "description": "The free-form message text to send"
        }),
        json!({
            "displayName": "Quick Reply Buttons",
            "name": "quickReplyButtons",
            "type": "fixedCollection",
            "typeOptions": {"multipleValues": true},
            "default": {},
            "displayOptions": send_freeform,
            "description": "Optional quick reply buttons",
            "options": [{
                "name": "button",
                "displayName": "Button",
                "values": [
                    {
                        "displayName": "Button Number",
                        "name": "buttonNumber",
                        "type": "number",
                        "default": 1,
                        "description": "Button number (1, 2, 3, etc.)"
                    },
                    {
                        "displayName": "Button Text",
                        "name": "buttonText",
                        "type": "string",
                        "default": "",
                        "description": "Button text to display"
                    }
                ]
            }]
        }),
    ]
}

/// Names of the parameters that must be set for an operation.
pub fn required_parameters(operation: Operation) -> Vec<String> {
    properties()
        .iter()
        .filter(|p| p["required"].as_bool().unwrap_or(false))
        .filter(|p| {
            p["displayOptions"]["show"]["operation"]
                .as_array()
                .is_some_and(|ops| ops.iter().any(|o| o == operation.as_str()))
        })
        .filter_map(|p| p["name"].as_str().map(str::to_string))
        .collect()
}
