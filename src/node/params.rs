//! Typed node parameters.
//!
//! The host hands each item its resolved parameter values as a loose JSON map
//! keyed by parameter name. [`NodeParameters::from_map`] turns that map into
//! one strongly-typed struct per operation before anything is dispatched, so
//! the request builders never look parameters up by name.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{Result, WabaError};

/// Top-level entity category exposed by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    Message,
    Template,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Template => "template",
        }
    }

    /// Operation selected when the item does not name one.
    pub fn default_operation(&self) -> Operation {
        match self {
            Self::Message => Operation::SendTemplate,
            Self::Template => Operation::GetAll,
        }
    }

    fn parse(raw: &str) -> Result<Self> {
        match raw {
            "message" => Ok(Self::Message),
            "template" => Ok(Self::Template),
            other => Err(WabaError::Parameter(format!(
                "The resource '{}' is not known",
                other
            ))),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action performed on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    SendTemplate,
    SendFreeform,
    GetAll,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SendTemplate => "sendTemplate",
            Self::SendFreeform => "sendFreeform",
            Self::GetAll => "getAll",
        }
    }

    /// The resource this operation belongs to.
    pub fn resource(&self) -> Resource {
        match self {
            Self::SendTemplate | Self::SendFreeform => Resource::Message,
            Self::GetAll => Resource::Template,
        }
    }

    /// Gateway endpoint path, relative to the base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::SendTemplate => "/api/create-message",
            Self::SendFreeform => "/api/create-message-json",
            Self::GetAll => "/api/get_templates",
        }
    }

    fn parse(resource: Resource, raw: &str) -> Result<Self> {
        let op = match raw {
            "sendTemplate" => Self::SendTemplate,
            "sendFreeform" => Self::SendFreeform,
            "getAll" => Self::GetAll,
            other => {
                return Err(WabaError::Parameter(format!(
                    "The operation '{}' is not known",
                    other
                )))
            }
        };
        if op.resource() != resource {
            return Err(WabaError::Parameter(format!(
                "The operation '{}' is not supported for resource '{}'",
                op, resource
            )));
        }
        Ok(op)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn empty_string_value() -> Value {
    Value::String(String::new())
}

/// One `{key, value}` entry of a variables or buttons collection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeyValue {
    #[serde(default)]
    pub key: String,
    #[serde(default = "empty_string_value")]
    pub value: Value,
}

impl KeyValue {
    pub fn new(key: &str, value: impl Into<Value>) -> Self {
        Self {
            key: key.to_string(),
            value: value.into(),
        }
    }
}

/// A scalar parameter value as the host resolved it.
///
/// Expressions such as `{{$json.phone}}` often resolve to numbers, so text
/// parameters accept any JSON scalar. Objects and arrays are rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(Number),
    Bool(bool),
    Null,
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<u64> for Scalar {
    fn from(n: u64) -> Self {
        Self::Number(Number::from(n))
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(Self::Text(s)),
            Value::Number(n) => Ok(Self::Number(n)),
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::Null => Ok(Self::Null),
            Value::Array(_) => Err(de::Error::custom("expected a string or number, got an array")),
            Value::Object(_) => Err(de::Error::custom("expected a string or number, got an object")),
        }
    }
}

impl fmt::Display for Scalar {
    /// Renders the way the host interpolates values into strings; integral
    /// floats render without a fraction (`2.0` -> `2`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Null => f.write_str("null"),
            Self::Number(n) => {
                if n.is_f64() {
                    match n.as_f64() {
                        Some(v) if v == 0.0 => f.write_str("0"),
                        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{:.0}", v),
                        _ => write!(f, "{}", n),
                    }
                } else {
                    write!(f, "{}", n)
                }
            }
        }
    }
}

/// Deserialize any scalar as its rendered text; `null` becomes empty.
fn scalar_text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        Some(value) => value.to_string(),
        None => String::new(),
    })
}

fn default_button_number() -> Scalar {
    Scalar::from(1u64)
}

/// One quick-reply button of a freeform message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickReplyButton {
    #[serde(default = "default_button_number")]
    pub button_number: Scalar,
    #[serde(default, deserialize_with = "scalar_text")]
    pub button_text: String,
}

impl QuickReplyButton {
    pub fn new(number: u64, text: &str) -> Self {
        Self {
            button_number: Scalar::from(number),
            button_text: text.to_string(),
        }
    }
}

/// Parameters of `message: sendTemplate`.
#[derive(Debug, Clone, PartialEq)]
pub struct SendTemplateParams {
    pub to: Scalar,
    pub template_id: Scalar,
    pub language: Scalar,
    /// `None` when the variables collection was not supplied at all.
    pub variables: Option<Vec<KeyValue>>,
    /// `None` when the buttons collection was not supplied at all.
    pub buttons: Option<Vec<KeyValue>>,
    pub file: String,
    pub file_name: String,
}

/// Parameters of `message: sendFreeform`.
#[derive(Debug, Clone, PartialEq)]
pub struct SendFreeformParams {
    /// Comma-separated recipients, exactly as entered.
    pub to: String,
    pub message: String,
    pub quick_reply_buttons: Vec<QuickReplyButton>,
}

/// Typed parameters for one item, one variant per operation.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeParameters {
    SendTemplate(SendTemplateParams),
    SendFreeform(SendFreeformParams),
    GetAll,
}

// --- host parameter shapes ---

const DEFAULT_LANGUAGE: &str = "en";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSendTemplate {
    #[serde(default)]
    to: Option<Scalar>,
    #[serde(default)]
    template_id: Option<Scalar>,
    #[serde(default)]
    language: Option<Scalar>,
    #[serde(default)]
    additional_fields: Option<RawAdditionalFields>,
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawAdditionalFields {
    variables: Option<RawVariables>,
    buttons: Option<RawButtons>,
    file: Option<Scalar>,
    file_name: Option<Scalar>,
}

#[derive(Deserialize)]
struct RawVariables {
    #[serde(default)]
    variable: Option<Vec<KeyValue>>,
}

#[derive(Deserialize)]
struct RawButtons {
    #[serde(default)]
    button: Option<Vec<KeyValue>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSendFreeform {
    #[serde(default)]
    to_freeform: Option<Scalar>,
    #[serde(default)]
    message: Option<Scalar>,
    #[serde(default)]
    quick_reply_buttons: Option<RawQuickReplyButtons>,
}

#[derive(Deserialize)]
struct RawQuickReplyButtons {
    #[serde(default)]
    button: Option<Vec<QuickReplyButton>>,
}

fn text_or_empty(value: Option<Scalar>) -> String {
    value
        .filter(|v| !v.is_null())
        .map(|v| v.to_string())
        .unwrap_or_default()
}

/// A required scalar; absent and `null` values are missing.
fn required(operation: Operation, name: &str, value: Option<Scalar>) -> Result<Scalar> {
    value.ok_or_else(|| {
        WabaError::Parameter(format!(
            "{}: missing required parameter '{}'",
            operation, name
        ))
    })
}

fn string_param<'a>(params: &'a Map<String, Value>, name: &str) -> Result<Option<&'a str>> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(WabaError::Parameter(format!(
            "Parameter '{}' must be a string, got {}",
            name, other
        ))),
    }
}

impl NodeParameters {
    /// Resolve the resource and operation of an item without reading the
    /// operation-specific fields.
    pub fn selection(params: &Map<String, Value>) -> Result<(Resource, Operation)> {
        let resource = match string_param(params, "resource")? {
            Some(raw) => Resource::parse(raw)?,
            None => Resource::Message,
        };
        let operation = match string_param(params, "operation")? {
            Some(raw) => Operation::parse(resource, raw)?,
            None => resource.default_operation(),
        };
        Ok((resource, operation))
    }

    /// Build typed parameters from the host's parameter map.
    pub fn from_map(params: &Map<String, Value>) -> Result<Self> {
        let (_, operation) = Self::selection(params)?;
        let raw = Value::Object(params.clone());
        let invalid =
            |e: serde_json::Error| WabaError::Parameter(format!("{}: {}", operation, e));

        match operation {
            Operation::SendTemplate => {
                let raw: RawSendTemplate = serde_json::from_value(raw).map_err(invalid)?;
                let extra = raw.additional_fields.unwrap_or_default();
                Ok(Self::SendTemplate(SendTemplateParams {
                    to: required(operation, "to", raw.to)?,
                    template_id: required(operation, "templateId", raw.template_id)?,
                    language: raw
                        .language
                        .unwrap_or_else(|| Scalar::from(DEFAULT_LANGUAGE)),
                    variables: extra.variables.and_then(|v| v.variable),
                    buttons: extra.buttons.and_then(|b| b.button),
                    file: text_or_empty(extra.file),
                    file_name: text_or_empty(extra.file_name),
                }))
            }
            Operation::SendFreeform => {
                let raw: RawSendFreeform = serde_json::from_value(raw).map_err(invalid)?;
                Ok(Self::SendFreeform(SendFreeformParams {
                    to: required(operation, "toFreeform", raw.to_freeform)?.to_string(),
                    message: required(operation, "message", raw.message)?.to_string(),
                    quick_reply_buttons: raw
                        .quick_reply_buttons
                        .and_then(|q| q.button)
                        .unwrap_or_default(),
                }))
            }
            Operation::GetAll => Ok(Self::GetAll),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_selection_defaults_to_send_template() {
        let (r, op) = NodeParameters::selection(&Map::new()).unwrap();
        assert_eq!(r, Resource::Message);
        assert_eq!(op, Operation::SendTemplate);
    }

    #[test]
    fn test_selection_template_defaults_to_get_all() {
        let (r, op) = NodeParameters::selection(&map(json!({"resource": "template"}))).unwrap();
        assert_eq!(r, Resource::Template);
        assert_eq!(op, Operation::GetAll);
    }

    #[test]
    fn test_selection_rejects_mismatched_operation() {
        let err = NodeParameters::selection(&map(json!({
            "resource": "template",
            "operation": "sendFreeform"
        })))
        .unwrap_err();
        assert!(err.to_string().contains("not supported for resource 'template'"));
    }

    #[test]
    fn test_selection_rejects_unknown_resource() {
        let err = NodeParameters::selection(&map(json!({"resource": "contact"}))).unwrap_err();
        assert!(matches!(err, WabaError::Parameter(_)));
    }

    #[test]
    fn test_selection_rejects_non_string_operation() {
        let err = NodeParameters::selection(&map(json!({"operation": 3}))).unwrap_err();
        assert!(err.to_string().contains("must be a string"));
    }

    #[test]
    fn test_send_template_full() {
        let params = NodeParameters::from_map(&map(json!({
            "resource": "message",
            "operation": "sendTemplate",
            "to": "919876543210",
            "templateId": "welcome",
            "language": "hi",
            "additionalFields": {
                "variables": {"variable": [{"key": "v1", "value": "Asha"}]},
                "buttons": {"button": [{"key": "b1_type", "value": "url"}]},
                "file": "https://cdn.example/a.pdf",
                "fileName": "a.pdf"
            }
        })))
        .unwrap();

        let NodeParameters::SendTemplate(p) = params else {
            panic!("expected sendTemplate");
        };
        assert_eq!(p.to, Scalar::from("919876543210"));
        assert_eq!(p.template_id, Scalar::from("welcome"));
        assert_eq!(p.language, Scalar::from("hi"));
        assert_eq!(p.variables, Some(vec![KeyValue::new("v1", "Asha")]));
        assert_eq!(p.buttons, Some(vec![KeyValue::new("b1_type", "url")]));
        assert_eq!(p.file, "https://cdn.example/a.pdf");
        assert_eq!(p.file_name, "a.pdf");
    }

    #[test]
    fn test_send_template_defaults() {
        let params = NodeParameters::from_map(&map(json!({
            "to": "1",
            "templateId": "t"
        })))
        .unwrap();
        let NodeParameters::SendTemplate(p) = params else {
            panic!("expected sendTemplate");
        };
        assert_eq!(p.language, Scalar::from("en"));
        assert!(p.variables.is_none());
        assert!(p.buttons.is_none());
        assert!(p.file.is_empty());
    }

    #[test]
    fn test_send_template_empty_collection_wrapper_is_unset() {
        let params = NodeParameters::from_map(&map(json!({
            "to": "1",
            "templateId": "t",
            "additionalFields": {"variables": {}}
        })))
        .unwrap();
        let NodeParameters::SendTemplate(p) = params else {
            panic!("expected sendTemplate");
        };
        assert!(p.variables.is_none());
    }

    #[test]
    fn test_send_template_missing_template_id() {
        let err = NodeParameters::from_map(&map(json!({"to": "1"}))).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("sendTemplate"));
        assert!(msg.contains("templateId"));
    }

    #[test]
    fn test_key_value_defaults_to_empty_string() {
        let kv: KeyValue = serde_json::from_value(json!({"key": "v1"})).unwrap();
        assert_eq!(kv.value, json!(""));
    }

    #[test]
    fn test_send_freeform() {
        let params = NodeParameters::from_map(&map(json!({
            "operation": "sendFreeform",
            "toFreeform": "1,2",
            "message": "hello",
            "quickReplyButtons": {"button": [{"buttonNumber": 2, "buttonText": "Yes"}]}
        })))
        .unwrap();
        let NodeParameters::SendFreeform(p) = params else {
            panic!("expected sendFreeform");
        };
        assert_eq!(p.to, "1,2");
        assert_eq!(p.message, "hello");
        assert_eq!(p.quick_reply_buttons, vec![QuickReplyButton::new(2, "Yes")]);
    }

    #[test]
    fn test_send_freeform_missing_message() {
        let err = NodeParameters::from_map(&map(json!({
            "operation": "sendFreeform",
            "toFreeform": "1"
        })))
        .unwrap_err();
        assert!(err.to_string().contains("message"));
    }

    #[test]
    fn test_quick_reply_button_number_defaults_to_one() {
        let b: QuickReplyButton = serde_json::from_value(json!({"buttonText": "Ok"})).unwrap();
        assert_eq!(b.button_number.to_string(), "1");
    }

    #[test]
    fn test_scalar_rendering() {
        let render = |v: Value| serde_json::from_value::<Scalar>(v).unwrap().to_string();
        assert_eq!(render(json!(2)), "2");
        assert_eq!(render(json!(2.0)), "2");
        assert_eq!(render(json!(2.5)), "2.5");
        assert_eq!(render(json!("3")), "3");
        assert_eq!(render(json!(true)), "true");
        assert_eq!(render(json!(null)), "null");
    }

    #[test]
    fn test_scalar_rejects_objects_and_arrays() {
        let err = serde_json::from_value::<Scalar>(json!({"a": 1})).unwrap_err();
        assert!(err.to_string().contains("got an object"));
        assert!(serde_json::from_value::<Scalar>(json!([1])).is_err());
    }

    #[test]
    fn test_send_template_accepts_numeric_recipient() {
        let params = NodeParameters::from_map(&map(json!({
            "to": 919876543210u64,
            "templateId": 42,
            "language": null
        })))
        .unwrap();
        let NodeParameters::SendTemplate(p) = params else {
            panic!("expected sendTemplate");
        };
        assert_eq!(p.to, Scalar::from(919876543210u64));
        assert_eq!(p.template_id, Scalar::from(42u64));
        assert_eq!(p.language, Scalar::from("en"));
    }

    #[test]
    fn test_send_template_rejects_object_recipient() {
        let err = NodeParameters::from_map(&map(json!({
            "to": {"phone": "1"},
            "templateId": "t"
        })))
        .unwrap_err();
        assert!(matches!(err, WabaError::Parameter(_)));
        assert!(err.to_string().contains("got an object"));
    }

    #[test]
    fn test_send_template_null_recipient_is_missing() {
        let err = NodeParameters::from_map(&map(json!({"to": null, "templateId": "t"})))
            .unwrap_err();
        assert!(err.to_string().contains("missing required parameter 'to'"));
    }

    #[test]
    fn test_send_freeform_numeric_fields_render_as_text() {
        let params = NodeParameters::from_map(&map(json!({
            "operation": "sendFreeform",
            "toFreeform": 919876543210u64,
            "message": 5,
            "quickReplyButtons": {"button": [{"buttonNumber": null, "buttonText": 7}]}
        })))
        .unwrap();
        let NodeParameters::SendFreeform(p) = params else {
            panic!("expected sendFreeform");
        };
        assert_eq!(p.to, "919876543210");
        assert_eq!(p.message, "5");
        assert_eq!(p.quick_reply_buttons[0].button_number, Scalar::Null);
        assert_eq!(p.quick_reply_buttons[0].button_text, "7");
    }

    #[test]
    fn test_get_all_ignores_other_fields() {
        let params = NodeParameters::from_map(&map(json!({
            "resource": "template",
            "operation": "getAll",
            "to": 42
        })))
        .unwrap();
        assert_eq!(params, NodeParameters::GetAll);
    }

    #[test]
    fn test_operation_endpoints() {
        assert_eq!(Operation::SendTemplate.endpoint(), "/api/create-message");
        assert_eq!(Operation::SendFreeform.endpoint(), "/api/create-message-json");
        assert_eq!(Operation::SendFreeform.resource(), Resource::Message);
    }
}
