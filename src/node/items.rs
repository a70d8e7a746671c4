//! Batch records exchanged with the host runtime.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// One item of the incoming batch.
///
/// `json` is the item data as the previous node produced it; `parameters`
/// holds the parameter values the host resolved for this item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    #[serde(default)]
    pub json: Value,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl InputRecord {
    /// Create a record with empty item data.
    pub fn with_parameters(parameters: Value) -> Self {
        Self {
            json: Value::Object(Map::new()),
            parameters: match parameters {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        }
    }

    /// Fill in parameters the record does not set itself.
    pub fn merge_defaults(&mut self, defaults: &Map<String, Value>) {
        for (key, value) in defaults {
            self.parameters
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }
}

/// Link from an output record back to the input item that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedItem {
    pub item: usize,
}

/// One item of the node's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRecord {
    pub json: Value,
    pub paired_item: PairedItem,
}

impl OutputRecord {
    pub fn new(json: Value, item: usize) -> Self {
        Self {
            json,
            paired_item: PairedItem { item },
        }
    }

    /// Error record emitted in continue-on-fail mode.
    pub fn error(message: impl Into<String>, item: usize) -> Self {
        Self::new(json!({ "error": message.into() }), item)
    }

    /// Whether this record carries a captured item error.
    pub fn is_error(&self) -> bool {
        self.json
            .as_object()
            .is_some_and(|obj| obj.len() == 1 && obj.get("error").is_some_and(Value::is_string))
    }
}
