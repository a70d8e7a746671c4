//! Shaping gateway responses into output records.

use serde_json::Value;

use super::items::OutputRecord;
use super::params::Operation;

/// Status value of templates usable for sending.
pub const APPROVED_STATUS: &str = "APPROVED";

/// Convert one gateway response into output records for item `index`.
pub fn shape_response(operation: Operation, response: Value, index: usize) -> Vec<OutputRecord> {
    match operation {
        Operation::SendTemplate | Operation::SendFreeform => {
            vec![OutputRecord::new(response, index)]
        }
        Operation::GetAll => approved_templates(response, index),
    }
}

/// One record per approved template in `data`, or the response itself when
/// there is no `data` array.
fn approved_templates(response: Value, index: usize) -> Vec<OutputRecord> {
    match response {
        Value::Object(mut obj) if obj.get("data").is_some_and(Value::is_array) => {
            let Some(Value::Array(templates)) = obj.remove("data") else {
                return Vec::new();
            };
            templates
                .into_iter()
                .filter(is_approved)
                .map(|template| OutputRecord::new(template, index))
                .collect()
        }
        other => vec![OutputRecord::new(other, index)],
    }
}

fn is_approved(template: &Value) -> bool {
    template.get("status").and_then(Value::as_str) == Some(APPROVED_STATUS)
}
