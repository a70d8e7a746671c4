//! WABA workflow node.
//!
//! [`WabaNode`] maps each input record to exactly one gateway call and the
//! gateway's answer back to output records:
//!
//! - `message: sendTemplate` -> `POST /api/create-message`, response passed through
//! - `message: sendFreeform` -> `POST /api/create-message-json`, response passed through
//! - `template: getAll` -> `POST /api/get_templates`, one record per approved template
//!
//! Items run strictly one after another. Each item yields its own `Result`;
//! in continue-on-fail mode an error becomes an `{ "error": ... }` record,
//! otherwise the batch stops at the first failing item.

pub mod description;
pub mod items;
pub mod params;
pub mod request;
pub mod response;

pub use description::{describe, subtitle};
pub use items::{InputRecord, OutputRecord, PairedItem};
pub use params::{NodeParameters, Operation, Resource, Scalar};
pub use request::RequestBody;

use reqwest::Method;
use tracing::{debug, info, warn};

use crate::credentials::WabaCredentials;
use crate::error::Result;
use crate::log_component;
use crate::transport::{HttpTransport, ReqwestTransport};

/// The WABA node bound to one set of credentials.
pub struct WabaNode {
    credentials: WabaCredentials,
    transport: Box<dyn HttpTransport>,
    continue_on_fail: bool,
}

impl WabaNode {
    /// Create a node using the stock `reqwest` transport.
    pub fn new(credentials: WabaCredentials) -> Self {
        Self::with_transport(credentials, Box::new(ReqwestTransport::new()))
    }

    /// Create a node with a host-provided transport.
    pub fn with_transport(credentials: WabaCredentials, transport: Box<dyn HttpTransport>) -> Self {
        Self {
            credentials,
            transport,
            continue_on_fail: false,
        }
    }

    /// Capture per-item errors as output records instead of aborting.
    pub fn continue_on_fail(mut self, enabled: bool) -> Self {
        self.continue_on_fail = enabled;
        self
    }

    /// Run the node over a batch.
    ///
    /// Output order follows input order; every record carries the index of
    /// the item that produced it. Without continue-on-fail the first failing
    /// item aborts the batch with [`WabaError::Item`](crate::error::WabaError::Item).
    pub async fn execute(&self, items: &[InputRecord]) -> Result<Vec<OutputRecord>> {
        log_component!(
            info,
            "node",
            "executing batch",
            items = items.len(),
            continue_on_fail = self.continue_on_fail
        );

        let mut output = Vec::new();
        for (index, item) in items.iter().enumerate() {
            match self.execute_item(index, item).await {
                Ok(records) => output.extend(records),
                Err(e) if self.continue_on_fail => {
                    warn!(item = index, error = %e, "WABA item failed, continuing");
                    output.push(OutputRecord::error(e.to_string(), index));
                }
                Err(e) => {
                    warn!(item = index, error = %e, "WABA item failed, aborting batch");
                    return Err(e.at_item(index));
                }
            }
        }

        info!(items = items.len(), records = output.len(), "WABA batch finished");
        Ok(output)
    }

    /// Build, send and shape the request for a single item.
    async fn execute_item(&self, index: usize, item: &InputRecord) -> Result<Vec<OutputRecord>> {
        let params = NodeParameters::from_map(&item.parameters)?;
        let request = RequestBody::from_params(&params);
        let operation = request.operation();
        let url = self.credentials.endpoint(operation.endpoint());
        debug!(
            item = index,
            operation = %operation,
            subtitle = %subtitle(operation.resource(), operation),
            url = %url,
            "sending WABA request"
        );

        let mut body = serde_json::to_value(&request)?;
        self.credentials.authenticator().apply(&mut body)?;

        let response = self.transport.request(Method::POST, &url, &body).await?;
        Ok(response::shape_response(operation, response, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WabaError;
    use crate::transport::MockHttpTransport;
    use mockall::Sequence;
    use serde_json::{json, Value};

    fn creds() -> WabaCredentials {
        WabaCredentials::new("https://host.example/", "app-1", "auth-1")
    }

    fn template_item(to: &str) -> InputRecord {
        InputRecord::with_parameters(json!({
            "resource": "message",
            "operation": "sendTemplate",
            "to": to,
            "templateId": "welcome"
        }))
    }

    #[tokio::test]
    async fn test_send_template_request_shape() {
        let mut mock = MockHttpTransport::new();
        mock.expect_request()
            .withf(|method, url, body| {
                *method == Method::POST
                    && url == "https://host.example/api/create-message"
                    && *body
                        == json!({
                            "appkey": "app-1",
                            "authkey": "auth-1",
                            "to": "919876543210",
                            "template_id": "welcome",
                            "language": "en"
                        })
            })
            .times(1)
            .returning(|_, _, _| Ok(json!({"status": "success"})));

        let node = WabaNode::with_transport(creds(), Box::new(mock));
        let out = node.execute(&[template_item("919876543210")]).await.unwrap();
        assert_eq!(out, vec![OutputRecord::new(json!({"status": "success"}), 0)]);
    }

    #[tokio::test]
    async fn test_send_freeform_request_shape() {
        let mut mock = MockHttpTransport::new();
        mock.expect_request()
            .withf(|_, url, body| {
                url == "https://host.example/api/create-message-json"
                    && body["to"] == json!(["919876543210", "919876543211"])
                    && body["template_id"] == "chat_reply"
                    && body["buttons"]["b2_value"] == "Yes"
                    && body["authkey"] == "auth-1"
            })
            .times(1)
            .returning(|_, _, _| Ok(json!({"status": "queued"})));

        let node = WabaNode::with_transport(creds(), Box::new(mock));
        let item = InputRecord::with_parameters(json!({
            "operation": "sendFreeform",
            "toFreeform": "919876543210, 919876543211",
            "message": "Thanks",
            "quickReplyButtons": {"button": [{"buttonNumber": 2, "buttonText": "Yes"}]}
        }));
        let out = node.execute(&[item]).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].json["status"], "queued");
    }

    #[tokio::test]
    async fn test_get_all_fans_out_approved_templates() {
        let mut mock = MockHttpTransport::new();
        mock.expect_request()
            .withf(|_, url, body| {
                url == "https://host.example/api/get_templates"
                    && *body == json!({"appkey": "app-1", "authkey": "auth-1"})
            })
            .returning(|_, _, _| {
                Ok(json!({"data": [
                    {"id": 1, "status": "APPROVED"},
                    {"id": 2, "status": "PENDING"},
                    {"id": 3, "status": "APPROVED"}
                ]}))
            });

        let node = WabaNode::with_transport(creds(), Box::new(mock));
        let item = InputRecord::with_parameters(json!({"resource": "template"}));
        let out = node.execute(&[item.clone(), item]).await.unwrap();

        let ids: Vec<(i64, usize)> = out
            .iter()
            .map(|r| (r.json["id"].as_i64().unwrap(), r.paired_item.item))
            .collect();
        assert_eq!(ids, vec![(1, 0), (3, 0), (1, 1), (3, 1)]);
    }

    #[tokio::test]
    async fn test_continue_on_fail_captures_error_in_place() {
        let mut mock = MockHttpTransport::new();
        let mut seq = Sequence::new();
        mock.expect_request()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(json!({"n": 0})));
        mock.expect_request()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| {
                Err(WabaError::Api {
                    status: 500,
                    message: "gateway down".into(),
                })
            });
        mock.expect_request()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(json!({"n": 2})));

        let node = WabaNode::with_transport(creds(), Box::new(mock)).continue_on_fail(true);
        let items = vec![template_item("1"), template_item("2"), template_item("3")];
        let out = node.execute(&items).await.unwrap();

        assert_eq!(out.len(), 3);
        assert_eq!(out[0], OutputRecord::new(json!({"n": 0}), 0));
        assert_eq!(
            out[1],
            OutputRecord::error("WABA API error 500: gateway down", 1)
        );
        assert_eq!(out[2], OutputRecord::new(json!({"n": 2}), 2));
    }

    #[tokio::test]
    async fn test_strict_mode_stops_at_failing_item() {
        let mut mock = MockHttpTransport::new();
        let mut seq = Sequence::new();
        mock.expect_request()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(json!({"n": 0})));
        mock.expect_request()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| {
                Err(WabaError::Api {
                    status: 502,
                    message: "bad gateway".into(),
                })
            });
        // A third call would panic: no expectation left.

        let node = WabaNode::with_transport(creds(), Box::new(mock));
        let items = vec![template_item("1"), template_item("2"), template_item("3")];
        let err = node.execute(&items).await.unwrap_err();

        assert_eq!(err.item_index(), Some(1));
        assert!(err.to_string().contains("bad gateway"));
    }

    #[tokio::test]
    async fn test_parameter_error_is_per_item() {
        let mut mock = MockHttpTransport::new();
        mock.expect_request()
            .times(1)
            .returning(|_, _, _| Ok(json!({"ok": true})));

        let node = WabaNode::with_transport(creds(), Box::new(mock)).continue_on_fail(true);
        let bad = InputRecord::with_parameters(json!({"operation": "sendTemplate", "to": "1"}));
        let out = node.execute(&[bad, template_item("2")]).await.unwrap();

        assert_eq!(out.len(), 2);
        assert!(out[0].is_error());
        assert!(out[0].json["error"]
            .as_str()
            .unwrap()
            .contains("templateId"));
        assert_eq!(out[1].paired_item.item, 1);
    }

    #[tokio::test]
    async fn test_unsupported_operation_fails_without_request() {
        let mock = MockHttpTransport::new();
        let node = WabaNode::with_transport(creds(), Box::new(mock));
        let item = InputRecord::with_parameters(json!({
            "resource": "template",
            "operation": "sendTemplate"
        }));
        let err = node.execute(&[item]).await.unwrap_err();
        assert_eq!(err.item_index(), Some(0));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let node = WabaNode::with_transport(creds(), Box::new(MockHttpTransport::new()));
        let out = node.execute(&[]).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_passthrough_keeps_raw_response() {
        let mut mock = MockHttpTransport::new();
        mock.expect_request()
            .returning(|_, _, _| Ok(Value::String("accepted".into())));
        let node = WabaNode::with_transport(creds(), Box::new(mock));
        let out = node.execute(&[template_item("1")]).await.unwrap();
        assert_eq!(out[0].json, json!("accepted"));
    }
}
