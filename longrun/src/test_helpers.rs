//! Test helpers for the long-running operation client

use serde::{Deserialize, Serialize};
use url::Url;

use super::common::{ApiResource, OperationStatus, StatefulResource};
use super::{Client, ClientConfig, RetryConfig};

/// Retry budget of the default config with millisecond backoff.
#[cfg(test)]
pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 3,
        initial_backoff_ms: 1,
        max_backoff_ms: 5,
    }
}

#[cfg(test)]
pub fn create_test_client(url: &str) -> Client {
    let config = ClientConfig::new(Url::parse(url).unwrap()).with_retry(fast_retry());
    Client::new(config).unwrap()
}

/// Minimal stateful resource living in the `widgets` collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub status: OperationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl Widget {
    pub fn new(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Default::default()
        }
    }
}

impl ApiResource for Widget {
    fn controller_name() -> &'static str {
        "widgets"
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl StatefulResource for Widget {
    fn status(&self) -> OperationStatus {
        self.status
    }

    fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_has_no_service_path() {
        let client = create_test_client("http://127.0.0.1:1234");
        assert_eq!(client.base_url(), "http://127.0.0.1:1234");
        assert_eq!(client.retry_config().max_retries, 3);
    }

    #[test]
    fn test_widget_wire_shape() {
        let widget: Widget =
            serde_json::from_str(r#"{"id":"w1","status":"Failed","failureReason":"bad input"}"#)
                .unwrap();
        assert_eq!(widget.id(), Some("w1"));
        assert_eq!(StatefulResource::status(&widget), OperationStatus::Failed);
        assert_eq!(widget.failure_reason(), Some("bad input"));

        let json = serde_json::to_value(Widget::new("w2")).unwrap();
        assert_eq!(json["id"], "w2");
        assert!(json.get("failureReason").is_none());
    }
}
