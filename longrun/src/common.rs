//! Common types and utilities shared by every resource collection

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Header carrying the caller-generated idempotency token of a write.
pub const OPERATION_ID_HEADER: &str = "Operation-Id";

/// Header carrying the URL to poll for the status of an asynchronous write.
pub const OPERATION_LOCATION_HEADER: &str = "Operation-Location";

/// Header carrying the subscription key.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("API error details: code={code:?}, message={message:?}")]
pub struct ApiErrorDetails {
    pub code: Option<String>,
    pub message: Option<String>,
}

impl ApiErrorDetails {
    /// Parses the `{"error": {...}}` envelope, returning `None` for any other body.
    pub fn from_body(body: &str) -> Option<Self> {
        let response = serde_json::from_str::<ApiErrorResponse>(body).ok()?;
        let error = response.error?;
        Some(Self {
            code: error.code,
            message: error.message,
        })
    }
}

/// A resource addressed by id inside a named collection.
pub trait ApiResource: Serialize + DeserializeOwned + Send + Sync {
    /// Collection segment appended to the service base URL, e.g. `generations`.
    fn controller_name() -> &'static str;

    /// Identifier of this resource; `None` or empty when not yet assigned.
    fn id(&self) -> Option<&str>;
}

/// A resource whose creation is processed asynchronously by the server.
pub trait StatefulResource: ApiResource {
    fn status(&self) -> OperationStatus;

    fn failure_reason(&self) -> Option<&str>;
}

/// Lifecycle status shared by operations and stateful resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OperationStatus {
    #[default]
    NotStarted,
    Running,
    Succeeded,
    Failed,
    Canceled,
    /// Any value this client does not know about. Never terminal.
    #[serde(other)]
    Unknown,
}

impl OperationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OperationStatus::Succeeded | OperationStatus::Failed | OperationStatus::Canceled
        )
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationStatus::NotStarted => "NotStarted",
            OperationStatus::Running => "Running",
            OperationStatus::Succeeded => "Succeeded",
            OperationStatus::Failed => "Failed",
            OperationStatus::Canceled => "Canceled",
            OperationStatus::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Body of a write together with the response headers it arrived with.
#[derive(Debug, Clone)]
pub struct WithHeaders<T> {
    pub body: T,
    pub headers: HeaderMap,
}

impl<T> WithHeaders<T> {
    /// First value of `name`, if present, non-empty and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.trim().is_empty())
    }
}

/// One page of a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(
        rename = "nextLink",
        alias = "@nextLink",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub next_link: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ApiQueryParams {
    params: Vec<(String, String)>,
}

impl ApiQueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn add_optional<K: Into<String>, V: ToString>(mut self, key: K, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.params.push((key.into(), v.to_string()));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn to_query_string(&self) -> String {
        if self.params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                self.params
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&")
            )
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PaginationParams {
    pub top: Option<u32>,
    pub skip: Option<u32>,
    pub max_page_size: Option<u32>,
}

impl PaginationParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    pub fn with_skip(mut self, skip: u32) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = Some(max_page_size);
        self
    }

    pub fn to_query_params(&self) -> ApiQueryParams {
        let mut params = ApiQueryParams::new();
        params = params.add_optional("top", self.top);
        params = params.add_optional("skip", self.skip);
        // The server only accepts the lower-case spelling.
        params = params.add_optional("maxpagesize", self.max_page_size);
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_status_terminal_set() {
        assert!(OperationStatus::Succeeded.is_terminal());
        assert!(OperationStatus::Failed.is_terminal());
        assert!(OperationStatus::Canceled.is_terminal());
        assert!(!OperationStatus::NotStarted.is_terminal());
        assert!(!OperationStatus::Running.is_terminal());
        assert!(!OperationStatus::Unknown.is_terminal());
    }

    #[test]
    fn unknown_status_values_deserialize_as_unknown() {
        let status: OperationStatus = serde_json::from_str(r#""Paused""#).unwrap();
        assert_eq!(status, OperationStatus::Unknown);

        let status: OperationStatus = serde_json::from_str(r#""Running""#).unwrap();
        assert_eq!(status, OperationStatus::Running);
    }

    #[test]
    fn pagination_params_only_include_supplied_values() {
        let query = PaginationParams::new().with_skip(5).to_query_params();
        assert_eq!(query.to_query_string(), "?skip=5");

        let query = PaginationParams::new().to_query_params();
        assert!(query.is_empty());
        assert_eq!(query.to_query_string(), "");
    }

    #[test]
    fn pagination_params_use_lowercase_page_size_name() {
        let query = PaginationParams::new()
            .with_top(2)
            .with_skip(1)
            .with_max_page_size(2)
            .to_query_params()
            .to_query_string();

        assert_eq!(query, "?top=2&skip=1&maxpagesize=2");
    }

    #[test]
    fn paginated_accepts_both_next_link_spellings() {
        let page: Paginated<serde_json::Value> =
            serde_json::from_str(r#"{"value":[1,2],"@nextLink":"https://next"}"#).unwrap();
        assert_eq!(page.value.len(), 2);
        assert_eq!(page.next_link.as_deref(), Some("https://next"));

        let page: Paginated<serde_json::Value> =
            serde_json::from_str(r#"{"value":[],"nextLink":"https://other"}"#).unwrap();
        assert_eq!(page.next_link.as_deref(), Some("https://other"));
    }

    #[test]
    fn error_details_parse_error_envelope() {
        let details =
            ApiErrorDetails::from_body(r#"{"error":{"code":"InvalidRequest","message":"bad id"}}"#)
                .unwrap();
        assert_eq!(details.code.as_deref(), Some("InvalidRequest"));
        assert_eq!(details.message.as_deref(), Some("bad id"));

        assert!(ApiErrorDetails::from_body("not json").is_none());
    }
}
