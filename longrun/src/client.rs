use reqwest::{multipart, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::common::{
    ApiErrorDetails, ApiQueryParams, WithHeaders, OPERATION_ID_HEADER, SUBSCRIPTION_KEY_HEADER,
};
use super::error::ApiError;
use super::pool::{ConnectionPoolConfig, ConnectionPoolManager, ConnectionStats};

/// HTTP client bound to one service base URL.
///
/// Cheap to clone; clones share the underlying connection pool and stats.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
    cancel: CancellationToken,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    api_version: Option<String>,
    subscription_key: Option<String>,
    retry_config: RetryConfig,
    pool_manager: ConnectionPoolManager,
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 10000,
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2_u64.saturating_pow(attempt.saturating_sub(1));
        let backoff = std::cmp::min(
            self.initial_backoff_ms.saturating_mul(factor),
            self.max_backoff_ms,
        );
        Duration::from_millis(backoff)
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: Url,
    /// Path segment under the endpoint that hosts the service collections.
    pub service_path: String,
    pub api_version: Option<String>,
    pub subscription_key: Option<String>,
    pub retry: RetryConfig,
    pub pool: ConnectionPoolConfig,
}

impl ClientConfig {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            service_path: String::new(),
            api_version: None,
            subscription_key: None,
            retry: RetryConfig::default(),
            pool: ConnectionPoolConfig::default(),
        }
    }

    pub fn with_service_path(mut self, service_path: impl Into<String>) -> Self {
        self.service_path = service_path.into();
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    pub fn with_subscription_key(mut self, key: impl Into<String>) -> Self {
        self.subscription_key = Some(key.into());
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

/// How a 404 ends a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NotFound {
    Absent,
    Error,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let pool_manager = ConnectionPoolManager::new(config.pool);
        let http_client = pool_manager.build_client()?;

        let mut base_url = config.endpoint.as_str().trim_end_matches('/').to_string();
        let service_path = config.service_path.trim_matches('/');
        if !service_path.is_empty() {
            base_url = format!("{}/{}", base_url, service_path);
        }

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                api_version: config.api_version,
                subscription_key: config.subscription_key,
                retry_config: config.retry,
                pool_manager,
            }),
            cancel: CancellationToken::new(),
        })
    }

    /// Clone of this client whose requests and backoff sleeps stop when `cancel` fires.
    pub fn with_cancellation(&self, cancel: CancellationToken) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            cancel,
        }
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.inner.retry_config
    }

    pub fn collection_url(&self, controller: &str) -> String {
        format!("{}/{}", self.inner.base_url, controller)
    }

    pub fn resource_url(&self, controller: &str, id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.inner.base_url,
            controller,
            urlencoding::encode(id)
        )
    }

    /// Get connection pool statistics
    pub async fn get_connection_stats(&self) -> ConnectionStats {
        self.inner.pool_manager.get_stats().await
    }

    /// GET a service URL; a 404 is an error.
    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        params: ApiQueryParams,
    ) -> Result<T, ApiError> {
        let full_url = self.with_query(url, params);
        let response = self
            .execute_with_retry(
                || self.request(Method::GET, &full_url).send(),
                &full_url,
                NotFound::Error,
            )
            .await?;

        match response {
            Some(response) => Self::parse_success_response(response).await,
            None => Err(ApiError::ProtocolViolation(format!(
                "no response for {}",
                full_url
            ))),
        }
    }

    /// GET a service URL, mapping a 404 to `None`.
    pub async fn get_optional<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, ApiError> {
        let full_url = self.with_query(url, ApiQueryParams::new());
        let response = self
            .execute_with_retry(
                || self.request(Method::GET, &full_url).send(),
                &full_url,
                NotFound::Absent,
            )
            .await?;

        match response {
            Some(response) => Self::parse_success_response(response).await.map(Some),
            None => Ok(None),
        }
    }

    /// GET a URL handed out by the server (operation locations, next links) as-is.
    pub async fn get_absolute<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        Url::parse(url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", url, e)))?;

        let response = self
            .execute_with_retry(
                || self.request(Method::GET, url).send(),
                url,
                NotFound::Error,
            )
            .await?;

        match response {
            Some(response) => Self::parse_success_response(response).await,
            None => Err(ApiError::ProtocolViolation(format!("no response for {}", url))),
        }
    }

    /// PUT a JSON body tagged with an idempotency token and keep the response headers.
    pub async fn put_with_operation<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
        operation_id: &str,
    ) -> Result<WithHeaders<T>, ApiError> {
        let full_url = self.with_query(url, ApiQueryParams::new());
        let response = self
            .execute_with_retry(
                || {
                    self.request(Method::PUT, &full_url)
                        .header(OPERATION_ID_HEADER, operation_id)
                        .json(body)
                        .send()
                },
                &full_url,
                NotFound::Error,
            )
            .await?;

        match response {
            Some(response) => {
                let headers = response.headers().clone();
                let body = Self::parse_success_response(response).await?;
                Ok(WithHeaders { body, headers })
            }
            None => Err(ApiError::ProtocolViolation(format!(
                "no response for {}",
                full_url
            ))),
        }
    }

    /// POST a multipart form tagged with an idempotency token; a 404 maps to `None`.
    ///
    /// `build_form` runs once per attempt since a streamed form is consumed by sending it.
    pub async fn post_multipart_with_operation<T, F, Fut>(
        &self,
        url: &str,
        operation_id: &str,
        build_form: F,
    ) -> Result<Option<WithHeaders<T>>, ApiError>
    where
        T: DeserializeOwned,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<multipart::Form, ApiError>>,
    {
        let full_url = self.with_query(url, ApiQueryParams::new());
        let response = self
            .execute_form_with_retry(
                || {
                    let request = self
                        .request(Method::POST, &full_url)
                        .header(OPERATION_ID_HEADER, operation_id);
                    let form = build_form();
                    async move { Ok::<_, ApiError>(request.multipart(form.await?)) }
                },
                &full_url,
            )
            .await?;

        match response {
            Some(response) => {
                let headers = response.headers().clone();
                let body = Self::parse_success_response(response).await?;
                Ok(Some(WithHeaders { body, headers }))
            }
            None => Ok(None),
        }
    }

    /// DELETE a service URL and hand back the raw response.
    pub async fn delete(&self, url: &str) -> Result<reqwest::Response, ApiError> {
        let full_url = self.with_query(url, ApiQueryParams::new());
        let response = self
            .execute_with_retry(
                || self.request(Method::DELETE, &full_url).send(),
                &full_url,
                NotFound::Error,
            )
            .await?;

        response.ok_or_else(|| ApiError::ProtocolViolation(format!("no response for {}", full_url)))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        tracing::debug!("{} request to: {}", method, url);

        let builder = self.inner.http_client.request(method, url);
        match &self.inner.subscription_key {
            Some(key) => builder.header(SUBSCRIPTION_KEY_HEADER, key),
            None => builder,
        }
    }

    fn with_query(&self, url: &str, params: ApiQueryParams) -> String {
        let params = params.add_optional("api-version", self.inner.api_version.as_deref());
        format!("{}{}", url, params.to_query_string())
    }

    async fn execute_form_with_retry<F, Fut>(
        &self,
        build_request: F,
        url: &str,
    ) -> Result<Option<reqwest::Response>, ApiError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<RequestBuilder, ApiError>>,
    {
        self.execute_with_retry_inner(
            || {
                let request = build_request();
                async move {
                    let request = request.await?;
                    Ok::<_, ApiError>(request.send().await)
                }
            },
            url,
            NotFound::Absent,
        )
        .await
    }

    async fn execute_with_retry<F, Fut>(
        &self,
        request_fn: F,
        url: &str,
        not_found: NotFound,
    ) -> Result<Option<reqwest::Response>, ApiError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        self.execute_with_retry_inner(
            || {
                let send = request_fn();
                async move { Ok::<_, ApiError>(send.await) }
            },
            url,
            not_found,
        )
        .await
    }

    /// Execute request with retry logic.
    ///
    /// The outer `Result` carries local failures that happen before anything is
    /// sent (e.g. opening an upload); the inner one is the transport outcome.
    async fn execute_with_retry_inner<F, Fut>(
        &self,
        request_fn: F,
        url: &str,
        not_found: NotFound,
    ) -> Result<Option<reqwest::Response>, ApiError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Result<reqwest::Response, reqwest::Error>, ApiError>>,
    {
        let retry_config = &self.inner.retry_config;
        let mut attempt = 0;
        let mut last_status = None;
        let mut last_body = String::new();

        while attempt <= retry_config.max_retries {
            if self.cancel.is_cancelled() {
                return Err(ApiError::Canceled);
            }

            if attempt > 0 {
                let backoff = retry_config.backoff_for(attempt);
                tracing::warn!(
                    "Retrying request to {} after {}ms (attempt {})",
                    url,
                    backoff.as_millis(),
                    attempt
                );
                self.inner.pool_manager.record_retry().await;

                tokio::select! {
                    _ = self.cancel.cancelled() => return Err(ApiError::Canceled),
                    _ = tokio::time::sleep(backoff) => {}
                }
            }

            let outcome = tokio::select! {
                _ = self.cancel.cancelled() => return Err(ApiError::Canceled),
                outcome = request_fn() => outcome?,
            };

            match outcome {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        self.inner.pool_manager.record_request(true).await;
                        return Ok(Some(response));
                    }

                    self.inner.pool_manager.record_request(false).await;

                    if status == StatusCode::NOT_FOUND && not_found == NotFound::Absent {
                        tracing::debug!("Resource at {} not found", url);
                        return Ok(None);
                    }

                    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                        let body = response.text().await.unwrap_or_default();
                        tracing::warn!("Transient error from {}: HTTP {} {}", url, status, body);
                        last_status = Some(status.as_u16());
                        last_body = body;
                    } else {
                        return Self::handle_error_response(response).await;
                    }
                }
                Err(e) => {
                    self.inner.pool_manager.record_request(false).await;

                    if e.is_timeout() || e.is_connect() || e.is_request() {
                        tracing::warn!("Transport error calling {}: {}", url, e);
                        last_status = None;
                        last_body = e.to_string();
                    } else {
                        return Err(ApiError::Request(e));
                    }
                }
            }

            attempt += 1;
        }

        Err(ApiError::RequestFailed {
            attempts: attempt,
            status: last_status,
            body: last_body,
        })
    }

    /// Parse successful response
    async fn parse_success_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let text = response.text().await?;
        tracing::debug!("API response body: {}", text);

        serde_json::from_str::<T>(&text).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
            ApiError::ParseError(format!("Failed to parse response: {}", e))
        })
    }

    /// Handle error response
    async fn handle_error_response<T>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        tracing::error!("Response failed with error (HTTP {}): {}", status, text);

        let details = ApiErrorDetails::from_body(&text).map(Box::new);

        Err(ApiError::Api {
            status,
            message: text,
            details,
        })
    }
}
