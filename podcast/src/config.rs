//! Client configuration with environment fallbacks

use longrun::{ApiError, ClientConfig, PollConfig, RegionConfig, RetryConfig};

pub const REGION_ENV: &str = "PODCAST_REGION";
pub const SUBSCRIPTION_KEY_ENV: &str = "PODCAST_SUBSCRIPTION_KEY";
pub const API_VERSION_ENV: &str = "PODCAST_API_VERSION";
pub const LOCAL_ENV: &str = "PODCAST_LOCAL";

pub const DEFAULT_API_VERSION: &str = "2026-01-01-preview";

/// Path segment under the regional endpoint that hosts the podcast API.
pub const SERVICE_PATH: &str = "podcast";

#[derive(Debug, Clone, Default)]
pub struct PodcastConfig {
    /// Region name such as `eastus`, or a full endpoint URL.
    pub region: Option<String>,
    pub subscription_key: Option<String>,
    pub api_version: Option<String>,
    pub local: Option<bool>,
    pub retry: RetryConfig,
    pub poll: PollConfig,
}

impl PodcastConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: Some(region.into()),
            ..Default::default()
        }
    }

    pub fn with_subscription_key(mut self, key: impl Into<String>) -> Self {
        self.subscription_key = Some(key.into());
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    pub fn with_local(mut self, local: bool) -> Self {
        self.local = Some(local);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Fill unset values from `PODCAST_*` environment variables.
    pub fn with_env_fallbacks(mut self) -> Self {
        self.region = non_empty(self.region).or_else(|| env_value(REGION_ENV));
        self.subscription_key =
            non_empty(self.subscription_key).or_else(|| env_value(SUBSCRIPTION_KEY_ENV));
        self.api_version = non_empty(self.api_version).or_else(|| env_value(API_VERSION_ENV));
        self.local = self.local.or_else(|| {
            env_value(LOCAL_ENV).and_then(|v| v.parse::<bool>().ok())
        });
        self
    }

    pub fn region_config(&self) -> Result<RegionConfig, ApiError> {
        let region = self.region.as_deref().ok_or_else(|| {
            ApiError::InvalidArgument(format!(
                "region is required (set it explicitly or via {})",
                REGION_ENV
            ))
        })?;

        Ok(RegionConfig::new(region)?.local(self.local.unwrap_or(false)))
    }

    pub fn client_config(&self) -> Result<ClientConfig, ApiError> {
        let endpoint = self.region_config()?.endpoint_url()?;

        let mut config = ClientConfig::new(endpoint)
            .with_service_path(SERVICE_PATH)
            .with_api_version(
                self.api_version
                    .as_deref()
                    .unwrap_or(DEFAULT_API_VERSION),
            )
            .with_retry(self.retry.clone());

        if let Some(key) = &self.subscription_key {
            config = config.with_subscription_key(key.clone());
        }

        Ok(config)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn env_value(name: &str) -> Option<String> {
    non_empty(std::env::var(name).ok())
}
