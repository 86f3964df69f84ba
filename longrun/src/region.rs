//! Region to endpoint resolution

use url::Url;

use crate::error::ApiError;

/// Host suffix appended to a bare region name.
pub const DEFAULT_HOST_SUFFIX: &str = "api.cognitive.microsoft.com";

/// Region identifier or literal endpoint override.
#[derive(Debug, Clone)]
pub struct RegionConfig {
    region_identifier: String,
    is_local: bool,
}

impl RegionConfig {
    pub fn new(region_identifier: impl Into<String>) -> Result<Self, ApiError> {
        let region_identifier = region_identifier.into().trim().to_string();
        if region_identifier.is_empty() {
            return Err(ApiError::InvalidArgument(
                "region identifier must not be empty".to_string(),
            ));
        }

        Ok(Self {
            region_identifier,
            is_local: false,
        })
    }

    /// Treat the identifier as a literal endpoint regardless of its scheme.
    pub fn local(mut self, is_local: bool) -> Self {
        self.is_local = is_local;
        self
    }

    pub fn region_identifier(&self) -> &str {
        &self.region_identifier
    }

    pub fn is_local(&self) -> bool {
        self.is_local
    }

    pub fn endpoint_url(&self) -> Result<Url, ApiError> {
        let raw = if self.is_local || starts_with_http(&self.region_identifier) {
            self.region_identifier.clone()
        } else {
            format!(
                "https://{}.{}",
                self.region_identifier, DEFAULT_HOST_SUFFIX
            )
        };

        Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))
    }
}

fn starts_with_http(s: &str) -> bool {
    s.get(..4)
        .map(|prefix| prefix.eq_ignore_ascii_case("http"))
        .unwrap_or(false)
}
