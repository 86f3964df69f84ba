use longrun::{
    ApiError, CancellationToken, Client, Paginated, PaginationParams, PollConfig,
    StatefulResourceClient,
};

use crate::content::check_inline_size;
use crate::models::PodcastGeneration;

/// Podcast generation jobs.
pub struct GenerationClient {
    inner: StatefulResourceClient<PodcastGeneration>,
}

impl GenerationClient {
    pub fn new(client: Client, poll_config: PollConfig) -> Self {
        Self {
            inner: StatefulResourceClient::new(client, poll_config),
        }
    }

    /// Submit `generation` and wait until the service has finished with it.
    ///
    /// Content over the inline ceilings is rejected before anything is sent.
    /// A generation that ended Failed is returned with its failure reason.
    pub async fn create_and_wait_until_terminated(
        &self,
        generation: &PodcastGeneration,
        cancel: &CancellationToken,
    ) -> Result<PodcastGeneration, ApiError> {
        if let Some(content) = &generation.content {
            check_inline_size(&content.source()?)?;
        }
        self.inner
            .create_and_wait_until_terminated(generation, cancel)
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Option<PodcastGeneration>, ApiError> {
        self.inner.resources().get(id).await
    }

    pub async fn list(
        &self,
        pagination: &PaginationParams,
    ) -> Result<Paginated<PodcastGeneration>, ApiError> {
        self.inner.resources().list(pagination).await
    }

    pub async fn list_next(&self, next_link: &str) -> Result<Paginated<PodcastGeneration>, ApiError> {
        self.inner.resources().list_next(next_link).await
    }

    pub async fn delete(&self, id: &str) -> Result<reqwest::Response, ApiError> {
        self.inner.resources().delete(id).await
    }
}
