//! Temporary file uploads referenced by generations

use longrun::{
    ApiError, ApiResource, CancellationToken, Client, Paginated, PaginationParams, ResourceClient,
};
use reqwest::multipart::{Form, Part};
use std::path::Path;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::content::check_upload_size;
use crate::models::TempFile;

/// Multipart field carrying the expiry.
pub const EXPIRES_AFTER_FIELD: &str = "ExpiresAfterInMins";

/// Multipart field carrying the file body.
pub const FILE_FIELD: &str = "file";

pub const MIN_EXPIRES_AFTER_MINS: u32 = 1;
pub const MAX_EXPIRES_AFTER_MINS: u32 = 24 * 60;

#[derive(Clone)]
pub struct TempFileClient {
    resources: ResourceClient<TempFile>,
}

impl TempFileClient {
    pub fn new(client: Client) -> Self {
        Self {
            resources: ResourceClient::new(client),
        }
    }

    /// Same client, but every request stops when `cancel` fires.
    pub fn with_cancellation(&self, cancel: CancellationToken) -> Self {
        Self::new(self.resources.client().with_cancellation(cancel))
    }

    /// Upload the file at `path` under a fresh id.
    ///
    /// Returns `None` when the service answers 404.
    pub async fn upload(
        &self,
        path: &Path,
        expires_after_in_mins: Option<u32>,
    ) -> Result<Option<TempFile>, ApiError> {
        if let Some(minutes) = expires_after_in_mins {
            if !(MIN_EXPIRES_AFTER_MINS..=MAX_EXPIRES_AFTER_MINS).contains(&minutes) {
                return Err(ApiError::InvalidArgument(format!(
                    "{} must be between {} and {}, got {}",
                    EXPIRES_AFTER_FIELD, MIN_EXPIRES_AFTER_MINS, MAX_EXPIRES_AFTER_MINS, minutes
                )));
            }
        }

        let size = check_upload_size(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                ApiError::InvalidArgument(format!("no file name in {}", path.display()))
            })?
            .to_string();

        let id = Uuid::new_v4().to_string();
        let operation_id = Uuid::new_v4().to_string();
        let client = self.resources.client();
        let url = client.resource_url(TempFile::controller_name(), &id);

        tracing::info!(
            "Uploading {} ({} bytes) as temp file {}",
            path.display(),
            size,
            id
        );

        let uploaded = client
            .post_multipart_with_operation::<TempFile, _, _>(&url, &operation_id, || {
                let path = path.to_path_buf();
                let file_name = file_name.clone();
                async move {
                    let file = tokio::fs::File::open(&path).await?;
                    let length = file.metadata().await?.len();
                    let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

                    let mut form = Form::new();
                    if let Some(minutes) = expires_after_in_mins {
                        form = form.text(EXPIRES_AFTER_FIELD, minutes.to_string());
                    }
                    let part = Part::stream_with_length(body, length).file_name(file_name);
                    Ok::<_, ApiError>(form.part(FILE_FIELD, part))
                }
            })
            .await?;

        Ok(uploaded.map(|response| response.body))
    }

    pub async fn get(&self, id: &str) -> Result<Option<TempFile>, ApiError> {
        self.resources.get(id).await
    }

    pub async fn list(&self, pagination: &PaginationParams) -> Result<Paginated<TempFile>, ApiError> {
        self.resources.list(pagination).await
    }

    pub async fn list_next(&self, next_link: &str) -> Result<Paginated<TempFile>, ApiError> {
        self.resources.list_next(next_link).await
    }

    pub async fn delete(&self, id: &str) -> Result<reqwest::Response, ApiError> {
        self.resources.delete(id).await
    }
}
