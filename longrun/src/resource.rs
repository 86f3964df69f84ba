//! Generic operations over one resource collection

use std::marker::PhantomData;

use super::common::{ApiResource, Paginated, PaginationParams, WithHeaders};
use super::error::ApiError;
use super::Client;

/// Create/get/list/delete for the collection named by `T::controller_name()`.
pub struct ResourceClient<T> {
    client: Client,
    _resource: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _resource: PhantomData,
        }
    }
}

impl<T: ApiResource> ResourceClient<T> {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// GET {base}/{controller}
    pub async fn list(&self, pagination: &PaginationParams) -> Result<Paginated<T>, ApiError> {
        let url = self.client.collection_url(T::controller_name());
        self.client.get(&url, pagination.to_query_params()).await
    }

    /// GET the `nextLink` of a previous page.
    pub async fn list_next(&self, next_link: &str) -> Result<Paginated<T>, ApiError> {
        self.client.get_absolute(next_link).await
    }

    /// GET {base}/{controller}/{id}; `None` when the resource does not exist.
    pub async fn get(&self, id: &str) -> Result<Option<T>, ApiError> {
        require_non_empty("id", id)?;
        let url = self.client.resource_url(T::controller_name(), id);
        self.client.get_optional(&url).await
    }

    /// PUT {base}/{controller}/{id} with the idempotency token in `Operation-Id`.
    pub async fn create(
        &self,
        resource: &T,
        operation_id: &str,
    ) -> Result<WithHeaders<T>, ApiError> {
        let id = resource.id().unwrap_or_default();
        require_non_empty("resource id", id)?;
        require_non_empty("operation id", operation_id)?;

        let url = self.client.resource_url(T::controller_name(), id);
        self.client
            .put_with_operation(&url, resource, operation_id)
            .await
    }

    /// DELETE {base}/{controller}/{id}
    pub async fn delete(&self, id: &str) -> Result<reqwest::Response, ApiError> {
        require_non_empty("id", id)?;
        let url = self.client.resource_url(T::controller_name(), id);
        self.client.delete(&url).await
    }
}

fn require_non_empty(name: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidArgument(format!("{} must not be empty", name)));
    }
    Ok(())
}
