//! Create-then-poll workflow for resources processed asynchronously

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::common::{OperationStatus, StatefulResource, OPERATION_LOCATION_HEADER};
use super::error::ApiError;
use super::operation::{OperationPoller, PollConfig};
use super::resource::ResourceClient;
use super::Client;

pub struct StatefulResourceClient<T> {
    resources: ResourceClient<T>,
    poller: OperationPoller,
}

impl<T: StatefulResource> StatefulResourceClient<T> {
    pub fn new(client: Client, poll_config: PollConfig) -> Self {
        Self {
            resources: ResourceClient::new(client.clone()),
            poller: OperationPoller::new(client, poll_config),
        }
    }

    /// Plain create/get/list/delete on the same collection.
    pub fn resources(&self) -> &ResourceClient<T> {
        &self.resources
    }

    pub fn poller(&self) -> &OperationPoller {
        &self.poller
    }

    /// Submit `resource`, wait for its operation to finish and return the refreshed resource.
    ///
    /// The returned resource may be Failed or Canceled; see [`ensure_succeeded`].
    pub async fn create_and_wait_until_terminated(
        &self,
        resource: &T,
        cancel: &CancellationToken,
    ) -> Result<T, ApiError> {
        let resources: ResourceClient<T> =
            ResourceClient::new(self.resources.client().with_cancellation(cancel.clone()));
        let operation_id = Uuid::new_v4().to_string();

        let created = resources.create(resource, &operation_id).await?;
        let id = resource.id().unwrap_or_default();

        let operation_url = created
            .header(OPERATION_LOCATION_HEADER)
            .ok_or_else(|| {
                ApiError::ProtocolViolation(format!(
                    "create of {} returned no {} header",
                    id, OPERATION_LOCATION_HEADER
                ))
            })?
            .to_string();

        tracing::info!(
            "Created {} {} (operation {}), waiting for completion",
            T::controller_name(),
            id,
            operation_id
        );

        let status = self.poller.wait_until_terminal(&operation_url, cancel).await?;
        tracing::info!("Operation for {} finished with {}", id, status);

        resources.get(id).await?.ok_or_else(|| {
            ApiError::ProtocolViolation(format!(
                "{} {} not found after its operation finished",
                T::controller_name(),
                id
            ))
        })
    }
}

/// Turn a resource that did not end Succeeded into [`ApiError::OperationFailed`].
pub fn ensure_succeeded<T: StatefulResource>(resource: T) -> Result<T, ApiError> {
    match resource.status() {
        OperationStatus::Succeeded => Ok(resource),
        status => Err(ApiError::OperationFailed {
            id: resource.id().unwrap_or_default().to_string(),
            status,
            reason: resource.failure_reason().map(str::to_string),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{create_test_client, Widget};
    use mockito::{Matcher, Server};
    use std::time::Duration;

    fn fast_polls() -> PollConfig {
        PollConfig {
            initial_interval: Duration::from_millis(5),
            max_interval: Duration::from_millis(10),
            backoff_factor: 2,
            timeout: Some(Duration::from_secs(10)),
        }
    }

    async fn mock_create(server: &mut mockito::ServerGuard, id: &str) -> mockito::Mock {
        let location = format!("{}/operations/{}", server.url(), id);
        server
            .mock("PUT", format!("/widgets/{}", id).as_str())
            .match_header("operation-id", Matcher::Regex("^[0-9a-f-]{36}$".into()))
            .with_status(201)
            .with_header("Operation-Location", &location)
            .with_body(format!(r#"{{"id":"{}","status":"NotStarted"}}"#, id))
            .expect(1)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn waits_through_running_and_refetches() {
        let mut server = Server::new_async().await;
        let create = mock_create(&mut server, "w1").await;
        let running = server
            .mock("GET", "/operations/w1")
            .with_body(r#"{"id":"w1","status":"Running"}"#)
            .expect(2)
            .create_async()
            .await;
        let succeeded = server
            .mock("GET", "/operations/w1")
            .with_body(r#"{"id":"w1","status":"Succeeded"}"#)
            .expect(1)
            .create_async()
            .await;
        let refetch = server
            .mock("GET", "/widgets/w1")
            .with_body(r#"{"id":"w1","displayName":"final","status":"Succeeded"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = StatefulResourceClient::<Widget>::new(
            create_test_client(&server.url()),
            fast_polls(),
        );
        let widget = client
            .create_and_wait_until_terminated(&Widget::new("w1"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(widget.status, OperationStatus::Succeeded);
        assert_eq!(widget.display_name.as_deref(), Some("final"));
        assert!(widget.failure_reason.is_none());
        create.assert_async().await;
        running.assert_async().await;
        succeeded.assert_async().await;
        refetch.assert_async().await;
    }

    #[tokio::test]
    async fn failed_resource_carries_reason() {
        let mut server = Server::new_async().await;
        let _create = mock_create(&mut server, "w2").await;
        let _poll = server
            .mock("GET", "/operations/w2")
            .with_body(r#"{"status":"Failed"}"#)
            .create_async()
            .await;
        let _refetch = server
            .mock("GET", "/widgets/w2")
            .with_body(r#"{"id":"w2","status":"Failed","failureReason":"bad input"}"#)
            .create_async()
            .await;

        let client = StatefulResourceClient::<Widget>::new(
            create_test_client(&server.url()),
            fast_polls(),
        );
        let widget = client
            .create_and_wait_until_terminated(&Widget::new("w2"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(widget.status, OperationStatus::Failed);
        assert_eq!(widget.failure_reason.as_deref(), Some("bad input"));

        match ensure_succeeded(widget) {
            Err(ApiError::OperationFailed { id, status, reason }) => {
                assert_eq!(id, "w2");
                assert_eq!(status, OperationStatus::Failed);
                assert_eq!(reason.as_deref(), Some("bad input"));
            }
            other => panic!("Expected OperationFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_operation_location_is_protocol_violation() {
        let mut server = Server::new_async().await;
        let _create = server
            .mock("PUT", "/widgets/w3")
            .with_status(201)
            .with_body(r#"{"id":"w3"}"#)
            .create_async()
            .await;
        let poll = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = StatefulResourceClient::<Widget>::new(
            create_test_client(&server.url()),
            fast_polls(),
        );
        let result = client
            .create_and_wait_until_terminated(&Widget::new("w3"), &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(ApiError::ProtocolViolation(_))));
        poll.assert_async().await;
    }

    #[tokio::test]
    async fn vanished_resource_is_protocol_violation() {
        let mut server = Server::new_async().await;
        let _create = mock_create(&mut server, "w4").await;
        let _poll = server
            .mock("GET", "/operations/w4")
            .with_body(r#"{"status":"Succeeded"}"#)
            .create_async()
            .await;
        let _refetch = server
            .mock("GET", "/widgets/w4")
            .with_status(404)
            .create_async()
            .await;

        let client = StatefulResourceClient::<Widget>::new(
            create_test_client(&server.url()),
            fast_polls(),
        );
        let result = client
            .create_and_wait_until_terminated(&Widget::new("w4"), &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(ApiError::ProtocolViolation(_))));
    }

    #[tokio::test]
    async fn cancelled_before_submit_sends_nothing() {
        let mut server = Server::new_async().await;
        let any = server
            .mock("PUT", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();

        let client = StatefulResourceClient::<Widget>::new(
            create_test_client(&server.url()),
            fast_polls(),
        );
        let result = client
            .create_and_wait_until_terminated(&Widget::new("w5"), &cancel)
            .await;

        assert!(matches!(result, Err(ApiError::Canceled)));
        any.assert_async().await;
    }

    #[test]
    fn succeeded_passes_through() {
        let widget = Widget {
            status: OperationStatus::Succeeded,
            ..Widget::new("ok")
        };
        assert_eq!(ensure_succeeded(widget.clone()).unwrap(), widget);
    }
}
