//! REST client for resources whose creation runs as a server-side operation.
//!
//! A write returns an `Operation-Location` header; [`OperationPoller`] follows
//! it until the operation is terminal and [`StatefulResourceClient`] ties the
//! submit, poll and refetch steps together.

mod client;
pub mod common;
pub mod error;
pub mod operation;
pub mod pool;
pub mod region;
pub mod resource;
pub mod stateful;

#[cfg(test)]
mod test_helpers;

pub use client::{Client, ClientConfig, RetryConfig};
pub use common::{
    ApiQueryParams, ApiResource, OperationStatus, Paginated, PaginationParams, StatefulResource,
    WithHeaders,
};
pub use error::ApiError;
pub use operation::{Operation, OperationPoller, PollConfig};
pub use pool::{ConnectionPoolConfig, ConnectionStats};
pub use region::RegionConfig;
pub use resource::ResourceClient;
pub use stateful::{ensure_succeeded, StatefulResourceClient};
pub use tokio_util::sync::CancellationToken;
