//! CLI commands module.

pub mod generation;
pub mod temp_files;

use anyhow::Context as _;
use clap::Args;
use longrun::{Client, PaginationParams};
use podcast::{CancellationToken, PodcastClient, PodcastConfig, TempFileClient};
use serde::Serialize;

use crate::Cli;

pub use generation::CreateGenerationArgs;
pub use temp_files::UploadTempFileArgs;

#[derive(Args)]
pub struct ListArgs {
    /// Number of items to return
    #[arg(long)]
    pub top: Option<u32>,
    /// Number of items to skip
    #[arg(long)]
    pub skip: Option<u32>,
    /// Page size requested from the service
    #[arg(long)]
    pub max_page_size: Option<u32>,
}

impl ListArgs {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            top: self.top,
            skip: self.skip,
            max_page_size: self.max_page_size,
        }
    }
}

#[derive(Args)]
pub struct GetArgs {
    /// Resource ID
    pub id: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Resource ID
    pub id: String,
}

/// Clients shared by all commands of one invocation.
pub struct Context {
    client: Client,
    config: PodcastConfig,
    cancel: CancellationToken,
}

impl Context {
    pub fn new(cli: &Cli, cancel: CancellationToken) -> anyhow::Result<Self> {
        let mut config = PodcastConfig {
            region: cli.region.clone(),
            subscription_key: cli.subscription_key.clone(),
            api_version: cli.api_version.clone(),
            ..Default::default()
        };
        if cli.local {
            config.local = Some(true);
        }
        let config = config.with_env_fallbacks();

        let client_config = config
            .client_config()
            .context("invalid client configuration")?;
        tracing::debug!("Using endpoint {}", client_config.endpoint);

        Ok(Self {
            client: Client::new(client_config)?,
            config,
            cancel,
        })
    }

    /// Clients whose requests stop on Ctrl-C.
    pub fn podcast(&self) -> PodcastClient {
        PodcastClient::from_client(
            self.client.with_cancellation(self.cancel.clone()),
            self.config.clone(),
        )
    }

    /// Temp file client that keeps working after Ctrl-C, for cleanup.
    pub fn cleanup_temp_files(&self) -> TempFileClient {
        TempFileClient::new(self.client.clone())
    }

    pub fn cancel(&self) -> &CancellationToken {
        &self.cancel
    }
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the status line and body of a delete.
pub async fn print_delete_response(response: reqwest::Response) -> anyhow::Result<()> {
    println!("{}", response.status());
    let body = response.text().await?;
    if !body.trim().is_empty() {
        println!("{}", body);
    }
    Ok(())
}
