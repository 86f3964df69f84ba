//! Client for the podcast generation API.
//!
//! ```no_run
//! # async fn run() -> Result<(), podcast::ApiError> {
//! use podcast::{CancellationToken, ContentSource, PodcastClient, PodcastConfig, PodcastGeneration};
//!
//! let client = PodcastClient::new(PodcastConfig::new("eastus").with_env_fallbacks())?;
//! let generation = PodcastGeneration::new(
//!     "my-first-podcast",
//!     "en-US",
//!     ContentSource::Text("Rust ownership in five minutes".to_string()),
//! );
//! let done = client
//!     .generations()
//!     .create_and_wait_until_terminated(&generation, &CancellationToken::new())
//!     .await?;
//! println!("{:?}", done.output);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod content;
pub mod generations;
pub mod models;
pub mod tempfiles;

use longrun::Client;

pub use longrun::{ApiError, CancellationToken};

pub use config::PodcastConfig;
pub use content::{check_inline_size, prepare_local_content, PreparedContent};
pub use generations::GenerationClient;
pub use models::{
    ContentFileFormatKind, ContentSource, PodcastContent, PodcastGenderPreferenceKind,
    PodcastGeneration, PodcastGenerationOutput, PodcastHostKind, PodcastLengthKind,
    PodcastScriptGenerationConfig, PodcastStyleKind, PodcastTtsConfig, TempFile,
};
pub use tempfiles::TempFileClient;

/// Generation and temp file clients sharing one connection pool.
pub struct PodcastClient {
    generations: GenerationClient,
    temp_files: TempFileClient,
}

impl PodcastClient {
    pub fn new(config: PodcastConfig) -> Result<Self, ApiError> {
        let client = Client::new(config.client_config()?)?;
        Ok(Self::from_client(client, config))
    }

    /// Build on an existing client, e.g. one bound to a cancellation token.
    pub fn from_client(client: Client, config: PodcastConfig) -> Self {
        Self {
            generations: GenerationClient::new(client.clone(), config.poll),
            temp_files: TempFileClient::new(client),
        }
    }

    pub fn generations(&self) -> &GenerationClient {
        &self.generations
    }

    pub fn temp_files(&self) -> &TempFileClient {
        &self.temp_files
    }
}
