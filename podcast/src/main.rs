//! podcast-sample - command line sample for the podcast generation API.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing::Level;

mod commands;

use commands::{CreateGenerationArgs, DeleteArgs, GetArgs, ListArgs, UploadTempFileArgs};
use podcast::CancellationToken;

/// Podcast generation API sample.
///
/// Region, subscription key and API version can also come from the
/// PODCAST_REGION, PODCAST_SUBSCRIPTION_KEY and PODCAST_API_VERSION
/// environment variables.
#[derive(Parser)]
#[command(name = "podcast-sample")]
#[command(about = "Podcast generation API sample")]
#[command(version)]
pub struct Cli {
    /// Region name such as eastus, or a full endpoint URL
    #[arg(long, global = true, env = "PODCAST_REGION")]
    pub region: Option<String>,

    /// Subscription key sent with every request
    #[arg(long, global = true, env = "PODCAST_SUBSCRIPTION_KEY", hide_env_values = true)]
    pub subscription_key: Option<String>,

    /// API version (default 2026-01-01-preview)
    #[arg(long, global = true, env = "PODCAST_API_VERSION")]
    pub api_version: Option<String>,

    /// Use --region verbatim as the endpoint
    #[arg(long, global = true)]
    pub local: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a generation and wait until it terminates
    CreateGeneration(CreateGenerationArgs),
    /// List generations
    List(ListArgs),
    /// Show one generation
    Get(GetArgs),
    /// Delete a generation
    Delete(DeleteArgs),
    /// Upload a local file as a temp file
    UploadTempFile(UploadTempFileArgs),
    /// List temp files
    ListTempFiles(ListArgs),
    /// Show one temp file
    GetTempFile(GetArgs),
    /// Delete a temp file
    DeleteTempFile(DeleteArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .init();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, canceling");
            trigger.cancel();
        }
    });

    match run(&cli, &cancel).await {
        Ok(()) => {
            println!("Process completed successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to run: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, cancel: &CancellationToken) -> anyhow::Result<()> {
    let ctx = commands::Context::new(cli, cancel.clone())?;

    match &cli.command {
        Commands::CreateGeneration(args) => commands::generation::create(&ctx, args).await,
        Commands::List(args) => commands::generation::list(&ctx, args).await,
        Commands::Get(args) => commands::generation::get(&ctx, args).await,
        Commands::Delete(args) => commands::generation::delete(&ctx, args).await,
        Commands::UploadTempFile(args) => commands::temp_files::upload(&ctx, args).await,
        Commands::ListTempFiles(args) => commands::temp_files::list(&ctx, args).await,
        Commands::GetTempFile(args) => commands::temp_files::get(&ctx, args).await,
        Commands::DeleteTempFile(args) => commands::temp_files::delete(&ctx, args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use podcast::{PodcastHostKind, PodcastLengthKind};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_create_generation_options() {
        let cli = Cli::try_parse_from([
            "podcast-sample",
            "--region",
            "eastus",
            "--subscription-key",
            "key",
            "create-generation",
            "--content-file",
            "notes.txt",
            "--locale",
            "en-US",
            "--host",
            "twohosts",
            "--length",
            "short",
            "--upload-with-temp-file",
        ])
        .unwrap();

        assert_eq!(cli.region.as_deref(), Some("eastus"));
        match cli.command {
            Commands::CreateGeneration(args) => {
                assert_eq!(args.host, Some(PodcastHostKind::TwoHosts));
                assert_eq!(args.length, Some(PodcastLengthKind::Short));
                assert!(args.upload_with_temp_file);
                assert_eq!(args.locale, "en-US");
            }
            _ => panic!("Expected create-generation"),
        }
    }

    #[test]
    fn content_sources_are_mutually_exclusive() {
        let result = Cli::try_parse_from([
            "podcast-sample",
            "create-generation",
            "--locale",
            "en-US",
            "--content-file",
            "notes.txt",
            "--temp-file-id",
            "tf-1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let result = Cli::try_parse_from([
            "podcast-sample",
            "create-generation",
            "--locale",
            "en-US",
            "--temp-file-id",
            "tf-1",
            "--style",
            "dramatic",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn list_pagination_flags() {
        let cli = Cli::try_parse_from([
            "podcast-sample",
            "list-temp-files",
            "--top",
            "2",
            "--skip",
            "1",
            "--max-page-size",
            "2",
        ])
        .unwrap();

        match cli.command {
            Commands::ListTempFiles(args) => {
                assert_eq!(args.top, Some(2));
                assert_eq!(args.skip, Some(1));
                assert_eq!(args.max_page_size, Some(2));
            }
            _ => panic!("Expected list-temp-files"),
        }
    }
}
