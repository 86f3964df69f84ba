//! Generation commands.

use anyhow::anyhow;
use clap::Args;
use std::path::PathBuf;
use url::Url;
use uuid::Uuid;

use longrun::ensure_succeeded;
use podcast::{
    prepare_local_content, ContentSource, PodcastGenderPreferenceKind, PodcastGeneration,
    PodcastHostKind, PodcastLengthKind, PodcastScriptGenerationConfig, PodcastStyleKind,
    PodcastTtsConfig, PreparedContent,
};

use super::{print_delete_response, print_json, Context, DeleteArgs, GetArgs, ListArgs};

/// Expiry of temp files uploaded on behalf of a generation.
pub const CONTENT_TEMP_FILE_EXPIRY_MINS: u32 = 120;

/// Exactly one source of content.
#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct ContentArgs {
    /// Publicly readable URL of the content file
    #[arg(long)]
    pub content_url: Option<Url>,

    /// ID of an already uploaded temp file
    #[arg(long)]
    pub temp_file_id: Option<String>,

    /// Local .txt or .pdf content file
    #[arg(long)]
    pub content_file: Option<PathBuf>,
}

#[derive(Args)]
pub struct CreateGenerationArgs {
    /// Generation ID (random when omitted)
    #[arg(long)]
    pub id: Option<String>,

    #[command(flatten)]
    pub content: ContentArgs,

    /// Upload --content-file as a temp file even when it fits inline
    #[arg(long, requires = "content_file")]
    pub upload_with_temp_file: bool,

    /// Locale of the generated podcast, e.g. en-US
    #[arg(long)]
    pub locale: String,

    /// OneHost or TwoHosts
    #[arg(long)]
    pub host: Option<PodcastHostKind>,

    /// VeryShort, Short, Medium, Long or VeryLong
    #[arg(long)]
    pub length: Option<PodcastLengthKind>,

    /// Default, Professional or Casual
    #[arg(long)]
    pub style: Option<PodcastStyleKind>,

    /// Extra instructions for script generation
    #[arg(long)]
    pub additional_instructions: Option<String>,

    /// Neural voice for one host or multi-talker voice for two hosts
    #[arg(long)]
    pub voice_name: Option<String>,

    /// Male or Female
    #[arg(long)]
    pub gender_preference: Option<PodcastGenderPreferenceKind>,

    /// Multi-talker speaker names, e.g. ava,andrew
    #[arg(long)]
    pub multi_talker_voice_speaker_names: Option<String>,
}

impl CreateGenerationArgs {
    fn generation(&self, content: ContentSource) -> PodcastGeneration {
        let id = self
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut generation = PodcastGeneration::new(id, self.locale.clone(), content);
        generation.host = self.host;
        generation.script_generation = Some(PodcastScriptGenerationConfig {
            additional_instructions: self.additional_instructions.clone(),
            length: self.length,
            style: self.style,
        });
        generation.tts = Some(PodcastTtsConfig {
            voice_name: self.voice_name.clone(),
            gender_preference: self.gender_preference,
            multi_talker_voice_speaker_names: self.multi_talker_voice_speaker_names.clone(),
        });
        generation
    }
}

pub async fn create(ctx: &Context, args: &CreateGenerationArgs) -> anyhow::Result<()> {
    let client = ctx.podcast();
    let mut uploaded_temp_file = None;

    let content = if let Some(url) = &args.content.content_url {
        ContentSource::Url {
            url: url.clone(),
            format: None,
        }
    } else if let Some(id) = &args.content.temp_file_id {
        ContentSource::TempFile {
            id: id.clone(),
            format: None,
        }
    } else if let Some(path) = &args.content.content_file {
        match prepare_local_content(path, args.upload_with_temp_file).await? {
            PreparedContent::Inline(source) => source,
            PreparedContent::NeedsUpload { path, format } => {
                println!("Uploading content file: {}", path.display());
                let temp_file = client
                    .temp_files()
                    .upload(&path, Some(CONTENT_TEMP_FILE_EXPIRY_MINS))
                    .await?
                    .ok_or_else(|| anyhow!("temp file upload endpoint not found"))?;
                print_json(&temp_file)?;

                uploaded_temp_file = Some(temp_file.id.clone());
                ContentSource::TempFile {
                    id: temp_file.id,
                    format,
                }
            }
        }
    } else {
        return Err(anyhow!(
            "specify --content-file, --content-url or --temp-file-id"
        ));
    };

    let generation = args.generation(content);
    let result = client
        .generations()
        .create_and_wait_until_terminated(&generation, ctx.cancel())
        .await;

    if let Some(id) = uploaded_temp_file {
        println!("Deleting temp file with ID: {}", id);
        match ctx.cleanup_temp_files().delete(&id).await {
            Ok(response) => println!("Deleted temp file, status {}", response.status()),
            Err(e) => tracing::error!("Failed to delete temp file {}: {}", id, e),
        }
    }

    let generation = result?;
    println!("Created generation:");
    print_json(&generation)?;
    ensure_succeeded(generation)?;
    Ok(())
}

pub async fn list(ctx: &Context, args: &ListArgs) -> anyhow::Result<()> {
    let page = ctx
        .podcast()
        .generations()
        .list(&args.pagination())
        .await?;
    print_json(&page)
}

pub async fn get(ctx: &Context, args: &GetArgs) -> anyhow::Result<()> {
    let generation = ctx
        .podcast()
        .generations()
        .get(&args.id)
        .await?
        .ok_or_else(|| anyhow!("generation {} not found", args.id))?;
    print_json(&generation)
}

pub async fn delete(ctx: &Context, args: &DeleteArgs) -> anyhow::Result<()> {
    let response = ctx.podcast().generations().delete(&args.id).await?;
    print_delete_response(response).await
}
