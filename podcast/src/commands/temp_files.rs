//! Temp file commands.

use anyhow::anyhow;
use clap::Args;
use std::path::PathBuf;

use super::{print_delete_response, print_json, Context, DeleteArgs, GetArgs, ListArgs};

#[derive(Args)]
pub struct UploadTempFileArgs {
    /// Local file to upload
    #[arg(long)]
    pub file: PathBuf,

    /// Minutes until the service removes the file (1-1440)
    #[arg(long)]
    pub expires_after_in_mins: Option<u32>,
}

pub async fn upload(ctx: &Context, args: &UploadTempFileArgs) -> anyhow::Result<()> {
    let temp_file = ctx
        .podcast()
        .temp_files()
        .upload(&args.file, args.expires_after_in_mins)
        .await?
        .ok_or_else(|| anyhow!("temp file upload endpoint not found"))?;
    print_json(&temp_file)
}

pub async fn list(ctx: &Context, args: &ListArgs) -> anyhow::Result<()> {
    let page = ctx
        .podcast()
        .temp_files()
        .list(&args.pagination())
        .await?;
    print_json(&page)
}

pub async fn get(ctx: &Context, args: &GetArgs) -> anyhow::Result<()> {
    let temp_file = ctx
        .podcast()
        .temp_files()
        .get(&args.id)
        .await?
        .ok_or_else(|| anyhow!("temp file {} not found", args.id))?;
    print_json(&temp_file)
}

pub async fn delete(ctx: &Context, args: &DeleteArgs) -> anyhow::Result<()> {
    let response = ctx.podcast().temp_files().delete(&args.id).await?;
    print_delete_response(response).await
}
