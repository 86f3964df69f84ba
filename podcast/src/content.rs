//! Local content files turned into generation content
//!
//! Small text goes inline, small PDFs go inline as base64 and everything else
//! up to [`MAX_CONTENT_FILE_SIZE`] has to be uploaded as a temp file first.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use longrun::ApiError;
use std::path::{Path, PathBuf};

use crate::models::{ContentFileFormatKind, ContentSource};

/// Longest inline text, in characters.
pub const MAX_PLAIN_TEXT_LENGTH: usize = 1024 * 1024;

/// Longest inline base64 payload, in characters.
pub const MAX_BASE64_TEXT_LENGTH: usize = 8 * 1024 * 1024;

/// Largest file accepted for upload, in bytes.
pub const MAX_CONTENT_FILE_SIZE: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub enum PreparedContent {
    Inline(ContentSource),
    /// Upload the file and reference it by temp file id.
    NeedsUpload {
        path: PathBuf,
        format: Option<ContentFileFormatKind>,
    },
}

pub fn format_from_path(path: &Path) -> Option<ContentFileFormatKind> {
    let extension = path.extension()?.to_str()?;
    extension.parse().ok()
}

/// Reject files the service will not take before anything is sent.
pub async fn check_upload_size(path: &Path) -> Result<u64, ApiError> {
    let size = tokio::fs::metadata(path).await?.len();
    if size > MAX_CONTENT_FILE_SIZE {
        return Err(ApiError::PayloadTooLarge {
            size,
            limit: MAX_CONTENT_FILE_SIZE,
        });
    }
    Ok(size)
}

/// Decide how the file at `path` is handed to a generation.
pub async fn prepare_local_content(
    path: &Path,
    force_temp_file: bool,
) -> Result<PreparedContent, ApiError> {
    let format = format_from_path(path);

    if force_temp_file {
        check_upload_size(path).await?;
        return Ok(needs_upload(path, format));
    }

    match format {
        Some(ContentFileFormatKind::Txt) => prepare_text(path).await,
        Some(ContentFileFormatKind::Pdf) => prepare_pdf(path).await,
        None => Err(ApiError::InvalidArgument(format!(
            "unsupported content file format: {}",
            path.display()
        ))),
    }
}

async fn prepare_text(path: &Path) -> Result<PreparedContent, ApiError> {
    check_upload_size(path).await?;

    let text = tokio::fs::read_to_string(path).await?;
    if text.chars().count() <= MAX_PLAIN_TEXT_LENGTH {
        return Ok(PreparedContent::Inline(ContentSource::Text(text)));
    }

    tracing::debug!(
        "{} exceeds {} characters, uploading it",
        path.display(),
        MAX_PLAIN_TEXT_LENGTH
    );
    Ok(needs_upload(path, None))
}

async fn prepare_pdf(path: &Path) -> Result<PreparedContent, ApiError> {
    let size = check_upload_size(path).await?;

    if size as usize <= MAX_BASE64_TEXT_LENGTH {
        let bytes = tokio::fs::read(path).await?;
        let encoded = STANDARD.encode(&bytes);
        if encoded.len() <= MAX_BASE64_TEXT_LENGTH {
            return Ok(PreparedContent::Inline(ContentSource::Base64 {
                data: encoded,
                format: ContentFileFormatKind::Pdf,
            }));
        }
    }

    tracing::debug!(
        "{} does not fit inline as base64, uploading it",
        path.display()
    );
    Ok(needs_upload(path, Some(ContentFileFormatKind::Pdf)))
}

/// Inline text and base64 must fit their ceilings before they are sent.
pub fn check_inline_size(source: &ContentSource) -> Result<(), ApiError> {
    let (size, limit) = match source {
        ContentSource::Text(text) => (text.chars().count(), MAX_PLAIN_TEXT_LENGTH),
        ContentSource::Base64 { data, .. } => (data.len(), MAX_BASE64_TEXT_LENGTH),
        ContentSource::Url { .. } | ContentSource::TempFile { .. } => return Ok(()),
    };
    if size > limit {
        return Err(ApiError::PayloadTooLarge {
            size: size as u64,
            limit: limit as u64,
        });
    }
    Ok(())
}

fn needs_upload(path: &Path, format: Option<ContentFileFormatKind>) -> PreparedContent {
    // Only PDF content is tagged with a file format.
    PreparedContent::NeedsUpload {
        path: path.to_path_buf(),
        format: format.filter(|format| *format == ContentFileFormatKind::Pdf),
    }
}
