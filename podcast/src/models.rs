//! Wire types of the podcast generation API

use chrono::{DateTime, Utc};
use longrun::{ApiError, ApiResource, OperationStatus, StatefulResource};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value '{value}', expected one of: {expected}")]
pub struct ParseKindError {
    kind: &'static str,
    value: String,
    expected: String,
}

/// Unit enums serialized by variant name and parsed case-insensitively.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseKindError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| ParseKindError {
                        kind: stringify!($name),
                        value: s.to_string(),
                        expected: Self::ALL
                            .iter()
                            .map(|kind| kind.as_str())
                            .collect::<Vec<_>>()
                            .join("/"),
                    })
            }
        }
    };
}

wire_enum!(
    /// Number of hosts speaking in the podcast.
    PodcastHostKind { OneHost, TwoHosts }
);

wire_enum!(PodcastLengthKind {
    VeryShort,
    Short,
    Medium,
    Long,
    VeryLong,
});

wire_enum!(PodcastStyleKind {
    Default,
    Professional,
    Casual,
});

wire_enum!(PodcastGenderPreferenceKind { Male, Female });

wire_enum!(
    /// Format of content handed over as base64, URL or temp file.
    ContentFileFormatKind { Txt, Pdf }
);

/// Where the generation reads its source material from.
///
/// Exactly one source is sent; [`PodcastContent`] is its wire form.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentSource {
    Text(String),
    Base64 {
        data: String,
        format: ContentFileFormatKind,
    },
    Url {
        url: Url,
        format: Option<ContentFileFormatKind>,
    },
    TempFile {
        id: String,
        format: Option<ContentFileFormatKind>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodcastContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_format: Option<ContentFileFormatKind>,
}

impl From<ContentSource> for PodcastContent {
    fn from(source: ContentSource) -> Self {
        match source {
            ContentSource::Text(text) => Self {
                text: Some(text),
                ..Default::default()
            },
            ContentSource::Base64 { data, format } => Self {
                base64_text: Some(data),
                file_format: Some(format),
                ..Default::default()
            },
            ContentSource::Url { url, format } => Self {
                url: Some(url),
                file_format: format,
                ..Default::default()
            },
            ContentSource::TempFile { id, format } => Self {
                temp_file_id: Some(id),
                file_format: format,
                ..Default::default()
            },
        }
    }
}

impl PodcastContent {
    /// The single source this content names.
    pub fn source(&self) -> Result<ContentSource, ApiError> {
        let present = [
            self.url.is_some(),
            self.text.is_some(),
            self.base64_text.is_some(),
            self.temp_file_id.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count();

        if present != 1 {
            return Err(ApiError::InvalidArgument(format!(
                "content must name exactly one source, found {}",
                present
            )));
        }

        if let Some(url) = &self.url {
            return Ok(ContentSource::Url {
                url: url.clone(),
                format: self.file_format,
            });
        }
        if let Some(text) = &self.text {
            return Ok(ContentSource::Text(text.clone()));
        }
        if let Some(id) = &self.temp_file_id {
            return Ok(ContentSource::TempFile {
                id: id.clone(),
                format: self.file_format,
            });
        }

        match (&self.base64_text, self.file_format) {
            (Some(data), Some(format)) => Ok(ContentSource::Base64 {
                data: data.clone(),
                format,
            }),
            _ => Err(ApiError::InvalidArgument(
                "base64 content requires a file format".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodcastScriptGenerationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<PodcastLengthKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<PodcastStyleKind>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodcastTtsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender_preference: Option<PodcastGenderPreferenceKind>,
    /// Comma separated, e.g. `ava,steffan`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_talker_voice_speaker_names: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodcastGenerationOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_file_url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_file_url: Option<Url>,
}

/// A podcast generation job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodcastGeneration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<PodcastHostKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<PodcastContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_generation: Option<PodcastScriptGenerationConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tts: Option<PodcastTtsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PodcastGenerationOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OperationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_action_date_time: Option<DateTime<Utc>>,
}

impl PodcastGeneration {
    pub fn new(id: impl Into<String>, locale: impl Into<String>, content: ContentSource) -> Self {
        let id = id.into();
        Self {
            display_name: Some(id.clone()),
            description: Some(id.clone()),
            id: Some(id),
            locale: Some(locale.into()),
            content: Some(content.into()),
            ..Default::default()
        }
    }
}

impl ApiResource for PodcastGeneration {
    fn controller_name() -> &'static str {
        "generations"
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl StatefulResource for PodcastGeneration {
    fn status(&self) -> OperationStatus {
        self.status.unwrap_or_default()
    }

    fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }
}

/// A file uploaded for later reference by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempFile {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_date_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_in_bytes: Option<u64>,
}

impl ApiResource for TempFile {
    fn controller_name() -> &'static str {
        "tempfiles"
    }

    fn id(&self) -> Option<&str> {
        Some(self.id.as_str()).filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kinds_parse_case_insensitively() {
        assert_eq!(
            "twohosts".parse::<PodcastHostKind>().unwrap(),
            PodcastHostKind::TwoHosts
        );
        assert_eq!(
            " VERYLONG ".parse::<PodcastLengthKind>().unwrap(),
            PodcastLengthKind::VeryLong
        );
        assert_eq!(
            "casual".parse::<PodcastStyleKind>().unwrap(),
            PodcastStyleKind::Casual
        );
        assert_eq!(
            "female".parse::<PodcastGenderPreferenceKind>().unwrap(),
            PodcastGenderPreferenceKind::Female
        );
        assert_eq!(
            "PDF".parse::<ContentFileFormatKind>().unwrap(),
            ContentFileFormatKind::Pdf
        );

        let err = "ThreeHosts".parse::<PodcastHostKind>().unwrap_err();
        assert!(err.to_string().contains("OneHost/TwoHosts"));
    }

    #[test]
    fn generation_request_omits_server_fields() {
        let mut generation = PodcastGeneration::new(
            "gen-1",
            "en-US",
            ContentSource::Base64 {
                data: "JVBERi0=".to_string(),
                format: ContentFileFormatKind::Pdf,
            },
        );
        generation.host = Some(PodcastHostKind::TwoHosts);
        generation.script_generation = Some(PodcastScriptGenerationConfig {
            length: Some(PodcastLengthKind::Short),
            ..Default::default()
        });
        generation.tts = Some(PodcastTtsConfig {
            multi_talker_voice_speaker_names: Some("ava,steffan".to_string()),
            ..Default::default()
        });

        let value = serde_json::to_value(&generation).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "gen-1",
                "displayName": "gen-1",
                "description": "gen-1",
                "locale": "en-US",
                "host": "TwoHosts",
                "content": {"base64Text": "JVBERi0=", "fileFormat": "Pdf"},
                "scriptGeneration": {"length": "Short"},
                "tts": {"multiTalkerVoiceSpeakerNames": "ava,steffan"}
            })
        );
    }

    #[test]
    fn generation_deserializes_server_view() {
        let generation: PodcastGeneration = serde_json::from_value(json!({
            "id": "gen-2",
            "locale": "zh-CN",
            "status": "Succeeded",
            "content": {"tempFileId": "tf-1"},
            "output": {
                "audioFileUrl": "https://blob.example.com/audio.mp3",
                "reportFileUrl": "https://blob.example.com/report.json"
            },
            "createdDateTime": "2026-01-05T10:00:00Z",
            "lastActionDateTime": "2026-01-05T10:03:12Z"
        }))
        .unwrap();

        assert_eq!(generation.status(), OperationStatus::Succeeded);
        assert_eq!(
            generation
                .output
                .as_ref()
                .and_then(|o| o.audio_file_url.as_ref())
                .map(Url::as_str),
            Some("https://blob.example.com/audio.mp3")
        );
        assert!(generation.created_date_time.is_some());
        assert_eq!(
            generation.content.unwrap().source().unwrap(),
            ContentSource::TempFile {
                id: "tf-1".to_string(),
                format: None
            }
        );
    }

    #[test]
    fn content_must_name_exactly_one_source() {
        let empty = PodcastContent::default();
        assert!(matches!(empty.source(), Err(ApiError::InvalidArgument(_))));

        let both = PodcastContent {
            text: Some("hi".to_string()),
            temp_file_id: Some("tf".to_string()),
            ..Default::default()
        };
        assert!(matches!(both.source(), Err(ApiError::InvalidArgument(_))));

        let base64_without_format = PodcastContent {
            base64_text: Some("AA==".to_string()),
            ..Default::default()
        };
        assert!(base64_without_format.source().is_err());

        let text: PodcastContent = ContentSource::Text("hello".to_string()).into();
        assert_eq!(text.file_format, None);
        assert_eq!(
            serde_json::to_value(&text).unwrap(),
            json!({"text": "hello"})
        );
        assert_eq!(text.source().unwrap(), ContentSource::Text("hello".to_string()));
    }

    #[test]
    fn temp_file_wire_shape() {
        let file: TempFile = serde_json::from_value(json!({
            "id": "tf-9",
            "name": "notes.pdf",
            "createdDateTime": "2026-01-05T10:00:00Z",
            "expiresDateTime": "2026-01-05T12:00:00Z",
            "sizeInBytes": 1024
        }))
        .unwrap();

        assert_eq!(file.id(), Some("tf-9"));
        assert_eq!(file.size_in_bytes, Some(1024));
        assert!(file.expires_date_time > file.created_date_time);
        assert_eq!(TempFile::default().id(), None);
    }
}
