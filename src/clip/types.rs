//! Clip creation types
//!
//! These mirror the JSON the clip-creation API accepts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// The three mutually exclusive clip variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClipKind {
    Clip,
    Highlight,
    Trailer,
}

/// Intro audio waiting to be uploaded
#[derive(Debug, Clone)]
pub struct IntroUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Form state collected by the create-clip modal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipDraft {
    pub title: String,
    pub description: String,
    pub intro_text: String,
    pub tag_ids: Vec<String>,
    pub genre_ids: Vec<String>,
    pub tone_ids: Vec<String>,
    #[serde(skip)]
    pub intro_upload: Option<IntroUpload>,
}

/// Where the clip is cut from and who is cutting it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipSource {
    pub kind: ClipKind,
    pub audio_url: String,
    pub podcast_name: String,
    pub uploader_id: String,
    /// Episode fields passed through untouched
    #[serde(default)]
    pub episode: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntroPayload {
    pub intro_text: String,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    #[serde(rename = "contentURI")]
    pub content_uri: Option<String>,
    pub uploaded_by: String,
    pub podcast_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipBody {
    pub request_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub audio_url: String,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub title: String,
    pub description: String,
    pub tag_ids: Vec<String>,
    pub genre_ids: Vec<String>,
    pub tone_ids: Vec<String>,
    pub episode: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<IntroPayload>,
}

/// Clip creation payload, keyed by its kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClipPayload {
    Clip(ClipBody),
    Highlight(ClipBody),
    Trailer(ClipBody),
}

impl ClipPayload {
    pub fn new(kind: ClipKind, body: ClipBody) -> Self {
        match kind {
            ClipKind::Clip => ClipPayload::Clip(body),
            ClipKind::Highlight => ClipPayload::Highlight(body),
            ClipKind::Trailer => ClipPayload::Trailer(body),
        }
    }

    pub fn kind(&self) -> ClipKind {
        match self {
            ClipPayload::Clip(_) => ClipKind::Clip,
            ClipPayload::Highlight(_) => ClipKind::Highlight,
            ClipPayload::Trailer(_) => ClipKind::Trailer,
        }
    }

    pub fn body(&self) -> &ClipBody {
        match self {
            ClipPayload::Clip(body) | ClipPayload::Highlight(body) | ClipPayload::Trailer(body) => {
                body
            }
        }
    }
}
