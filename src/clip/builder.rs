//! Clip payload assembly
//!
//! A pending intro upload always finishes before assembly starts. If the
//! upload fails nothing is assembled.

use super::types::{ClipBody, ClipDraft, ClipPayload, ClipSource, IntroPayload, IntroUpload};
use crate::region::Region;
use crate::utils::error::{TrimmerError, TrimmerResult};
use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

/// Intro upload errors
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("{0}")]
    Failed(String),

    #[error("upload rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// Uploads intro audio and returns its content URI
#[async_trait]
pub trait IntroUploader: Send + Sync {
    async fn upload(&self, upload: &IntroUpload) -> Result<String, UploadError>;
}

pub struct ClipPayloadBuilder {
    source: ClipSource,
}

impl ClipPayloadBuilder {
    pub fn new(source: ClipSource) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &ClipSource {
        &self.source
    }

    /// Upload the draft's intro (if any), then assemble the payload
    pub async fn build(
        &self,
        region: Region,
        draft: &ClipDraft,
        uploaded_intro_url: Option<&str>,
        uploader: &dyn IntroUploader,
    ) -> TrimmerResult<ClipPayload> {
        validate(region, draft)?;

        let intro_url = match &draft.intro_upload {
            Some(upload) => {
                tracing::info!("Uploading intro audio {}", upload.file_name);
                let url = uploader.upload(upload).await.map_err(|e| {
                    tracing::error!("Intro upload failed: {}", e);
                    TrimmerError::Upload(e.to_string())
                })?;
                Some(url)
            }
            None => uploaded_intro_url.map(str::to_string),
        };

        Ok(self.assemble(region, draft, intro_url))
    }

    /// Assemble a payload from already-resolved parts
    pub fn assemble(
        &self,
        region: Region,
        draft: &ClipDraft,
        intro_url: Option<String>,
    ) -> ClipPayload {
        let has_intro = !draft.intro_text.trim().is_empty() || intro_url.is_some();
        let intro = has_intro.then(|| IntroPayload {
            intro_text: draft.intro_text.clone(),
            start_time: 0.0,
            end_time: 0.0,
            duration: 0.0,
            content_uri: intro_url,
            uploaded_by: self.source.uploader_id.clone(),
            podcast_name: self.source.podcast_name.clone(),
        });

        let body = ClipBody {
            request_id: Uuid::new_v4(),
            created_at: Utc::now(),
            audio_url: self.source.audio_url.clone(),
            start_time: region.start,
            end_time: region.end,
            duration: region.span(),
            title: draft.title.trim().to_string(),
            description: draft.description.clone(),
            tag_ids: draft.tag_ids.clone(),
            genre_ids: draft.genre_ids.clone(),
            tone_ids: draft.tone_ids.clone(),
            episode: self.source.episode.clone(),
            intro,
        };

        ClipPayload::new(self.source.kind, body)
    }
}

fn validate(region: Region, draft: &ClipDraft) -> TrimmerResult<()> {
    if !region.start.is_finite() || !region.end.is_finite() || region.end <= region.start {
        return Err(TrimmerError::Payload(format!(
            "invalid trim range {} - {}",
            region.start, region.end
        )));
    }
    if draft.title.trim().is_empty() {
        return Err(TrimmerError::Payload("title is required".to_string()));
    }
    Ok(())
}
