//! Clip payload construction

pub mod builder;
pub mod types;

pub use builder::{ClipPayloadBuilder, IntroUploader, UploadError};
pub use types::{
    ClipBody, ClipDraft, ClipKind, ClipPayload, ClipSource, IntroPayload, IntroUpload,
};
