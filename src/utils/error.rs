//! Error types and handling
//!
//! Common error types used across the trimmer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum TrimmerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Waveform engine error: {0}")]
    Engine(String),

    #[error("Peaks error: {0}")]
    Peaks(String),

    #[error("Intro upload failed: {0}")]
    Upload(String),

    #[error("Clip payload error: {0}")]
    Payload(String),

    #[error("Waveform is not ready")]
    NotReady,

    #[error("Controller has been torn down")]
    Unmounted,
}

/// Error response for the host UI
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<TrimmerError> for ErrorResponse {
    fn from(error: TrimmerError) -> Self {
        let code = match &error {
            TrimmerError::Io(_) => "IO_ERROR",
            TrimmerError::Serialization(_) => "SERIALIZATION_ERROR",
            TrimmerError::Config(_) => "CONFIG_ERROR",
            TrimmerError::Engine(_) => "ENGINE_ERROR",
            TrimmerError::Peaks(_) => "PEAKS_ERROR",
            TrimmerError::Upload(_) => "UPLOAD_ERROR",
            TrimmerError::Payload(_) => "PAYLOAD_ERROR",
            TrimmerError::NotReady => "NOT_READY",
            TrimmerError::Unmounted => "UNMOUNTED",
        };

        ErrorResponse {
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

/// Result type alias using TrimmerError
pub type TrimmerResult<T> = Result<T, TrimmerError>;
