//! Precomputed peak data
//!
//! Peaks are published next to the audio as a JSON document:
//!
//! ```json
//! { "peaks": [0.1, 0.4, 0.2], "duration": 61.5 }
//! { "peaks": [[0.1, 0.4], [0.2, 0.3]] }
//! ```
//!
//! A flat array is a single channel, an array of arrays is one array per
//! channel. `duration` is optional.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Peak amplitudes, one vector per channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakData {
    pub channels: Vec<Vec<f32>>,
    pub duration: Option<f64>,
}

impl PeakData {
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

/// Peak fetch and parse errors
#[derive(Error, Debug)]
pub enum PeaksError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("Malformed peaks payload: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for PeaksError {
    fn from(e: reqwest::Error) -> Self {
        PeaksError::Network(e.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPeaks {
    Mono(Vec<f32>),
    Multi(Vec<Vec<f32>>),
}

#[derive(Deserialize)]
struct PeaksDocument {
    #[serde(default)]
    peaks: serde_json::Value,
    #[serde(default)]
    duration: serde_json::Value,
}

/// Parse a peaks document from its JSON value
pub fn parse_peaks(value: serde_json::Value) -> Result<PeakData, PeaksError> {
    let document: PeaksDocument = serde_json::from_value(value)?;

    if !document.peaks.is_array() {
        return Err(PeaksError::Malformed("`peaks` is not an array".to_string()));
    }

    let channels = match serde_json::from_value::<RawPeaks>(document.peaks) {
        Ok(RawPeaks::Mono(samples)) => vec![samples],
        Ok(RawPeaks::Multi(channels)) => channels,
        Err(_) => {
            return Err(PeaksError::Malformed(
                "`peaks` must hold numbers or arrays of numbers".to_string(),
            ))
        }
    };

    if channels.is_empty() || channels.iter().any(|c| c.is_empty()) {
        return Err(PeaksError::Malformed("`peaks` has an empty channel".to_string()));
    }

    // A bad duration is dropped; the engine measures the audio instead
    let duration = document
        .duration
        .as_f64()
        .filter(|d| d.is_finite() && *d > 0.0);

    Ok(PeakData { channels, duration })
}

/// Parse a peaks document from JSON text
pub fn parse_peaks_str(content: &str) -> Result<PeakData, PeaksError> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    parse_peaks(value)
}

/// Source of precomputed peaks
#[async_trait]
pub trait PeaksFetcher: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<PeakData, PeaksError>;
}

/// Fetches peaks over HTTP(S)
#[derive(Debug, Clone, Default)]
pub struct HttpPeaksFetcher {
    client: reqwest::Client,
}

impl HttpPeaksFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PeaksFetcher for HttpPeaksFetcher {
    async fn fetch(&self, location: &str) -> Result<PeakData, PeaksError> {
        tracing::debug!("Fetching peaks from {}", location);

        let response = self.client.get(location).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PeaksError::Status(status.as_u16()));
        }

        let value: serde_json::Value = response.json().await?;
        parse_peaks(value)
    }
}

/// Reads peaks documents from local disk, resolving relative locations
/// against `root`
#[derive(Debug, Clone, Default)]
pub struct FilePeaksFetcher {
    root: Option<PathBuf>,
}

impl FilePeaksFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, location: &str) -> PathBuf {
        let path = PathBuf::from(location.strip_prefix("file://").unwrap_or(location));
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path,
        }
    }
}

#[async_trait]
impl PeaksFetcher for FilePeaksFetcher {
    async fn fetch(&self, location: &str) -> Result<PeakData, PeaksError> {
        let path = self.resolve(location);
        tracing::debug!("Reading peaks from {:?}", path);

        let content = tokio::fs::read_to_string(&path).await?;
        parse_peaks_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_parse_mono_peaks() {
        let data = parse_peaks(json!({ "peaks": [0.1, 0.5, 0.25], "duration": 12.5 })).unwrap();
        assert_eq!(data.channel_count(), 1);
        assert_eq!(data.channels[0], vec![0.1, 0.5, 0.25]);
        assert_eq!(data.duration, Some(12.5));
    }

    #[test]
    fn test_parse_multichannel_peaks() {
        let data = parse_peaks(json!({ "peaks": [[0.1, 0.2], [0.3, 0.4]] })).unwrap();
        assert_eq!(data.channel_count(), 2);
        assert_eq!(data.channels[1], vec![0.3, 0.4]);
        assert_eq!(data.duration, None);
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(matches!(
            parse_peaks(json!({ "peaks": "nope" })),
            Err(PeaksError::Malformed(_))
        ));
        assert!(matches!(
            parse_peaks(json!({ "duration": 10 })),
            Err(PeaksError::Malformed(_))
        ));
        assert!(matches!(
            parse_peaks(json!({ "peaks": [0.1, "x"] })),
            Err(PeaksError::Malformed(_))
        ));
        assert!(matches!(
            parse_peaks(json!({ "peaks": [] })),
            Err(PeaksError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_ignores_invalid_duration() {
        let data = parse_peaks(json!({ "peaks": [0.1], "duration": -3.0 })).unwrap();
        assert_eq!(data.duration, None);

        let data = parse_peaks(json!({ "peaks": [0.1, 0.4], "duration": "61" })).unwrap();
        assert_eq!(data.channels, vec![vec![0.1, 0.4]]);
        assert_eq!(data.duration, None);

        let data = parse_peaks(json!({ "peaks": [0.1], "duration": null })).unwrap();
        assert_eq!(data.duration, None);
    }

    #[tokio::test]
    async fn test_file_fetcher_reads_relative_to_root() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("episode.json"),
            r#"{ "peaks": [0.2, 0.9], "duration": 2.0 }"#,
        )
        .unwrap();

        let fetcher = FilePeaksFetcher::with_root(dir.path());
        let data = fetcher.fetch("episode.json").await.unwrap();
        assert_eq!(data.channels, vec![vec![0.2, 0.9]]);

        let missing = fetcher.fetch("missing.json").await;
        assert!(matches!(missing, Err(PeaksError::Io(_))));
    }
}
