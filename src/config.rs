//! Trimmer configuration
//!
//! All tunables for the region editor and the waveform controller. Every field
//! has a default, so a config file only needs to name what it overrides.

use crate::utils::error::{TrimmerError, TrimmerResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZoomConfig {
    pub min_px_per_sec: f64,
    pub max_px_per_sec: f64,
    /// Factor applied by zoom in / divided by zoom out
    pub step: f64,
    /// Horizontal padding subtracted from the container for the initial fit
    pub fit_padding: f64,
    /// Lower bound for fit-to-clip so very long clips stay legible
    pub fit_clip_min_px_per_sec: f64,
    /// Delay before the initial fit is applied a second time
    pub settle_delay_ms: u64,
    pub initial_px_per_sec: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_px_per_sec: 10.0,
            max_px_per_sec: 500.0,
            step: 1.5,
            fit_padding: 40.0,
            fit_clip_min_px_per_sec: 20.0,
            settle_delay_ms: 100,
            initial_px_per_sec: 50.0,
        }
    }
}

impl ZoomConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Options forwarded to the waveform engine on creation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineOptions {
    pub height: u32,
    pub min_px_per_sec: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            height: 128,
            min_px_per_sec: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrimmerConfig {
    /// Shortest allowed region span in seconds
    pub min_duration: f64,
    /// Span of the region created when the host supplies no active clip
    pub default_clip_length: f64,
    /// Grab width of each region handle in pixels
    pub handle_width_px: f64,
    /// How long engine interaction stays disabled after a drag ends
    pub interaction_restore_ms: u64,
    /// Disables region-body dragging (handles stay draggable)
    pub read_only: bool,
    pub zoom: ZoomConfig,
    pub engine: EngineOptions,
}

impl Default for TrimmerConfig {
    fn default() -> Self {
        Self {
            min_duration: 20.0,
            default_clip_length: 60.0,
            handle_width_px: 8.0,
            interaction_restore_ms: 50,
            read_only: false,
            zoom: ZoomConfig::default(),
            engine: EngineOptions::default(),
        }
    }
}

impl TrimmerConfig {
    pub fn interaction_restore(&self) -> Duration {
        Duration::from_millis(self.interaction_restore_ms)
    }

    /// Parse a config from JSON, filling in defaults for missing fields
    pub fn from_json_str(content: &str) -> TrimmerResult<Self> {
        let config: TrimmerConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config from a JSON file on disk
    pub fn from_json_file(path: &Path) -> TrimmerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;

        tracing::debug!("Loaded trimmer config from {:?}", path);

        Ok(config)
    }

    pub fn validate(&self) -> TrimmerResult<()> {
        if !(self.min_duration > 0.0) {
            return Err(TrimmerError::Config(format!(
                "minDuration must be positive, got {}",
                self.min_duration
            )));
        }

        let zoom = &self.zoom;
        if !(zoom.min_px_per_sec > 0.0) || zoom.min_px_per_sec > zoom.max_px_per_sec {
            return Err(TrimmerError::Config(format!(
                "invalid zoom bounds [{}, {}]",
                zoom.min_px_per_sec, zoom.max_px_per_sec
            )));
        }

        if !(zoom.step > 1.0) {
            return Err(TrimmerError::Config(format!(
                "zoom step must be greater than 1, got {}",
                zoom.step
            )));
        }

        Ok(())
    }
}
