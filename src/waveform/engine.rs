//! Waveform engine capability
//!
//! The trimmer never renders or decodes audio itself. It drives an opaque
//! engine through this narrow interface; the host adapts whatever renderer it
//! uses and feeds the engine's notifications back as [`EngineEvent`]s.

use super::peaks::PeakData;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kinds of notification an engine can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineEventKind {
    Ready,
    Error,
    TimeUpdate,
    Play,
    Pause,
    Finish,
    Redraw,
    Zoom,
    Scroll,
}

/// A notification emitted by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum EngineEvent {
    /// Audio decoded (or peaks applied) and duration known
    Ready { duration: f64 },
    /// Load, decode or network failure
    Error { message: String },
    /// Playhead moved
    TimeUpdate { time: f64 },
    Play,
    Pause,
    /// Playback reached the end of the requested range
    Finish,
    Redraw,
    #[serde(rename_all = "camelCase")]
    Zoom { px_per_sec: f64 },
    Scroll,
}

impl EngineEvent {
    pub fn kind(&self) -> EngineEventKind {
        match self {
            EngineEvent::Ready { .. } => EngineEventKind::Ready,
            EngineEvent::Error { .. } => EngineEventKind::Error,
            EngineEvent::TimeUpdate { .. } => EngineEventKind::TimeUpdate,
            EngineEvent::Play => EngineEventKind::Play,
            EngineEvent::Pause => EngineEventKind::Pause,
            EngineEvent::Finish => EngineEventKind::Finish,
            EngineEvent::Redraw => EngineEventKind::Redraw,
            EngineEvent::Zoom { .. } => EngineEventKind::Zoom,
            EngineEvent::Scroll => EngineEventKind::Scroll,
        }
    }
}

/// Token returned by [`WaveformEngine::on`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Configuration passed to [`EngineFactory::create`]
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Audio source URL
    pub url: String,
    pub height: u32,
    pub min_px_per_sec: f64,
    /// Precomputed peaks, when they could be fetched
    pub peaks: Option<PeakData>,
    /// Duration reported alongside the peaks
    pub duration: Option<f64>,
}

/// Engine creation errors
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine creation failed: {0}")]
    Create(String),
}

/// Handle to a live waveform engine instance
pub trait WaveformEngine: Send {
    /// Register interest in an event kind
    fn on(&mut self, kind: EngineEventKind) -> SubscriptionId;

    /// Drop a registration made with [`WaveformEngine::on`]
    fn unsubscribe(&mut self, id: SubscriptionId);

    /// Play from `start`, stopping at `end` when given
    fn play(&mut self, start: f64, end: Option<f64>);

    fn pause(&mut self);

    /// Move the playhead without changing play state
    fn set_time(&mut self, time: f64);

    fn zoom(&mut self, px_per_sec: f64);

    /// Scroll the view so `time` is at its left edge
    fn set_scroll_time(&mut self, time: f64);

    fn set_playback_rate(&mut self, rate: f64);

    /// Duration in seconds, `0.0` before ready
    fn duration(&self) -> f64;

    /// Width in pixels of the engine's wrapper element
    fn wrapper_width(&self) -> f64;

    /// Enable or disable the engine's own click-to-seek interaction
    fn toggle_interaction(&mut self, enabled: bool);

    fn destroy(&mut self);
}

/// Creates engine instances for an audio source
pub trait EngineFactory: Send + Sync {
    fn create(&self, config: EngineConfig) -> Result<Box<dyn WaveformEngine>, EngineError>;
}
