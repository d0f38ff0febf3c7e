//! Controller state
//!
//! Defines the load state machine and the observable waveform state.

use crate::config::TrimmerConfig;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Current phase of the load state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "phase")]
pub enum LoadPhase {
    /// No source loaded
    Idle,
    /// Fetching peaks (when a peaks URL was supplied) before engine creation
    #[serde(rename_all = "camelCase")]
    Loading { with_peaks: bool },
    /// Engine created, waiting for it to report ready
    Initializing,
    Ready,
    Error,
}

impl Default for LoadPhase {
    fn default() -> Self {
        Self::Idle
    }
}

/// Audio to load, with optional precomputed peaks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSource {
    pub url: String,
    pub peaks_url: Option<String>,
}

impl AudioSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            peaks_url: None,
        }
    }

    pub fn with_peaks(mut self, peaks_url: impl Into<String>) -> Self {
        self.peaks_url = Some(peaks_url.into());
        self
    }
}

/// Observable waveform state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveformState {
    pub duration: f64,
    pub is_ready: bool,
    pub is_loading: bool,
    pub error: Option<String>,
    pub zoom_px_per_sec: f64,
    pub playback_rate: f64,
    pub is_playing: bool,
    pub current_time: f64,
}

impl WaveformState {
    pub fn new(config: &TrimmerConfig) -> Self {
        Self {
            duration: 0.0,
            is_ready: false,
            is_loading: false,
            error: None,
            zoom_px_per_sec: config.zoom.initial_px_per_sec,
            playback_rate: 1.0,
            is_playing: false,
            current_time: 0.0,
        }
    }
}

/// Create-clip modal bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalSession {
    /// Whether playback was running when the modal opened
    pub resume_on_cancel: bool,
}

/// Shared "still mounted" flag.
///
/// Work that completes after teardown checks this and drops its results.
#[derive(Debug, Clone)]
pub struct MountGuard(Arc<AtomicBool>);

impl MountGuard {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn unmount(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Default for MountGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifies one load of one source. Only the newest ticket may complete.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    pub(crate) generation: u64,
    pub(crate) source: AudioSource,
    latest: Arc<AtomicU64>,
    guard: MountGuard,
}

impl LoadTicket {
    pub(crate) fn new(
        generation: u64,
        source: AudioSource,
        latest: Arc<AtomicU64>,
        guard: MountGuard,
    ) -> Self {
        Self {
            generation,
            source,
            latest,
            guard,
        }
    }

    pub fn source(&self) -> &AudioSource {
        &self.source
    }

    /// Still the newest load and the controller is still mounted
    pub fn is_current(&self) -> bool {
        self.guard.is_mounted() && self.latest.load(Ordering::SeqCst) == self.generation
    }
}
