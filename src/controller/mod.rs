//! Waveform controller
//!
//! This module implements the trim workflow around a single audio source:
//! - Load state machine with optional peaks prefetch
//! - Region editor lifetime, zoom and playback
//! - Create-clip modal coordination and payload submission

pub mod host;
pub mod state;
pub mod waveform;

pub use host::{BroadcastHost, HostEvent, TrimmerHost};
pub use state::{AudioSource, LoadPhase, LoadTicket, MountGuard, WaveformState};
pub use waveform::{fetch_peaks, WaveformController};
