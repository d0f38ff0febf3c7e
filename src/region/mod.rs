//! Editable trim region
//!
//! A single `[start, end]` selection over the waveform, kept inside the track
//! and never shorter than the configured minimum span.

pub mod editor;
pub mod types;

pub use editor::{RegionCallback, RegionEditor};
pub use types::{DragHandle, DragState, OverlayPosition, Region, RegionConstraints};
