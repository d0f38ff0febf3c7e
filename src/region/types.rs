//! Region data types

use crate::config::TrimmerConfig;
use crate::utils::time::{clamp, snap};
use crate::waveform::geometry::ContainerRect;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tolerance for span comparisons after float arithmetic
pub const SPAN_EPSILON: f64 = 1e-9;

/// The editable time range, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub start: f64,
    pub end: f64,
}

impl Region {
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end
    }
}

/// What a pointer grabbed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragHandle {
    Start,
    End,
    /// The region body, moved as a whole
    Region,
}

/// Drag state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging(DragHandle),
}

impl Default for DragState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Overlay placement as percentages of the container width
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayPosition {
    pub left_percent: f64,
    pub right_percent: f64,
}

impl OverlayPosition {
    pub fn for_region(region: Region, duration: f64) -> Self {
        if !(duration > 0.0) {
            return Self {
                left_percent: 0.0,
                right_percent: 0.0,
            };
        }
        Self {
            left_percent: region.start / duration * 100.0,
            right_percent: (duration - region.end) / duration * 100.0,
        }
    }
}

/// Limits a region editor enforces
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionConstraints {
    pub duration: f64,
    pub min_duration: f64,
    pub read_only: bool,
    pub handle_width_px: f64,
    pub interaction_restore: Duration,
}

impl RegionConstraints {
    pub fn from_config(config: &TrimmerConfig, duration: f64) -> Self {
        Self {
            duration,
            min_duration: config.min_duration,
            read_only: config.read_only,
            handle_width_px: config.handle_width_px,
            interaction_restore: config.interaction_restore(),
        }
    }

    /// Whether any region at all fits in the track
    pub fn is_feasible(&self) -> bool {
        self.duration.is_finite() && self.duration >= self.min_duration
    }

    /// Snap and clamp a requested range into a valid region.
    ///
    /// `start` lands in `[0, duration - min]` and `end` in
    /// `[start + min, duration]`. `None` when the track is shorter than the
    /// minimum span.
    pub fn clamp_range(&self, start: f64, end: f64) -> Option<Region> {
        if !self.is_feasible() {
            return None;
        }

        let start = if start.is_finite() { snap(start) } else { 0.0 };
        let end = if end.is_finite() { snap(end) } else { self.duration };

        let start = clamp(start, 0.0, self.duration - self.min_duration);
        let end = clamp(end, start + self.min_duration, self.duration);

        if end - start < self.min_duration - SPAN_EPSILON {
            return None;
        }

        Some(Region { start, end })
    }
}

/// Ephemeral state between pointer-down and pointer-up.
///
/// While a session exists the editor holds the document-level pointer
/// listeners; dropping the session releases them.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DragSession {
    pub handle: DragHandle,
    pub origin_start: f64,
    pub origin_end: f64,
    pub origin_x: f64,
    /// Pointer time at `origin_x`
    pub anchor: f64,
    pub rect: ContainerRect,
}
