//! Screen-pixel to audio-time conversion

use serde::{Deserialize, Serialize};

/// Horizontal bounding box of the waveform container, in client pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerRect {
    pub left: f64,
    pub width: f64,
}

impl ContainerRect {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// Map a client X coordinate to a time within `[0, duration]`.
///
/// Returns `0.0` for a collapsed container or an unknown duration.
pub fn pixel_to_time(client_x: f64, rect: ContainerRect, duration: f64) -> f64 {
    if !(rect.width > 0.0) || !(duration > 0.0) {
        return 0.0;
    }

    let t = ((client_x - rect.left) / rect.width) * duration;
    t.clamp(0.0, duration)
}

/// Inverse of [`pixel_to_time`] for a time already inside `[0, duration]`.
pub fn time_to_pixel(time: f64, rect: ContainerRect, duration: f64) -> f64 {
    if !(duration > 0.0) {
        return rect.left;
    }
    rect.left + (time / duration) * rect.width
}
