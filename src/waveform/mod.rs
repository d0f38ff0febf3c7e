//! Waveform engine boundary
//!
//! Geometry, the engine capability the trimmer drives, subscription tracking
//! and precomputed peak loading.

pub mod engine;
pub mod geometry;
pub mod peaks;
pub mod subscriptions;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{
    EngineConfig, EngineError, EngineEvent, EngineEventKind, EngineFactory, SubscriptionId,
    WaveformEngine,
};
pub use geometry::{pixel_to_time, time_to_pixel, ContainerRect};
pub use peaks::{FilePeaksFetcher, HttpPeaksFetcher, PeakData, PeaksError, PeaksFetcher};
pub use subscriptions::Subscriptions;
