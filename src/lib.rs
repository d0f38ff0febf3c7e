//! Podclip Trimmer - waveform region editing for podcast clip curation.
//!
//! The crate keeps a start/end selection consistent with a rendered waveform
//! while the view zooms, scrolls and redraws, and coordinates playback and
//! clip creation around it. Rendering and decoding belong to an external
//! waveform engine driven through [`waveform::WaveformEngine`].

pub mod clip;
pub mod config;
pub mod controller;
pub mod region;
pub mod utils;
pub mod waveform;

pub use clip::{ClipDraft, ClipPayload, ClipPayloadBuilder};
pub use config::TrimmerConfig;
pub use controller::{AudioSource, WaveformController, WaveformState};
pub use region::{Region, RegionEditor};
pub use utils::error::{TrimmerError, TrimmerResult};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging.
///
/// Honors `RUST_LOG`; safe to call more than once.
pub fn init_tracing() {
    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "podclip_trimmer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if result.is_ok() {
        tracing::info!("Starting Podclip Trimmer v{}", env!("CARGO_PKG_VERSION"));
    }
}
