//! Waveform controller
//!
//! Drives the engine lifecycle (load, ready, error), owns the region editor,
//! and coordinates zoom, playback and the create-clip workflow.
//!
//! The host feeds engine notifications in through
//! [`WaveformController::handle_engine_event`] and advances delayed work with
//! [`WaveformController::tick`].

use super::host::TrimmerHost;
use super::state::{AudioSource, LoadPhase, LoadTicket, ModalSession, MountGuard, WaveformState};
use crate::clip::{ClipDraft, ClipPayload, ClipPayloadBuilder, IntroUploader};
use crate::config::TrimmerConfig;
use crate::region::{DragHandle, Region, RegionConstraints, RegionEditor};
use crate::utils::error::{TrimmerError, TrimmerResult};
use crate::utils::time::{clamp, format_time};
use crate::utils::timer::{take_due, DelayedTask};
use crate::waveform::engine::{
    EngineConfig, EngineEvent, EngineEventKind, EngineFactory, WaveformEngine,
};
use crate::waveform::geometry::ContainerRect;
use crate::waveform::peaks::{PeakData, PeaksFetcher};
use crate::waveform::subscriptions::Subscriptions;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Engine notifications the controller itself consumes
const CONTROLLER_EVENTS: [EngineEventKind; 7] = [
    EngineEventKind::Ready,
    EngineEventKind::Error,
    EngineEventKind::TimeUpdate,
    EngineEventKind::Play,
    EngineEventKind::Pause,
    EngineEventKind::Finish,
    EngineEventKind::Zoom,
];

const MIN_PLAYBACK_RATE: f64 = 0.25;
const MAX_PLAYBACK_RATE: f64 = 4.0;

pub struct WaveformController {
    config: TrimmerConfig,
    factory: Arc<dyn EngineFactory>,
    peaks_fetcher: Arc<dyn PeaksFetcher>,
    host: Arc<dyn TrimmerHost>,

    state: WaveformState,
    phase: LoadPhase,
    source: Option<AudioSource>,

    engine: Option<Box<dyn WaveformEngine>>,
    editor: Option<RegionEditor>,
    subscriptions: Subscriptions,

    /// Range the host wants selected once the waveform is ready
    active_clip: Option<Region>,
    auto_play: bool,
    /// Overrides the engine wrapper width when set
    container_width: Option<f64>,

    settle_refit: Option<DelayedTask<()>>,
    modal: Option<ModalSession>,

    mounted: MountGuard,
    generation: Arc<AtomicU64>,
}

impl WaveformController {
    pub fn new(
        config: TrimmerConfig,
        factory: Arc<dyn EngineFactory>,
        peaks_fetcher: Arc<dyn PeaksFetcher>,
        host: Arc<dyn TrimmerHost>,
    ) -> Self {
        let state = WaveformState::new(&config);
        Self {
            config,
            factory,
            peaks_fetcher,
            host,
            state,
            phase: LoadPhase::Idle,
            source: None,
            engine: None,
            editor: None,
            subscriptions: Subscriptions::new(),
            active_clip: None,
            auto_play: false,
            container_width: None,
            settle_refit: None,
            modal: None,
            mounted: MountGuard::new(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn config(&self) -> &TrimmerConfig {
        &self.config
    }

    pub fn state(&self) -> &WaveformState {
        &self.state
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn source(&self) -> Option<&AudioSource> {
        self.source.as_ref()
    }

    pub fn region(&self) -> Option<Region> {
        self.editor.as_ref().and_then(RegionEditor::region)
    }

    pub fn editor(&self) -> Option<&RegionEditor> {
        self.editor.as_ref()
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal.is_some()
    }

    pub fn mount_guard(&self) -> MountGuard {
        self.mounted.clone()
    }

    /// Ready, but the track is shorter than the minimum span
    pub fn is_too_short(&self) -> bool {
        self.phase == LoadPhase::Ready && self.region().is_none()
    }

    /// Playhead as `M:SS` / `H:MM:SS`
    pub fn current_time_label(&self) -> String {
        format_time(Some(self.state.current_time))
    }

    /// Track length as `M:SS` / `H:MM:SS`, placeholder until ready
    pub fn duration_label(&self) -> String {
        format_time(self.state.is_ready.then_some(self.state.duration))
    }

    pub fn set_auto_play(&mut self, auto_play: bool) {
        self.auto_play = auto_play;
    }

    pub fn set_container_width(&mut self, width: f64) {
        self.container_width = (width > 0.0).then_some(width);
    }

    fn container_width(&self) -> f64 {
        self.container_width
            .or_else(|| self.engine.as_ref().map(|e| e.wrapper_width()))
            .unwrap_or(0.0)
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Load `source`, fetching its peaks first when it names a peaks URL
    pub async fn load(&mut self, source: AudioSource) {
        let ticket = self.begin_load(source);
        let peaks = fetch_peaks(&ticket, self.peaks_fetcher.clone()).await;
        self.finish_load(ticket, peaks);
    }

    /// Tear down the current source and start a new load.
    ///
    /// Any earlier ticket becomes stale.
    pub fn begin_load(&mut self, source: AudioSource) -> LoadTicket {
        self.teardown_engine();

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let with_peaks = source.peaks_url.is_some();

        tracing::info!("Loading audio {} (peaks: {})", source.url, with_peaks);

        self.state = WaveformState {
            zoom_px_per_sec: self.state.zoom_px_per_sec,
            playback_rate: self.state.playback_rate,
            is_loading: true,
            ..WaveformState::new(&self.config)
        };
        self.phase = LoadPhase::Loading { with_peaks };
        self.source = Some(source.clone());

        LoadTicket::new(
            generation,
            source,
            self.generation.clone(),
            self.mounted.clone(),
        )
    }

    /// Create the engine for a load started with [`Self::begin_load`].
    ///
    /// Returns `false` when the ticket is stale or the controller is gone.
    pub fn finish_load(&mut self, ticket: LoadTicket, peaks: Option<PeakData>) -> bool {
        if !ticket.is_current() {
            tracing::debug!("Dropping stale load of {}", ticket.source.url);
            return false;
        }

        let duration = peaks.as_ref().and_then(|p| p.duration);
        let config = EngineConfig {
            url: ticket.source.url.clone(),
            height: self.config.engine.height,
            min_px_per_sec: self.config.engine.min_px_per_sec,
            peaks,
            duration,
        };

        match self.factory.create(config) {
            Ok(mut engine) => {
                self.subscriptions.subscribe_all(engine.as_mut(), &CONTROLLER_EVENTS);
                engine.set_playback_rate(self.state.playback_rate);
                self.engine = Some(engine);
                self.phase = LoadPhase::Initializing;
            }
            Err(e) => {
                tracing::error!("Failed to create waveform engine: {}", e);
                self.fail(e.to_string());
            }
        }
        true
    }

    fn fail(&mut self, message: String) {
        self.state.error = Some(message);
        self.state.is_loading = false;
        self.state.is_ready = false;
        self.phase = LoadPhase::Error;
    }

    // =========================================================================
    // Engine events
    // =========================================================================

    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        if !self.mounted.is_mounted() || self.engine.is_none() {
            return;
        }

        if let Some(editor) = self.editor.as_mut() {
            editor.handle_event(&event);
        }

        if !self.subscriptions.listens_to(event.kind()) {
            return;
        }

        match event {
            EngineEvent::Ready { duration } => self.on_ready(duration, Instant::now()),
            EngineEvent::Error { message } => {
                tracing::error!("Waveform error: {}", message);
                self.fail(message);
            }
            EngineEvent::TimeUpdate { time } => {
                self.state.current_time = time;
                self.host.on_current_time_update(time);
            }
            EngineEvent::Play => self.set_playing(true),
            EngineEvent::Pause | EngineEvent::Finish => self.set_playing(false),
            EngineEvent::Zoom { px_per_sec } => {
                // Engine-initiated zoom; record it without echoing it back
                if px_per_sec.is_finite() && px_per_sec > 0.0 {
                    self.state.zoom_px_per_sec = px_per_sec;
                }
            }
            EngineEvent::Redraw | EngineEvent::Scroll => {}
        }
    }

    fn on_ready(&mut self, duration: f64, now: Instant) {
        let Some(engine) = self.engine.as_deref_mut() else {
            return;
        };

        tracing::info!("Waveform ready, duration {:.1}s", duration);

        self.state.duration = duration;
        self.state.is_ready = true;
        self.state.is_loading = false;
        self.state.error = None;
        self.phase = LoadPhase::Ready;

        if let Some(mut old) = self.editor.take() {
            old.destroy(engine);
        }

        let host = self.host.clone();
        let guard = self.mounted.clone();
        let mut editor = RegionEditor::new(
            RegionConstraints::from_config(&self.config, duration),
            Some(Box::new(move |region: Region| {
                if guard.is_mounted() {
                    host.on_trim_change(region.start, region.end);
                }
            })),
        );

        let desired = self
            .active_clip
            .unwrap_or_else(|| default_range(&self.config, duration));
        let region = editor.create_region(engine, desired.start, desired.end);
        self.editor = Some(editor);

        if region.is_none() {
            tracing::info!("Track too short to trim");
        }

        self.apply_initial_fit();
        self.settle_refit = Some(DelayedTask::schedule(
            now,
            self.config.zoom.settle_delay(),
            (),
        ));

        if let (true, Some(region)) = (self.auto_play, region) {
            if let Some(engine) = self.engine.as_deref_mut() {
                engine.play(region.start, Some(region.end));
            }
            self.set_playing(true);
        }
    }

    /// Advance delayed work
    pub fn tick(&mut self, now: Instant) {
        if !self.mounted.is_mounted() {
            return;
        }
        if let (Some(editor), Some(engine)) = (self.editor.as_mut(), self.engine.as_deref_mut()) {
            editor.tick(engine, now);
        }
        if take_due(&mut self.settle_refit, now).is_some() {
            tracing::debug!("Re-applying initial fit after layout settle");
            self.apply_initial_fit();
        }
    }

    // =========================================================================
    // Region
    // =========================================================================

    /// Replace the desired range; applied immediately when ready
    pub fn set_active_clip(&mut self, range: Option<Region>) {
        self.active_clip = range;
        if self.phase != LoadPhase::Ready {
            return;
        }
        let desired = range.unwrap_or_else(|| default_range(&self.config, self.state.duration));
        self.set_region(desired.start, desired.end);
    }

    pub fn set_region(&mut self, start: f64, end: f64) -> Option<Region> {
        let (Some(editor), Some(engine)) = (self.editor.as_mut(), self.engine.as_deref_mut())
        else {
            return None;
        };
        editor.set_region(engine, start, end)
    }

    /// Move the start edge to the playhead, pushing the end out if needed
    pub fn set_start(&mut self) -> Option<Region> {
        let region = self.region()?;
        let time = self.state.current_time;
        let min = self.config.min_duration;
        let end = if region.end - time < min {
            time + min
        } else {
            region.end
        };
        self.set_region(time, end)
    }

    /// Move the end edge to the playhead, pulling the start back if needed
    pub fn set_end(&mut self) -> Option<Region> {
        let region = self.region()?;
        let time = self.state.current_time;
        let min = self.config.min_duration;
        let start = if time - region.start < min {
            time - min
        } else {
            region.start
        };
        self.set_region(start, time)
    }

    // =========================================================================
    // Pointer input
    // =========================================================================

    /// Start a drag on whatever handle lies under `client_x`.
    ///
    /// Returns the grabbed handle, or `None` when nothing is draggable there.
    pub fn pointer_down(&mut self, client_x: f64, rect: ContainerRect) -> Option<DragHandle> {
        if !self.mounted.is_mounted() {
            return None;
        }
        let (Some(editor), Some(engine)) = (self.editor.as_mut(), self.engine.as_deref_mut())
        else {
            return None;
        };
        let handle = editor.hit_test(client_x, rect)?;
        editor
            .pointer_down(engine, handle, client_x, rect)
            .then_some(handle)
    }

    /// Document-level pointer move during a drag
    pub fn pointer_move(&mut self, client_x: f64) -> Option<Region> {
        if !self.mounted.is_mounted() {
            return None;
        }
        self.editor.as_mut()?.pointer_move(client_x)
    }

    /// Document-level pointer release ending a drag
    pub fn pointer_up(&mut self, now: Instant) {
        if !self.mounted.is_mounted() {
            return;
        }
        if let (Some(editor), Some(engine)) = (self.editor.as_mut(), self.engine.as_deref_mut()) {
            editor.pointer_up(engine, now);
        }
    }

    /// Whether the host should route document-level move/up events here
    pub fn has_document_listeners(&self) -> bool {
        self.editor
            .as_ref()
            .is_some_and(RegionEditor::has_document_listeners)
    }

    // =========================================================================
    // Zoom
    // =========================================================================

    pub fn zoom_in(&mut self) {
        let zoom = &self.config.zoom;
        let px = clamp(
            self.state.zoom_px_per_sec * zoom.step,
            zoom.min_px_per_sec,
            zoom.max_px_per_sec,
        );
        self.apply_zoom(px);
    }

    pub fn zoom_out(&mut self) {
        let zoom = &self.config.zoom;
        let px = clamp(
            self.state.zoom_px_per_sec / zoom.step,
            zoom.min_px_per_sec,
            zoom.max_px_per_sec,
        );
        self.apply_zoom(px);
    }

    /// Fit the whole track into the container
    pub fn fit_to_window(&mut self) {
        let duration = self.state.duration;
        let width = self.container_width();
        if duration > 0.0 && width > 0.0 {
            self.apply_zoom(width / duration);
        }
    }

    /// Fit the region into the container and scroll to its start
    pub fn fit_to_clip(&mut self) {
        let Some(region) = self.region() else {
            return;
        };
        let width = self.container_width();
        if width <= 0.0 {
            return;
        }
        let px = (width / region.span()).max(self.config.zoom.fit_clip_min_px_per_sec);
        self.apply_zoom(px);
        if let Some(engine) = self.engine.as_deref_mut() {
            engine.set_scroll_time(region.start);
        }
    }

    fn apply_initial_fit(&mut self) {
        let duration = self.state.duration;
        let width = self.container_width() - self.config.zoom.fit_padding;
        if duration > 0.0 && width > 0.0 {
            self.apply_zoom(width / duration);
        }
    }

    fn apply_zoom(&mut self, px_per_sec: f64) {
        if !px_per_sec.is_finite() || px_per_sec <= 0.0 {
            return;
        }
        tracing::debug!("Zoom {:.2} px/s", px_per_sec);
        self.state.zoom_px_per_sec = px_per_sec;
        if let Some(engine) = self.engine.as_deref_mut() {
            engine.zoom(px_per_sec);
        }
    }

    // =========================================================================
    // Playback
    // =========================================================================

    /// Toggle playback over the region
    pub fn play_pause(&mut self) {
        if self.state.is_playing {
            self.pause();
            return;
        }
        let Some(region) = self.region() else {
            return;
        };
        let start = if region.contains(self.state.current_time) {
            self.state.current_time
        } else {
            region.start
        };
        if let Some(engine) = self.engine.as_deref_mut() {
            engine.play(start, Some(region.end));
            self.set_playing(true);
        }
    }

    pub fn pause(&mut self) {
        if let Some(engine) = self.engine.as_deref_mut() {
            engine.pause();
        }
        self.set_playing(false);
    }

    /// Seek the playhead to the region start without playing
    pub fn go_to_start(&mut self) {
        let Some(region) = self.region() else {
            return;
        };
        if let Some(engine) = self.engine.as_deref_mut() {
            engine.set_time(region.start);
            self.state.current_time = region.start;
        }
    }

    /// Seek and play from `time` to the end of the track
    pub fn seek_and_play(&mut self, time: f64) {
        if !self.state.is_ready {
            return;
        }
        let time = clamp(time, 0.0, self.state.duration);
        if let Some(engine) = self.engine.as_deref_mut() {
            engine.set_time(time);
            engine.play(time, None);
            self.state.current_time = time;
            self.set_playing(true);
        }
    }

    pub fn set_playback_rate(&mut self, rate: f64) {
        if !rate.is_finite() {
            return;
        }
        let rate = clamp(rate, MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE);
        self.state.playback_rate = rate;
        if let Some(engine) = self.engine.as_deref_mut() {
            engine.set_playback_rate(rate);
        }
    }

    fn set_playing(&mut self, is_playing: bool) {
        if self.state.is_playing != is_playing {
            self.state.is_playing = is_playing;
            self.host.on_play_state_change(is_playing);
        }
    }

    // =========================================================================
    // Create-clip modal
    // =========================================================================

    /// Open the modal, pausing playback and remembering whether it ran
    pub fn open_create_clip(&mut self) {
        if self.modal.is_some() {
            return;
        }
        let resume_on_cancel = self.state.is_playing;
        if resume_on_cancel {
            self.pause();
        }
        self.modal = Some(ModalSession { resume_on_cancel });
        tracing::debug!("Create-clip modal opened (was playing: {})", resume_on_cancel);
    }

    /// Close the modal, resuming playback if it was running at open time
    pub fn cancel_create_clip(&mut self) {
        let Some(modal) = self.modal.take() else {
            return;
        };
        if !modal.resume_on_cancel {
            return;
        }
        let Some(region) = self.region() else {
            return;
        };
        let start = if region.contains(self.state.current_time) {
            self.state.current_time
        } else {
            region.start
        };
        if let Some(engine) = self.engine.as_deref_mut() {
            engine.play(start, Some(region.end));
            self.set_playing(true);
        }
    }

    /// Assemble the clip for the current region and hand it to the host.
    ///
    /// Playback stays paused afterwards. On failure the modal stays open and
    /// nothing reaches the host.
    pub async fn submit_clip(
        &mut self,
        builder: &ClipPayloadBuilder,
        draft: &ClipDraft,
        uploaded_intro_url: Option<&str>,
        uploader: &dyn IntroUploader,
    ) -> TrimmerResult<ClipPayload> {
        let region = self.region().ok_or(TrimmerError::NotReady)?;
        if self.state.is_playing {
            self.pause();
        }

        let guard = self.mounted.clone();
        let payload = builder
            .build(region, draft, uploaded_intro_url, uploader)
            .await?;

        if !guard.is_mounted() {
            tracing::debug!("Controller torn down during clip submission");
            return Err(TrimmerError::Unmounted);
        }

        tracing::info!(
            "Clip submitted: {:?} {:.1}s - {:.1}s",
            payload.kind(),
            region.start,
            region.end
        );
        self.host.add_new_clip_info(&payload);
        self.modal = None;

        Ok(payload)
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Release the engine, editor and pending work. Safe to repeat.
    pub fn destroy(&mut self) {
        if self.mounted.is_mounted() {
            tracing::info!("Destroying waveform controller");
        }
        self.mounted.unmount();
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.teardown_engine();
        self.phase = LoadPhase::Idle;
    }

    fn teardown_engine(&mut self) {
        self.settle_refit = None;
        self.modal = None;

        match self.engine.take() {
            Some(mut engine) => {
                if let Some(mut editor) = self.editor.take() {
                    editor.destroy(engine.as_mut());
                }
                self.subscriptions.release_all(engine.as_mut());
                engine.destroy();
            }
            None => {
                self.editor = None;
                self.subscriptions.forget();
            }
        }
    }
}

impl Drop for WaveformController {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Fetch the ticket's peaks, falling back to `None` on any failure
pub async fn fetch_peaks(ticket: &LoadTicket, fetcher: Arc<dyn PeaksFetcher>) -> Option<PeakData> {
    let url = ticket.source().peaks_url.as_deref()?;
    match fetcher.fetch(url).await {
        Ok(peaks) => {
            tracing::debug!("Loaded {} peak channel(s) from {}", peaks.channel_count(), url);
            Some(peaks)
        }
        Err(e) => {
            tracing::warn!("Peaks unavailable ({}), falling back to full audio", e);
            None
        }
    }
}

/// Range selected when the host supplies none
fn default_range(config: &TrimmerConfig, duration: f64) -> Region {
    let length = config.default_clip_length.max(config.min_duration);
    Region {
        start: 0.0,
        end: duration.min(length),
    }
}
