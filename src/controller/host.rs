//! Callbacks into the host UI

use crate::clip::ClipPayload;
use tokio::sync::broadcast;

/// Notifications the controller delivers to its host
pub trait TrimmerHost: Send + Sync {
    /// The committed trim range changed
    fn on_trim_change(&self, start: f64, end: f64);

    fn on_current_time_update(&self, time: f64);

    fn on_play_state_change(&self, is_playing: bool);

    /// A clip payload was assembled and is ready to submit
    fn add_new_clip_info(&self, payload: &ClipPayload);
}

/// Host notifications as values
#[derive(Debug, Clone)]
pub enum HostEvent {
    TrimChanged { start: f64, end: f64 },
    CurrentTime(f64),
    PlayState(bool),
    ClipCreated(ClipPayload),
}

/// Forwards host notifications to broadcast subscribers
pub struct BroadcastHost {
    event_tx: broadcast::Sender<HostEvent>,
}

impl BroadcastHost {
    pub fn new(capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity);
        Self { event_tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.event_tx.subscribe()
    }

    fn emit(&self, event: HostEvent) {
        // No receivers is fine
        let _ = self.event_tx.send(event);
    }
}

impl Default for BroadcastHost {
    fn default() -> Self {
        Self::new(256)
    }
}

impl TrimmerHost for BroadcastHost {
    fn on_trim_change(&self, start: f64, end: f64) {
        self.emit(HostEvent::TrimChanged { start, end });
    }

    fn on_current_time_update(&self, time: f64) {
        self.emit(HostEvent::CurrentTime(time));
    }

    fn on_play_state_change(&self, is_playing: bool) {
        self.emit(HostEvent::PlayState(is_playing));
    }

    fn add_new_clip_info(&self, payload: &ClipPayload) {
        self.emit(HostEvent::ClipCreated(payload.clone()));
    }
}
