//! Owned collection of engine subscriptions
//!
//! Every `on(kind)` registration made by a component goes through one
//! `Subscriptions` value so that teardown can release all of them at once.

use super::engine::{EngineEventKind, SubscriptionId, WaveformEngine};

#[derive(Debug, Default)]
pub struct Subscriptions {
    entries: Vec<(EngineEventKind, SubscriptionId)>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to each kind in `kinds`
    pub fn subscribe_all(&mut self, engine: &mut dyn WaveformEngine, kinds: &[EngineEventKind]) {
        for &kind in kinds {
            let id = engine.on(kind);
            self.entries.push((kind, id));
        }
    }

    /// Whether any live registration covers `kind`
    pub fn listens_to(&self, kind: EngineEventKind) -> bool {
        self.entries.iter().any(|(k, _)| *k == kind)
    }

    /// Unsubscribe everything. Returns how many registrations were released.
    pub fn release_all(&mut self, engine: &mut dyn WaveformEngine) -> usize {
        let released = self.entries.len();
        for (_, id) in self.entries.drain(..) {
            engine.unsubscribe(id);
        }
        released
    }

    /// Forget registrations whose engine is already gone
    pub fn forget(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::testing::ScriptedEngine;

    #[test]
    fn test_release_all_is_idempotent() {
        let (mut engine, log) = ScriptedEngine::new(120.0, 1000.0);
        let mut subs = Subscriptions::new();

        subs.subscribe_all(
            &mut engine,
            &[EngineEventKind::Redraw, EngineEventKind::Zoom, EngineEventKind::Scroll],
        );
        assert_eq!(subs.len(), 3);
        assert!(subs.listens_to(EngineEventKind::Zoom));
        assert!(!subs.listens_to(EngineEventKind::Ready));
        assert_eq!(log.lock().active_subscriptions(), 3);

        assert_eq!(subs.release_all(&mut engine), 3);
        assert_eq!(subs.release_all(&mut engine), 0);
        assert!(subs.is_empty());
        assert_eq!(log.lock().active_subscriptions(), 0);
    }
}
