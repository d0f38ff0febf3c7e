//! Region editor
//!
//! Owns the single editable region, its overlay placement, the pointer drag
//! state machine and the engine subscriptions that keep the overlay in sync
//! with redraws.
//!
//! Every method that touches the engine takes it as an argument; the editor
//! never stores a handle to it. The host routes pointer input here and engine
//! notifications through [`RegionEditor::handle_event`].

use super::types::{
    DragHandle, DragSession, DragState, OverlayPosition, Region, RegionConstraints, SPAN_EPSILON,
};
use crate::utils::time::{clamp, snap};
use crate::utils::timer::{take_due, DelayedTask};
use crate::waveform::engine::{EngineEvent, EngineEventKind, WaveformEngine};
use crate::waveform::geometry::{pixel_to_time, time_to_pixel, ContainerRect};
use crate::waveform::subscriptions::Subscriptions;
use std::time::Instant;

/// Invoked synchronously with the latest region after every commit
pub type RegionCallback = Box<dyn FnMut(Region) + Send>;

/// Engine notifications that move the overlay
const OVERLAY_EVENTS: [EngineEventKind; 3] = [
    EngineEventKind::Redraw,
    EngineEventKind::Zoom,
    EngineEventKind::Scroll,
];

pub struct RegionEditor {
    constraints: RegionConstraints,
    region: Option<Region>,
    overlay: Option<OverlayPosition>,
    drag: Option<DragSession>,
    /// Re-enables engine interaction once a drag has settled
    interaction_restore: Option<DelayedTask<()>>,
    subscriptions: Subscriptions,
    on_region_update: Option<RegionCallback>,
    overlay_renders: u64,
    destroyed: bool,
}

impl RegionEditor {
    pub fn new(constraints: RegionConstraints, on_region_update: Option<RegionCallback>) -> Self {
        Self {
            constraints,
            region: None,
            overlay: None,
            drag: None,
            interaction_restore: None,
            subscriptions: Subscriptions::new(),
            on_region_update,
            overlay_renders: 0,
            destroyed: false,
        }
    }

    pub fn constraints(&self) -> &RegionConstraints {
        &self.constraints
    }

    pub fn region(&self) -> Option<Region> {
        self.region
    }

    pub fn overlay(&self) -> Option<OverlayPosition> {
        self.overlay
    }

    /// How many times the overlay has been placed
    pub fn overlay_renders(&self) -> u64 {
        self.overlay_renders
    }

    pub fn drag_state(&self) -> DragState {
        match &self.drag {
            Some(session) => DragState::Dragging(session.handle),
            None => DragState::Idle,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Whether the host should route document-level move/up events here
    pub fn has_document_listeners(&self) -> bool {
        self.drag.is_some()
    }

    pub fn has_pending_restore(&self) -> bool {
        self.interaction_restore.is_some()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Create (or wholesale replace) the region.
    ///
    /// Returns `None` when the track is shorter than the minimum span.
    pub fn create_region(
        &mut self,
        engine: &mut dyn WaveformEngine,
        start: f64,
        end: f64,
    ) -> Option<Region> {
        if self.destroyed {
            tracing::warn!("Ignoring region request on a destroyed editor");
            return None;
        }

        if self.region.is_some() {
            self.teardown(engine);
        }

        let Some(region) = self.constraints.clamp_range(start, end) else {
            tracing::info!(
                "No feasible region: duration {:.1}s is shorter than {:.1}s",
                self.constraints.duration,
                self.constraints.min_duration
            );
            return None;
        };

        self.subscriptions.subscribe_all(engine, &OVERLAY_EVENTS);
        tracing::debug!("Region created: {:.1}s - {:.1}s", region.start, region.end);
        self.commit(region);

        Some(region)
    }

    /// Programmatic range change; same semantics as [`Self::create_region`]
    pub fn set_region(
        &mut self,
        engine: &mut dyn WaveformEngine,
        start: f64,
        end: f64,
    ) -> Option<Region> {
        self.create_region(engine, start, end)
    }

    /// Remove the region and release everything it holds. Safe to repeat.
    pub fn remove_region(&mut self, engine: &mut dyn WaveformEngine) {
        self.teardown(engine);
    }

    /// Release all resources and refuse further regions. Safe to repeat.
    pub fn destroy(&mut self, engine: &mut dyn WaveformEngine) {
        if self.destroyed {
            return;
        }
        self.teardown(engine);
        self.on_region_update = None;
        self.destroyed = true;
        tracing::debug!("Region editor destroyed");
    }

    fn teardown(&mut self, engine: &mut dyn WaveformEngine) {
        let was_dragging = self.drag.take().is_some();
        let had_restore = self.interaction_restore.take().is_some();
        if was_dragging || had_restore {
            engine.toggle_interaction(true);
        }

        let released = self.subscriptions.release_all(engine);
        if released > 0 || self.region.is_some() {
            tracing::debug!("Region removed, released {} subscriptions", released);
        }

        self.region = None;
        self.overlay = None;
    }

    /// React to an engine notification. Returns whether the overlay moved.
    pub fn handle_event(&mut self, event: &EngineEvent) -> bool {
        let kind = event.kind();
        if !self.subscriptions.listens_to(kind) {
            return false;
        }
        match kind {
            EngineEventKind::Redraw | EngineEventKind::Zoom | EngineEventKind::Scroll => {
                self.render_overlay();
                true
            }
            _ => false,
        }
    }

    /// Resolve a pointer position to the handle or body under it
    pub fn hit_test(&self, client_x: f64, rect: ContainerRect) -> Option<DragHandle> {
        let region = self.region?;
        let duration = self.constraints.duration;
        let width = self.constraints.handle_width_px;

        let start_px = time_to_pixel(region.start, rect, duration);
        let end_px = time_to_pixel(region.end, rect, duration);
        let to_start = (client_x - start_px).abs();
        let to_end = (client_x - end_px).abs();

        if to_start <= width || to_end <= width {
            return Some(if to_start <= to_end {
                DragHandle::Start
            } else {
                DragHandle::End
            });
        }

        if client_x > start_px && client_x < end_px && !self.constraints.read_only {
            return Some(DragHandle::Region);
        }

        None
    }

    /// Begin a drag. Returns `false` when nothing can be dragged.
    pub fn pointer_down(
        &mut self,
        engine: &mut dyn WaveformEngine,
        handle: DragHandle,
        client_x: f64,
        rect: ContainerRect,
    ) -> bool {
        let Some(region) = self.region else {
            return false;
        };
        if self.drag.is_some() {
            return false;
        }
        if handle == DragHandle::Region && self.constraints.read_only {
            return false;
        }

        // A new gesture supersedes a pending restore; interaction stays off.
        self.interaction_restore = None;
        engine.toggle_interaction(false);

        self.drag = Some(DragSession {
            handle,
            origin_start: region.start,
            origin_end: region.end,
            origin_x: client_x,
            anchor: pixel_to_time(client_x, rect, self.constraints.duration),
            rect,
        });

        tracing::debug!("Drag started on {:?} at x={:.1}", handle, client_x);
        true
    }

    /// Apply a pointer move. Returns the region when it changed.
    pub fn pointer_move(&mut self, client_x: f64) -> Option<Region> {
        let session = self.drag.as_mut()?;
        let region = self.region?;
        let duration = self.constraints.duration;
        let min = self.constraints.min_duration;

        let delta = pixel_to_time(client_x, session.rect, duration) - session.anchor;

        let next = match session.handle {
            DragHandle::Start => {
                let start = clamp(snap(session.origin_start + delta), 0.0, region.end - min);
                if region.end - start < min - SPAN_EPSILON {
                    return None;
                }
                Region { start, end: region.end }
            }
            DragHandle::End => {
                let end = clamp(snap(session.origin_end + delta), region.start + min, duration);
                if end - region.start < min - SPAN_EPSILON {
                    return None;
                }
                Region { start: region.start, end }
            }
            DragHandle::Region => {
                let span = region.span();
                let start = clamp(region.start + delta, 0.0, duration - span);
                session.origin_x = client_x;
                session.anchor = pixel_to_time(client_x, session.rect, duration);
                Region {
                    start,
                    end: (start + span).min(duration),
                }
            }
        };

        if next == region {
            return None;
        }

        self.commit(next);
        Some(next)
    }

    /// End the drag, keep engine interaction off for the debounce window and
    /// deliver a final update.
    pub fn pointer_up(&mut self, engine: &mut dyn WaveformEngine, now: Instant) {
        let Some(session) = self.drag.take() else {
            return;
        };

        engine.toggle_interaction(false);
        self.interaction_restore = Some(DelayedTask::schedule(
            now,
            self.constraints.interaction_restore,
            (),
        ));

        tracing::debug!("Drag on {:?} finished", session.handle);

        if let Some(region) = self.region {
            self.notify(region);
        }
    }

    /// Run due delayed work
    pub fn tick(&mut self, engine: &mut dyn WaveformEngine, now: Instant) {
        if take_due(&mut self.interaction_restore, now).is_some() {
            engine.toggle_interaction(true);
        }
    }

    fn commit(&mut self, region: Region) {
        self.region = Some(region);
        self.render_overlay();
        self.notify(region);
    }

    fn render_overlay(&mut self) {
        if let Some(region) = self.region {
            self.overlay = Some(OverlayPosition::for_region(region, self.constraints.duration));
            self.overlay_renders += 1;
        }
    }

    fn notify(&mut self, region: Region) {
        if let Some(callback) = self.on_region_update.as_mut() {
            callback(region);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrimmerConfig;
    use crate::waveform::testing::{EngineCall, ScriptedEngine};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    const RECT: ContainerRect = ContainerRect {
        left: 0.0,
        width: 1200.0,
    };

    fn editor(duration: f64) -> (RegionEditor, Arc<Mutex<Vec<Region>>>) {
        let updates = Arc::new(Mutex::new(Vec::new()));
        let sink = updates.clone();
        let constraints = RegionConstraints::from_config(&TrimmerConfig::default(), duration);
        let editor = RegionEditor::new(
            constraints,
            Some(Box::new(move |region| sink.lock().push(region))),
        );
        (editor, updates)
    }

    /// Client x for a time on the 1200px / 120s test container (10px per second)
    fn x(time: f64) -> f64 {
        time * 10.0
    }

    #[test]
    fn test_create_region_scenarios() {
        let (mut engine, _) = ScriptedEngine::new(120.0, 1200.0);
        let (mut ed, updates) = editor(120.0);

        let region = ed.create_region(&mut engine, 0.0, 10.0).unwrap();
        assert_eq!(region, Region { start: 0.0, end: 20.0 });
        assert_eq!(updates.lock().last(), Some(&region));

        let (mut short, _) = editor(15.0);
        assert_eq!(short.create_region(&mut engine, 0.0, 15.0), None);
        assert_eq!(short.region(), None);
        assert_eq!(short.subscription_count(), 0);
    }

    #[test]
    fn test_replace_releases_previous_subscriptions() {
        let (mut engine, log) = ScriptedEngine::new(120.0, 1200.0);
        let (mut ed, _) = editor(120.0);

        ed.create_region(&mut engine, 10.0, 40.0);
        assert_eq!(log.lock().active_subscriptions(), 3);

        ed.set_region(&mut engine, 50.0, 90.0);
        assert_eq!(log.lock().active_subscriptions(), 3);
        assert_eq!(ed.region(), Some(Region { start: 50.0, end: 90.0 }));
    }

    #[test]
    fn test_remove_and_destroy_are_idempotent() {
        let (mut engine, log) = ScriptedEngine::new(120.0, 1200.0);
        let (mut ed, _) = editor(120.0);

        ed.create_region(&mut engine, 10.0, 40.0);
        ed.remove_region(&mut engine);
        ed.remove_region(&mut engine);
        assert_eq!(ed.region(), None);
        assert_eq!(ed.overlay(), None);
        assert_eq!(log.lock().active_subscriptions(), 0);

        ed.create_region(&mut engine, 10.0, 40.0);
        ed.destroy(&mut engine);
        ed.destroy(&mut engine);
        assert_eq!(log.lock().active_subscriptions(), 0);
        assert_eq!(ed.create_region(&mut engine, 10.0, 40.0), None);
    }

    #[test]
    fn test_start_handle_stops_at_minimum_span() {
        let (mut engine, _) = ScriptedEngine::new(120.0, 1200.0);
        let (mut ed, _) = editor(120.0);
        ed.create_region(&mut engine, 30.0, 60.0);

        assert!(ed.pointer_down(&mut engine, DragHandle::Start, x(30.0), RECT));
        assert_eq!(ed.drag_state(), DragState::Dragging(DragHandle::Start));

        let region = ed.pointer_move(x(70.0)).unwrap();
        assert_eq!(region, Region { start: 40.0, end: 60.0 });

        // Further movement keeps it pinned
        assert_eq!(ed.pointer_move(x(100.0)), None);
        assert_eq!(ed.region().unwrap().start, 40.0);
    }

    #[test]
    fn test_end_handle_stops_at_minimum_span() {
        let (mut engine, _) = ScriptedEngine::new(120.0, 1200.0);
        let (mut ed, _) = editor(120.0);
        ed.create_region(&mut engine, 30.0, 60.0);

        ed.pointer_down(&mut engine, DragHandle::End, x(60.0), RECT);
        let region = ed.pointer_move(x(0.0)).unwrap();
        assert_eq!(region, Region { start: 30.0, end: 50.0 });

        let region = ed.pointer_move(x(200.0)).unwrap();
        assert_eq!(region.end, 120.0);
    }

    #[test]
    fn test_handle_drag_snaps_to_tenths() {
        let (mut engine, _) = ScriptedEngine::new(120.0, 1200.0);
        let (mut ed, _) = editor(120.0);
        ed.create_region(&mut engine, 30.0, 60.0);

        ed.pointer_down(&mut engine, DragHandle::Start, 300.0, RECT);
        let region = ed.pointer_move(312.34).unwrap();
        assert_eq!(region.start, 31.2);
    }

    #[test]
    fn test_body_drag_preserves_span() {
        let (mut engine, _) = ScriptedEngine::new(120.0, 1200.0);
        let (mut ed, updates) = editor(120.0);
        ed.create_region(&mut engine, 30.3, 61.7);
        let span = ed.region().unwrap().span();

        assert!(ed.pointer_down(&mut engine, DragHandle::Region, x(40.0), RECT));
        for target in [45.0, 13.7, 0.0, -50.0, 80.0, 400.0, 77.77] {
            ed.pointer_move(x(target));
            let region = ed.region().unwrap();
            assert!((region.span() - span).abs() < 1e-9);
            assert!(region.start >= 0.0);
            assert!(region.end <= 120.0 + 1e-9);
        }

        // Incremental: each tick moves by the pointer delta since the last tick
        let before = ed.region().unwrap();
        ed.pointer_move(x(77.77) - 10.0);
        let after = ed.region().unwrap();
        assert!((before.start - after.start - 1.0).abs() < 1e-9);

        let last = *updates.lock().last().unwrap();
        assert_eq!(last, after);
    }

    #[test]
    fn test_body_drag_to_track_end_stays_in_bounds() {
        let (mut engine, _) = ScriptedEngine::new(120.0, 1200.0);
        let (mut ed, _) = editor(120.0);
        ed.create_region(&mut engine, 30.3, 61.7);
        let span = ed.region().unwrap().span();

        ed.pointer_down(&mut engine, DragHandle::Region, x(45.0), RECT);
        for step in 1..=40 {
            ed.pointer_move(x(45.0) + step as f64 * 37.3);
            let region = ed.region().unwrap();
            assert!(region.start >= 0.0);
            assert!(region.end <= 120.0);
        }

        let region = ed.region().unwrap();
        assert!((region.end - 120.0).abs() < 1e-9);
        assert!((region.span() - span).abs() < 1e-9);
    }

    #[test]
    fn test_read_only_blocks_body_drag() {
        let (mut engine, _) = ScriptedEngine::new(120.0, 1200.0);
        let constraints = RegionConstraints {
            read_only: true,
            ..RegionConstraints::from_config(&TrimmerConfig::default(), 120.0)
        };
        let mut ed = RegionEditor::new(constraints, None);
        ed.create_region(&mut engine, 30.0, 60.0);

        assert_eq!(ed.hit_test(x(45.0), RECT), None);
        assert!(!ed.pointer_down(&mut engine, DragHandle::Region, x(45.0), RECT));
        assert!(ed.pointer_down(&mut engine, DragHandle::End, x(60.0), RECT));
    }

    #[test]
    fn test_hit_test() {
        let (mut engine, _) = ScriptedEngine::new(120.0, 1200.0);
        let (mut ed, _) = editor(120.0);
        assert_eq!(ed.hit_test(x(45.0), RECT), None);

        ed.create_region(&mut engine, 30.0, 60.0);
        assert_eq!(ed.hit_test(x(30.0) + 3.0, RECT), Some(DragHandle::Start));
        assert_eq!(ed.hit_test(x(60.0) - 5.0, RECT), Some(DragHandle::End));
        assert_eq!(ed.hit_test(x(45.0), RECT), Some(DragHandle::Region));
        assert_eq!(ed.hit_test(x(90.0), RECT), None);
    }

    #[test]
    fn test_pointer_up_debounces_interaction() {
        let (mut engine, log) = ScriptedEngine::new(120.0, 1200.0);
        let (mut ed, updates) = editor(120.0);
        ed.create_region(&mut engine, 30.0, 60.0);

        ed.pointer_down(&mut engine, DragHandle::End, x(60.0), RECT);
        ed.pointer_move(x(70.0));
        let count = updates.lock().len();

        let now = Instant::now();
        ed.pointer_up(&mut engine, now);
        assert_eq!(ed.drag_state(), DragState::Idle);
        assert!(!ed.has_document_listeners());
        assert_eq!(updates.lock().len(), count + 1);
        assert_eq!(log.lock().interaction_enabled(), Some(false));

        ed.tick(&mut engine, now + Duration::from_millis(20));
        assert_eq!(log.lock().interaction_enabled(), Some(false));

        ed.tick(&mut engine, now + Duration::from_millis(50));
        assert_eq!(log.lock().interaction_enabled(), Some(true));
        assert!(!ed.has_pending_restore());
    }

    #[test]
    fn test_destroy_mid_drag_releases_everything() {
        let (mut engine, log) = ScriptedEngine::new(120.0, 1200.0);
        let (mut ed, _) = editor(120.0);
        ed.create_region(&mut engine, 30.0, 60.0);

        ed.pointer_down(&mut engine, DragHandle::Region, x(45.0), RECT);
        assert!(ed.has_document_listeners());

        ed.destroy(&mut engine);
        assert!(!ed.has_document_listeners());
        assert!(!ed.has_pending_restore());
        assert_eq!(log.lock().active_subscriptions(), 0);
        assert_eq!(log.lock().interaction_enabled(), Some(true));
        assert_eq!(ed.pointer_move(x(50.0)), None);
    }

    #[test]
    fn test_remove_during_restore_window_reenables() {
        let (mut engine, log) = ScriptedEngine::new(120.0, 1200.0);
        let (mut ed, _) = editor(120.0);
        ed.create_region(&mut engine, 30.0, 60.0);

        ed.pointer_down(&mut engine, DragHandle::Start, x(30.0), RECT);
        ed.pointer_up(&mut engine, Instant::now());
        assert!(ed.has_pending_restore());

        ed.remove_region(&mut engine);
        assert!(!ed.has_pending_restore());
        assert_eq!(log.lock().interaction_enabled(), Some(true));
    }

    #[test]
    fn test_overlay_follows_redraw_events() {
        let (mut engine, _) = ScriptedEngine::new(120.0, 1200.0);
        let (mut ed, _) = editor(120.0);
        ed.create_region(&mut engine, 30.0, 90.0);
        let renders = ed.overlay_renders();

        for _ in 0..5 {
            assert!(ed.handle_event(&EngineEvent::Zoom { px_per_sec: 80.0 }));
            assert!(ed.handle_event(&EngineEvent::Scroll));
            assert!(ed.handle_event(&EngineEvent::Redraw));
        }
        assert!(!ed.handle_event(&EngineEvent::Play));

        assert_eq!(ed.overlay_renders(), renders + 15);
        let overlay = ed.overlay().unwrap();
        assert_eq!(overlay.left_percent, 25.0);
        assert_eq!(overlay.right_percent, 25.0);

        ed.remove_region(&mut engine);
        assert!(!ed.handle_event(&EngineEvent::Redraw));
    }

    #[test]
    fn test_only_one_drag_session() {
        let (mut engine, log) = ScriptedEngine::new(120.0, 1200.0);
        let (mut ed, _) = editor(120.0);
        ed.create_region(&mut engine, 30.0, 60.0);

        assert!(ed.pointer_down(&mut engine, DragHandle::Start, x(30.0), RECT));
        assert!(!ed.pointer_down(&mut engine, DragHandle::End, x(60.0), RECT));
        assert_eq!(ed.drag_state(), DragState::Dragging(DragHandle::Start));
        assert_eq!(log.lock().count(&EngineCall::Interaction(false)), 1);
    }
}
