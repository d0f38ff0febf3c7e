//! Scripted engine used by unit tests
//!
//! Records every call in a shared log so tests can assert on engine effects
//! after the engine itself has been moved into a controller.

use super::engine::{
    EngineConfig, EngineError, EngineEventKind, EngineFactory, SubscriptionId, WaveformEngine,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Play(f64, Option<f64>),
    Pause,
    SetTime(f64),
    Zoom(f64),
    ScrollTime(f64),
    PlaybackRate(f64),
    Interaction(bool),
    Destroy,
}

#[derive(Debug, Default)]
pub struct EngineLog {
    pub calls: Vec<EngineCall>,
    pub subscriptions: HashMap<SubscriptionId, EngineEventKind>,
    pub duration: f64,
    pub width: f64,
    next_id: u64,
}

impl EngineLog {
    pub fn active_subscriptions(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn interaction_enabled(&self) -> Option<bool> {
        self.calls.iter().rev().find_map(|c| match c {
            EngineCall::Interaction(enabled) => Some(*enabled),
            _ => None,
        })
    }

    pub fn zooms(&self) -> Vec<f64> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                EngineCall::Zoom(px) => Some(*px),
                _ => None,
            })
            .collect()
    }

    pub fn last_call(&self) -> Option<&EngineCall> {
        self.calls.last()
    }

    pub fn count(&self, call: &EngineCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

pub type SharedLog = Arc<Mutex<EngineLog>>;

pub struct ScriptedEngine {
    log: SharedLog,
}

impl ScriptedEngine {
    pub fn new(duration: f64, width: f64) -> (Self, SharedLog) {
        let log = Arc::new(Mutex::new(EngineLog {
            duration,
            width,
            ..Default::default()
        }));
        (Self { log: log.clone() }, log)
    }

    pub fn with_log(log: SharedLog) -> Self {
        Self { log }
    }
}

impl WaveformEngine for ScriptedEngine {
    fn on(&mut self, kind: EngineEventKind) -> SubscriptionId {
        let mut log = self.log.lock();
        log.next_id += 1;
        let id = SubscriptionId(log.next_id);
        log.subscriptions.insert(id, kind);
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.log.lock().subscriptions.remove(&id);
    }

    fn play(&mut self, start: f64, end: Option<f64>) {
        self.log.lock().calls.push(EngineCall::Play(start, end));
    }

    fn pause(&mut self) {
        self.log.lock().calls.push(EngineCall::Pause);
    }

    fn set_time(&mut self, time: f64) {
        self.log.lock().calls.push(EngineCall::SetTime(time));
    }

    fn zoom(&mut self, px_per_sec: f64) {
        self.log.lock().calls.push(EngineCall::Zoom(px_per_sec));
    }

    fn set_scroll_time(&mut self, time: f64) {
        self.log.lock().calls.push(EngineCall::ScrollTime(time));
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.log.lock().calls.push(EngineCall::PlaybackRate(rate));
    }

    fn duration(&self) -> f64 {
        self.log.lock().duration
    }

    fn wrapper_width(&self) -> f64 {
        self.log.lock().width
    }

    fn toggle_interaction(&mut self, enabled: bool) {
        self.log.lock().calls.push(EngineCall::Interaction(enabled));
    }

    fn destroy(&mut self) {
        self.log.lock().calls.push(EngineCall::Destroy);
    }
}

/// Factory handing out scripted engines that share one log
pub struct ScriptedFactory {
    pub log: SharedLog,
    pub configs: Arc<Mutex<Vec<EngineConfig>>>,
    pub fail: bool,
}

impl ScriptedFactory {
    pub fn new(duration: f64, width: f64) -> Self {
        let (_, log) = ScriptedEngine::new(duration, width);
        Self {
            log,
            configs: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }
}

impl EngineFactory for ScriptedFactory {
    fn create(&self, config: EngineConfig) -> Result<Box<dyn WaveformEngine>, EngineError> {
        if self.fail {
            return Err(EngineError::Create("scripted failure".to_string()));
        }
        self.configs.lock().push(config);
        Ok(Box::new(ScriptedEngine::with_log(self.log.clone())))
    }
}
