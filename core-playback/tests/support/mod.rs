//! Scripted in-memory engine shared by the integration tests.

#![allow(dead_code)]

use bridge_traits::error::Result;
use bridge_traits::{
    BridgeError, EngineEvent, EngineEventListener, EngineOptions, EngineProgress, EngineStatus,
    EngineTrack, ListenerId, PlaybackEngine,
};
use core_playback::{PlaybackSession, PlaybackStore, Track};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Default)]
struct EngineState {
    initialized: bool,
    status: EngineStatus,
    queue: Vec<EngineTrack>,
    active: Option<usize>,
    position: Duration,
    duration: Duration,
    rate: f32,
    calls: Vec<String>,
}

/// Behaves like a native player: commands mutate state immediately and
/// notify listeners synchronously. Responses can be held back with
/// [`FakeEngine::block`] to simulate slow completions.
#[derive(Default)]
pub struct FakeEngine {
    state: Mutex<EngineState>,
    listeners: Mutex<HashMap<u64, EngineEventListener>>,
    next_listener: AtomicU64,
    removed_listeners: AtomicUsize,
    setup_calls: AtomicUsize,
    setup_delay: Mutex<Option<Duration>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    failures: Mutex<HashMap<&'static str, BridgeError>>,
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_duration(self: Arc<Self>, duration: Duration) -> Arc<Self> {
        self.state.lock().duration = duration;
        self
    }

    pub fn delay_setup(&self, delay: Duration) {
        *self.setup_delay.lock() = Some(delay);
    }

    /// The next call to `command` fails with `error`.
    pub fn fail_next(&self, command: &'static str, error: BridgeError) {
        self.failures.lock().insert(command, error);
    }

    /// Holds the response of the next call labelled `call` until the
    /// returned gate is notified. The command itself is applied immediately.
    pub fn block(&self, call: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().insert(call.to_string(), Arc::clone(&gate));
        gate
    }

    /// Simulates the host tearing the native player down.
    pub fn restart(&self) {
        let mut state = self.state.lock();
        state.initialized = false;
        state.status = EngineStatus::Uninitialized;
        state.queue.clear();
        state.active = None;
    }

    /// Emits an event as the OS or engine would.
    pub fn emit(&self, event: EngineEvent) {
        let listeners: Vec<EngineEventListener> =
            self.listeners.lock().values().cloned().collect();
        for listener in listeners {
            listener(event);
        }
    }

    /// The active track ends and the engine advances on its own.
    pub fn finish_track(&self) {
        let next = {
            let mut state = self.state.lock();
            match state.active {
                Some(index) if index + 1 < state.queue.len() => {
                    state.active = Some(index + 1);
                    state.active
                }
                _ => None,
            }
        };
        if next.is_some() {
            self.emit(EngineEvent::ActiveTrackChanged(next));
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub async fn wait_for_call(&self, call: &str) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while self.count(call) == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("engine never received {call}"));
    }

    pub fn setup_calls(&self) -> usize {
        self.setup_calls.load(Ordering::SeqCst)
    }

    pub fn active_index_now(&self) -> Option<usize> {
        self.state.lock().active
    }

    pub fn queue_len(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn removed_listeners(&self) -> usize {
        self.removed_listeners.load(Ordering::SeqCst)
    }

    fn begin(&self, command: &'static str, label: String) -> Result<()> {
        if let Some(error) = self.failures.lock().remove(command) {
            self.state.lock().calls.push(label);
            return Err(error);
        }
        let mut state = self.state.lock();
        state.calls.push(label);
        if !state.initialized {
            return Err(BridgeError::NotInitialized);
        }
        Ok(())
    }

    async fn respond(&self, label: &str) {
        let gate = self.gates.lock().remove(label);
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn set_status(&self, status: EngineStatus) {
        self.state.lock().status = status;
        self.emit(EngineEvent::StatusChanged(status));
    }

    fn move_to(&self, index: usize) {
        self.state.lock().active = Some(index);
        self.emit(EngineEvent::ActiveTrackChanged(Some(index)));
    }
}

#[async_trait::async_trait]
impl PlaybackEngine for FakeEngine {
    async fn setup(&self) -> Result<()> {
        self.setup_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.setup_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.failures.lock().remove("setup") {
            return Err(error);
        }

        let mut state = self.state.lock();
        state.calls.push("setup".to_string());
        if state.initialized {
            return Err(BridgeError::AlreadyInitialized);
        }
        state.initialized = true;
        state.status = EngineStatus::Idle;
        state.rate = 1.0;
        Ok(())
    }

    async fn update_options(&self, _options: EngineOptions) -> Result<()> {
        self.begin("update_options", "update_options".to_string())
    }

    async fn set_queue(&self, tracks: Vec<EngineTrack>) -> Result<()> {
        self.begin("set_queue", "set_queue".to_string())?;
        {
            let mut state = self.state.lock();
            state.active = if tracks.is_empty() { None } else { Some(0) };
            state.queue = tracks;
        }
        self.respond("set_queue").await;
        Ok(())
    }

    async fn add(&self, tracks: Vec<EngineTrack>) -> Result<()> {
        let label = format!("add({})", tracks.len());
        self.begin("add", label.clone())?;
        self.state.lock().queue.extend(tracks);
        self.respond(&label).await;
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        self.begin("reset", "reset".to_string())?;
        {
            let mut state = self.state.lock();
            state.queue.clear();
            state.active = None;
        }
        self.respond("reset").await;
        Ok(())
    }

    async fn skip(&self, index: usize) -> Result<()> {
        let label = format!("skip({index})");
        self.begin("skip", label.clone())?;
        if index >= self.queue_len() {
            return Err(BridgeError::OperationFailed(format!("no entry at {index}")));
        }
        self.move_to(index);
        self.respond(&label).await;
        Ok(())
    }

    async fn skip_to_next(&self) -> Result<()> {
        self.begin("skip_to_next", "skip_to_next".to_string())?;
        let target = {
            let state = self.state.lock();
            state
                .active
                .map(|i| i + 1)
                .filter(|i| *i < state.queue.len())
        };
        let Some(target) = target else {
            return Err(BridgeError::OperationFailed("no next track".to_string()));
        };
        self.move_to(target);
        self.respond("skip_to_next").await;
        Ok(())
    }

    async fn skip_to_previous(&self) -> Result<()> {
        self.begin("skip_to_previous", "skip_to_previous".to_string())?;
        let target = self.state.lock().active.and_then(|i| i.checked_sub(1));
        let Some(target) = target else {
            return Err(BridgeError::OperationFailed("no previous track".to_string()));
        };
        self.move_to(target);
        self.respond("skip_to_previous").await;
        Ok(())
    }

    async fn play(&self) -> Result<()> {
        self.begin("play", "play".to_string())?;
        let was_paused = self.state.lock().status == EngineStatus::Paused;
        if !was_paused {
            self.set_status(EngineStatus::Buffering);
        }
        self.set_status(EngineStatus::Playing);
        self.respond("play").await;
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        self.begin("pause", "pause".to_string())?;
        if self.state.lock().status == EngineStatus::Playing {
            self.set_status(EngineStatus::Paused);
        }
        self.respond("pause").await;
        Ok(())
    }

    async fn seek_to(&self, position: Duration) -> Result<()> {
        self.begin("seek_to", format!("seek_to({})", position.as_secs_f64()))?;
        self.state.lock().position = position;
        Ok(())
    }

    async fn set_rate(&self, rate: f32) -> Result<()> {
        self.begin("set_rate", format!("set_rate({rate})"))?;
        self.state.lock().rate = rate;
        Ok(())
    }

    async fn active_index(&self) -> Result<Option<usize>> {
        Ok(self.state.lock().active)
    }

    async fn queue(&self) -> Result<Vec<EngineTrack>> {
        Ok(self.state.lock().queue.clone())
    }

    async fn progress(&self) -> Result<EngineProgress> {
        let state = self.state.lock();
        Ok(EngineProgress {
            position: state.position,
            duration: state.duration,
            buffered: state.duration,
        })
    }

    async fn status(&self) -> Result<EngineStatus> {
        Ok(self.state.lock().status)
    }

    fn add_listener(&self, listener: EngineEventListener) -> ListenerId {
        let id = self.next_listener.fetch_add(1, Ordering::SeqCst);
        self.listeners.lock().insert(id, listener);
        ListenerId(id)
    }

    fn remove_listener(&self, id: ListenerId) {
        if self.listeners.lock().remove(&id.0).is_some() {
            self.removed_listeners.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub fn tracks(count: usize) -> Vec<Track> {
    (0..count)
        .map(|i| {
            Track::new(
                format!("t{i}"),
                format!("Track {i}"),
                format!("https://cdn.example.com/audio/t{i}.mp3"),
            )
            .with_owner("u1", "Owner")
        })
        .collect()
}

/// Waits until the session satisfies `predicate`, failing after two seconds.
pub async fn wait_for<F>(store: &PlaybackStore, predicate: F) -> PlaybackSession
where
    F: Fn(&PlaybackSession) -> bool,
{
    let mut watch = store.watch();
    let result = tokio::time::timeout(Duration::from_secs(2), watch.wait_for(|s| predicate(s))).await;
    match result {
        Ok(Ok(session)) => session.clone(),
        _ => panic!("store never reached the expected state: {:?}", store.snapshot()),
    }
}
