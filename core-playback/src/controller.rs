//! # Playback Controller
//!
//! Turns user and remote-control intents into engine commands and keeps the
//! [`PlaybackStore`] consistent with what the engine reports.
//!
//! ## Guards
//!
//! Every decision keys off the last status the engine reported and the
//! current track id in the store, never off an assumed state.
//!
//! ## Stale completions
//!
//! Track-changing intents (`press_track`, `next`, `previous`,
//! `prepare_queue`) take a new generation number. Between engine commands and
//! before writing the store, the intent checks that its generation is still
//! the latest; if not it stops and reports [`IntentOutcome::Superseded`].
//!
//! ## Coalescing
//!
//! A second press on the same track, a second `next`/`previous` or a second
//! play/pause toggle while the first is still running returns
//! [`IntentOutcome::Coalesced`] without touching the engine.
//!
//! ## Lifecycle
//!
//! [`activate`](PlaybackController::activate) registers one engine listener
//! and spawns the event pump; [`deactivate`](PlaybackController::deactivate)
//! cancels the pump and releases the listener exactly once.

use crate::adapter::{EngineAdapter, EngineSubscription};
use crate::error::{PlaybackError, Result};
use crate::progress::Progress;
use crate::queue::{has_unique_ids, index_of, new_entries, same_queue};
use crate::store::{PlaybackSession, PlaybackStore, StoreWriter};
use crate::track::Track;
use bridge_traits::{EngineEvent, EngineStatus, EngineTrack, PlaybackEngine};
use core_runtime::config::PlayerSettings;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Result of a controller intent. Intents never return errors to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum IntentOutcome {
    /// Engine commands were issued and the store updated where applicable.
    Applied,
    /// Guards did not allow any action (boundary, unknown state, ...).
    NoOp,
    /// The same intent was already running.
    Coalesced,
    /// A newer track change won; this one left the store alone.
    Superseded,
    /// An engine command failed; the store was left untouched.
    Failed(PlaybackError),
}

impl IntentOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, IntentOutcome::Applied)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum IntentKey {
    Press(String),
    Next,
    Previous,
    Toggle,
}

impl IntentKey {
    fn changes_track(&self) -> bool {
        !matches!(self, IntentKey::Toggle)
    }
}

struct InFlight<'a> {
    set: &'a Mutex<HashSet<IntentKey>>,
    key: IntentKey,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.key);
    }
}

struct Activation {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

pub struct PlaybackController {
    adapter: EngineAdapter,
    store: PlaybackStore,
    writer: Mutex<StoreWriter>,
    generation: AtomicU64,
    in_flight: Mutex<HashSet<IntentKey>>,
    settings: PlayerSettings,
    event_bus: EventBus,
    activation: tokio::sync::Mutex<Option<Activation>>,
}

impl PlaybackController {
    pub fn new(
        engine: Arc<dyn PlaybackEngine>,
        settings: PlayerSettings,
        event_bus: EventBus,
    ) -> Arc<Self> {
        let (store, writer) = PlaybackStore::new();
        Arc::new(Self {
            adapter: EngineAdapter::new(engine, settings.engine_options()),
            store,
            writer: Mutex::new(writer),
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(HashSet::new()),
            settings,
            event_bus,
            activation: tokio::sync::Mutex::new(None),
        })
    }

    /// Read-only handle for the UI.
    pub fn store(&self) -> PlaybackStore {
        self.store.clone()
    }

    pub fn session(&self) -> PlaybackSession {
        self.store.snapshot()
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Starts listening to engine events. Returns `false` if already active.
    pub async fn activate(self: &Arc<Self>) -> bool {
        let mut activation = self.activation.lock().await;
        if activation.is_some() {
            debug!("Playback controller already active");
            return false;
        }

        let subscription = self.adapter.subscribe();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_event_pump(
            Arc::downgrade(self),
            subscription,
            cancel.clone(),
        ));

        *activation = Some(Activation { cancel, task });
        info!("Playback controller activated");
        true
    }

    /// Stops the event pump and releases the engine listener.
    /// Returns `false` if the controller was not active.
    pub async fn deactivate(&self) -> bool {
        let Some(activation) = self.activation.lock().await.take() else {
            return false;
        };

        activation.cancel.cancel();
        if let Err(e) = activation.task.await {
            error!(error = %e, "Engine event pump ended abnormally");
        }
        info!("Playback controller deactivated");
        true
    }

    pub async fn is_active(&self) -> bool {
        self.activation.lock().await.is_some()
    }

    /// Sets the engine up. Safe to call any number of times, concurrently.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> IntentOutcome {
        match self.ensure_initialized().await {
            Ok(()) => IntentOutcome::Applied,
            Err(e) => self.fail(e, None),
        }
    }

    // ------------------------------------------------------------------
    // Intents
    // ------------------------------------------------------------------

    /// The user tapped `track` inside the list `context`.
    #[instrument(skip(self, track, context), fields(track_id = %track.id, queue_len = context.len()))]
    pub async fn press_track(&self, track: Track, context: Vec<Track>) -> IntentOutcome {
        let Some(_in_flight) = self.begin(IntentKey::Press(track.id.clone())) else {
            debug!("Press already in flight");
            return IntentOutcome::Coalesced;
        };

        let Some(index) = index_of(&context, &track.id) else {
            return self.fail(PlaybackError::TrackNotInQueue(track.id.clone()), None);
        };
        if !has_unique_ids(&context) {
            return self.fail(PlaybackError::DuplicateTrackIds, None);
        }

        let result = self.press_track_inner(track.clone(), context, index).await;
        self.finish(result, Some(&track.id))
    }

    async fn press_track_inner(
        &self,
        track: Track,
        context: Vec<Track>,
        index: usize,
    ) -> Result<IntentOutcome> {
        self.ensure_initialized().await?;
        let session = self.store.snapshot();

        if matches!(
            session.engine_status,
            EngineStatus::Uninitialized | EngineStatus::Idle
        ) {
            let generation = self.next_generation();
            debug!(generation, "Loading queue for first playback");
            self.adapter.set_queue(&context).await?;
            self.ensure_current(generation)?;
            self.adapter.play_at_index(index).await?;
            self.ensure_current(generation)?;
            self.adapter.play().await?;
            self.commit_queue(generation, context, track)?;
            return Ok(IntentOutcome::Applied);
        }

        if session.is_current(&track.id) {
            return match session.engine_status {
                EngineStatus::Playing => {
                    self.adapter.pause().await?;
                    Ok(IntentOutcome::Applied)
                }
                EngineStatus::Paused | EngineStatus::Stopped => {
                    self.adapter.play().await?;
                    Ok(IntentOutcome::Applied)
                }
                _ => Ok(IntentOutcome::NoOp),
            };
        }

        let generation = self.next_generation();
        let reuse = same_queue(&session.queue, &context);
        debug!(generation, reuse, "Switching track");

        self.adapter.pause().await?;
        self.ensure_current(generation)?;
        if !reuse {
            self.adapter.clear_queue().await?;
            self.ensure_current(generation)?;
            self.adapter.set_queue(&context).await?;
            self.ensure_current(generation)?;
        }
        self.adapter.play_at_index(index).await?;
        self.ensure_current(generation)?;
        self.adapter.play().await?;

        if reuse {
            self.commit_current(generation, &track.id)?;
        } else {
            self.commit_queue(generation, context, track)?;
        }
        Ok(IntentOutcome::Applied)
    }

    /// Play when paused or stopped, pause when playing.
    #[instrument(skip(self))]
    pub async fn toggle_play_pause(&self) -> IntentOutcome {
        let Some(_in_flight) = self.begin(IntentKey::Toggle) else {
            return IntentOutcome::Coalesced;
        };

        let session = self.store.snapshot();
        let result = match session.engine_status {
            EngineStatus::Playing => self.adapter.pause().await.map(|_| IntentOutcome::Applied),
            EngineStatus::Paused | EngineStatus::Idle | EngineStatus::Stopped
                if session.current_track.is_some() =>
            {
                self.play_now().await
            }
            status => {
                debug!(%status, "Nothing to toggle");
                Ok(IntentOutcome::NoOp)
            }
        };
        self.finish(result, session.current_track.as_ref().map(|t| t.id.as_str()))
    }

    #[instrument(skip(self))]
    pub async fn next(&self) -> IntentOutcome {
        let Some(_in_flight) = self.begin(IntentKey::Next) else {
            return IntentOutcome::Coalesced;
        };
        let result = self.step(Direction::Next).await;
        self.finish(result, None)
    }

    #[instrument(skip(self))]
    pub async fn previous(&self) -> IntentOutcome {
        let Some(_in_flight) = self.begin(IntentKey::Previous) else {
            return IntentOutcome::Coalesced;
        };
        let result = self.step(Direction::Previous).await;
        self.finish(result, None)
    }

    async fn step(&self, direction: Direction) -> Result<IntentOutcome> {
        self.ensure_initialized().await?;

        let engine_queue = self.adapter.queue_snapshot().await?;
        let Some(active) = self.adapter.active_index().await? else {
            return Ok(IntentOutcome::NoOp);
        };
        let has_neighbour = match direction {
            Direction::Next => active + 1 < engine_queue.len(),
            Direction::Previous => active > 0,
        };
        if !has_neighbour {
            debug!(active, len = engine_queue.len(), ?direction, "No adjacent track");
            return Ok(IntentOutcome::NoOp);
        }

        let generation = self.next_generation();
        match direction {
            Direction::Next => self.adapter.skip_to_next().await?,
            Direction::Previous => self.adapter.skip_to_previous().await?,
        }
        self.ensure_current(generation)?;

        // Confirm where the engine actually landed.
        let landed = self.adapter.active_index().await?;
        self.ensure_current(generation)?;

        if let Some(entry) = landed.and_then(|index| engine_queue.get(index)) {
            self.commit_current(generation, &entry.id)?;
        }
        Ok(IntentOutcome::Applied)
    }

    /// Seeks to an absolute position. Positions outside the track are ignored.
    #[instrument(skip(self))]
    pub async fn seek_to(&self, position_secs: f64) -> IntentOutcome {
        let result = self.seek_within_track(position_secs).await;
        self.finish(result, None)
    }

    async fn seek_within_track(&self, position_secs: f64) -> Result<IntentOutcome> {
        self.ensure_initialized().await?;
        let progress = self.adapter.progress().await?;
        let duration = progress.duration.as_secs_f64();
        let in_range = position_secs.is_finite()
            && position_secs >= 0.0
            && (progress.duration.is_zero() || position_secs <= duration);
        if !in_range {
            debug!(duration, "Seek target outside the track");
            return Ok(IntentOutcome::NoOp);
        }
        self.adapter.seek_to(position_secs).await?;
        Ok(IntentOutcome::Applied)
    }

    /// Seeks relative to the current position, clamped to the track.
    #[instrument(skip(self))]
    pub async fn skip_by(&self, delta_secs: f64) -> IntentOutcome {
        let result = self.seek_relative(delta_secs).await;
        self.finish(result, None)
    }

    async fn seek_relative(&self, delta_secs: f64) -> Result<IntentOutcome> {
        self.ensure_initialized().await?;
        let target = self.adapter.seek_by(delta_secs).await?;
        debug!(target, "Seeked");
        Ok(IntentOutcome::Applied)
    }

    pub async fn skip_forward(&self) -> IntentOutcome {
        self.skip_by(self.settings.skip_interval.as_secs_f64()).await
    }

    pub async fn skip_backward(&self) -> IntentOutcome {
        self.skip_by(-self.settings.skip_interval.as_secs_f64())
            .await
    }

    #[instrument(skip(self))]
    pub async fn set_rate(&self, rate: f32) -> IntentOutcome {
        if !self.settings.supports_rate(rate) {
            return self.fail(PlaybackError::UnsupportedRate(rate), None);
        }
        let result = self.apply_rate(rate).await;
        self.finish(result, None)
    }

    async fn apply_rate(&self, rate: f32) -> Result<IntentOutcome> {
        self.ensure_initialized().await?;
        self.adapter.set_rate(rate).await?;
        if self.writer.lock().set_rate(rate) {
            self.emit(PlaybackEvent::RateChanged { rate });
        }
        Ok(IntentOutcome::Applied)
    }

    /// Loads `queue` and positions on `start` without starting playback.
    #[instrument(skip(self, queue), fields(queue_len = queue.len()))]
    pub async fn prepare_queue(&self, queue: Vec<Track>, start: usize) -> IntentOutcome {
        let Some(track) = queue.get(start).cloned() else {
            if queue.is_empty() {
                return IntentOutcome::NoOp;
            }
            return self.fail(PlaybackError::TrackNotInQueue(format!("#{}", start)), None);
        };
        if !has_unique_ids(&queue) {
            return self.fail(PlaybackError::DuplicateTrackIds, None);
        }

        let generation = self.next_generation();
        let result = self.load_without_playing(generation, queue, track, start).await;
        self.finish(result, None)
    }

    async fn load_without_playing(
        &self,
        generation: u64,
        queue: Vec<Track>,
        track: Track,
        start: usize,
    ) -> Result<IntentOutcome> {
        self.ensure_initialized().await?;
        self.adapter.set_queue(&queue).await?;
        self.ensure_current(generation)?;
        self.adapter.play_at_index(start).await?;
        self.commit_queue(generation, queue, track)?;
        Ok(IntentOutcome::Applied)
    }

    /// Appends tracks to the end of the queue, skipping ids already queued.
    #[instrument(skip(self, tracks), fields(count = tracks.len()))]
    pub async fn enqueue(&self, tracks: Vec<Track>) -> IntentOutcome {
        let generation = self.generation.load(Ordering::SeqCst);
        let fresh = new_entries(&self.store.snapshot().queue, tracks);
        if fresh.is_empty() {
            return IntentOutcome::NoOp;
        }
        let result = self.append(generation, fresh).await;
        self.finish(result, None)
    }

    async fn append(&self, generation: u64, fresh: Vec<Track>) -> Result<IntentOutcome> {
        self.ensure_initialized().await?;
        self.adapter.append_queue(&fresh).await?;

        let track_count = {
            let writer = self.writer.lock();
            self.ensure_current(generation)?;
            writer.append(fresh);
            writer.snapshot().queue.len()
        };
        self.emit(PlaybackEvent::QueueReplaced { track_count });
        Ok(IntentOutcome::Applied)
    }

    /// Current position from the engine.
    pub async fn progress(&self) -> Result<Progress> {
        self.ensure_initialized().await?;
        self.adapter.progress().await
    }

    // ------------------------------------------------------------------
    // Engine events
    // ------------------------------------------------------------------

    async fn handle_engine_event(&self, event: EngineEvent) {
        match event {
            EngineEvent::StatusChanged(status) => {
                if self.writer.lock().set_status(status) {
                    debug!(%status, "Engine status changed");
                    self.emit(PlaybackEvent::StatusChanged { status });
                }
            }
            EngineEvent::ActiveTrackChanged(index) => self.follow_engine(index).await,
            EngineEvent::RemotePlay => {
                let outcome = self.finish(self.play_now().await, None);
                debug!(?outcome, "Remote play");
            }
            EngineEvent::RemotePause => {
                let result = self.adapter.pause().await.map(|_| IntentOutcome::Applied);
                let outcome = self.finish(result, None);
                debug!(?outcome, "Remote pause");
            }
            EngineEvent::RemoteNext => {
                let outcome = self.next().await;
                debug!(?outcome, "Remote next");
            }
            EngineEvent::RemotePrevious => {
                let outcome = self.previous().await;
                debug!(?outcome, "Remote previous");
            }
        }
    }

    /// The engine moved to another entry on its own (end of track).
    ///
    /// The event index may be stale by the time it is handled, so the live
    /// active index is read back from the engine.
    async fn follow_engine(&self, hint: Option<usize>) {
        if hint.is_none() || !self.adapter.is_initialized() {
            return;
        }
        if self.track_change_in_flight() {
            debug!(?hint, "Ignoring engine track change during a user intent");
            return;
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let entry: Option<EngineTrack> = match self.active_entry().await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Could not read engine queue");
                return;
            }
        };
        let Some(entry) = entry else {
            return;
        };

        if self.track_change_in_flight() {
            return;
        }
        if let Err(PlaybackError::Superseded) = self.commit_current(generation, &entry.id) {
            debug!(track_id = %entry.id, "Engine track change superseded");
        }
    }

    async fn active_entry(&self) -> Result<Option<EngineTrack>> {
        let queue = self.adapter.queue_snapshot().await?;
        let active = self.adapter.active_index().await?;
        Ok(active.and_then(|index| queue.into_iter().nth(index)))
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    async fn ensure_initialized(&self) -> Result<()> {
        let was_ready = self.adapter.is_initialized();
        match self.adapter.initialize().await {
            Ok(()) => {
                if !was_ready {
                    // A fresh or restarted engine: resync the reported status.
                    self.writer.lock().set_engine_fault(None);
                    let status = self.adapter.status().await?;
                    if self.writer.lock().set_status(status) {
                        self.emit(PlaybackEvent::StatusChanged { status });
                    }
                }
                Ok(())
            }
            Err(e @ PlaybackError::EngineInitFailed(_)) => {
                self.writer.lock().set_engine_fault(Some(e.to_string()));
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    async fn play_now(&self) -> Result<IntentOutcome> {
        self.ensure_initialized().await?;
        self.adapter.play().await?;
        Ok(IntentOutcome::Applied)
    }

    fn begin(&self, key: IntentKey) -> Option<InFlight<'_>> {
        if self.in_flight.lock().insert(key.clone()) {
            Some(InFlight {
                set: &self.in_flight,
                key,
            })
        } else {
            None
        }
    }

    fn track_change_in_flight(&self) -> bool {
        self.in_flight.lock().iter().any(IntentKey::changes_track)
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn ensure_current(&self, generation: u64) -> Result<()> {
        if self.generation.load(Ordering::SeqCst) == generation {
            Ok(())
        } else {
            Err(PlaybackError::Superseded)
        }
    }

    fn commit_queue(&self, generation: u64, queue: Vec<Track>, current: Track) -> Result<()> {
        let writer = self.writer.lock();
        self.ensure_current(generation)?;

        let track_count = queue.len();
        if !writer.replace_queue(queue, Some(current.clone())) {
            return Err(PlaybackError::TrackNotInQueue(current.id));
        }
        drop(writer);

        self.emit(PlaybackEvent::QueueReplaced { track_count });
        self.emit(PlaybackEvent::TrackChanged {
            track_id: current.id,
            title: current.title,
        });
        Ok(())
    }

    fn commit_current(&self, generation: u64, track_id: &str) -> Result<()> {
        let writer = self.writer.lock();
        self.ensure_current(generation)?;
        let changed = writer.set_current_track(track_id);
        drop(writer);

        if let Some(track) = changed {
            info!(track_id = %track.id, "Current track changed");
            self.emit(PlaybackEvent::TrackChanged {
                track_id: track.id,
                title: track.title,
            });
        }
        Ok(())
    }

    fn finish(&self, result: Result<IntentOutcome>, track_id: Option<&str>) -> IntentOutcome {
        match result {
            Ok(outcome) => outcome,
            Err(PlaybackError::Superseded) => {
                debug!("Intent superseded, result discarded");
                IntentOutcome::Superseded
            }
            Err(e) => self.fail(e, track_id),
        }
    }

    fn fail(&self, error: PlaybackError, track_id: Option<&str>) -> IntentOutcome {
        let recoverable = error.is_transient();
        if recoverable {
            warn!(error = %error, "Playback intent failed");
        } else {
            error!(error = %error, "Playback intent failed");
        }
        self.emit(PlaybackEvent::Error {
            track_id: track_id.map(str::to_string),
            message: error.to_string(),
            recoverable,
        });
        IntentOutcome::Failed(error)
    }

    fn emit(&self, event: PlaybackEvent) {
        let _ = self.event_bus.emit(CoreEvent::Playback(event));
    }
}

impl Drop for PlaybackController {
    /// Stops the event pump if the controller goes away while still active;
    /// the pump then releases the engine listener.
    fn drop(&mut self) {
        if let Some(activation) = self.activation.get_mut().take() {
            activation.cancel.cancel();
            debug!("Playback controller dropped while active");
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Next,
    Previous,
}

async fn run_event_pump(
    controller: Weak<PlaybackController>,
    mut subscription: EngineSubscription,
    cancel: CancellationToken,
) {
    debug!(listener_id = subscription.id().0, "Engine event pump started");
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = subscription.recv() => {
                let Some(event) = event else { break };
                let Some(controller) = controller.upgrade() else { break };
                controller.handle_engine_event(event).await;
            }
        }
    }
    subscription.unsubscribe();
    debug!("Engine event pump stopped");
}
