//! Thin wrapper over the host [`PlaybackEngine`].
//!
//! The adapter owns no playback logic. It guarantees a single engine setup per
//! app run, converts tracks into engine queue entries, maps bridge failures
//! onto [`PlaybackError`], and hands out event subscriptions that are released
//! exactly once.

use crate::error::{PlaybackError, Result};
use crate::progress::Progress;
use crate::track::Track;
use bridge_traits::{
    BridgeError, EngineEvent, EngineEventListener, EngineOptions, EngineStatus, EngineTrack,
    ListenerId, PlaybackEngine,
};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, instrument, warn};

pub struct EngineAdapter {
    engine: Arc<dyn PlaybackEngine>,
    options: EngineOptions,
    ready: AtomicBool,
    init_lock: Mutex<()>,
}

impl EngineAdapter {
    pub fn new(engine: Arc<dyn PlaybackEngine>, options: EngineOptions) -> Self {
        Self {
            engine,
            options,
            ready: AtomicBool::new(false),
            init_lock: Mutex::new(()),
        }
    }

    /// Sets the engine up and applies the player options.
    ///
    /// Concurrent callers wait for the first one; the engine's
    /// "already initialized" answer counts as success.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<()> {
        if self.ready.load(Ordering::Acquire) {
            return Ok(());
        }

        let _guard = self.init_lock.lock().await;
        if self.ready.load(Ordering::Acquire) {
            return Ok(());
        }

        match self.engine.setup().await {
            Ok(()) => info!("Playback engine set up"),
            Err(BridgeError::AlreadyInitialized) => {
                debug!("Playback engine was already set up")
            }
            Err(e) => {
                warn!(error = %e, "Playback engine setup failed");
                return Err(PlaybackError::EngineInitFailed(e.to_string()));
            }
        }

        self.engine
            .update_options(self.options.clone())
            .await
            .map_err(|e| PlaybackError::from_bridge("update_options", e))?;

        self.ready.store(true, Ordering::Release);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Forces the next [`initialize`](Self::initialize) to talk to the engine again.
    pub fn invalidate(&self) {
        if self.ready.swap(false, Ordering::AcqRel) {
            debug!("Engine marked unavailable, setup will be retried");
        }
    }

    async fn run<T, F>(&self, command: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = bridge_traits::error::Result<T>>,
    {
        match call.await {
            Ok(value) => Ok(value),
            Err(e) => {
                let error = PlaybackError::from_bridge(command, e);
                if error.is_engine_unavailable() {
                    self.invalidate();
                }
                Err(error)
            }
        }
    }

    pub async fn set_queue(&self, tracks: &[Track]) -> Result<()> {
        let entries: Vec<EngineTrack> = tracks.iter().map(Track::to_engine_track).collect();
        self.run("set_queue", self.engine.set_queue(entries)).await
    }

    pub async fn append_queue(&self, tracks: &[Track]) -> Result<()> {
        let entries: Vec<EngineTrack> = tracks.iter().map(Track::to_engine_track).collect();
        self.run("add", self.engine.add(entries)).await
    }

    pub async fn clear_queue(&self) -> Result<()> {
        self.run("reset", self.engine.reset()).await
    }

    pub async fn play_at_index(&self, index: usize) -> Result<()> {
        self.run("skip", self.engine.skip(index)).await
    }

    pub async fn play(&self) -> Result<()> {
        self.run("play", self.engine.play()).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.run("pause", self.engine.pause()).await
    }

    pub async fn skip_to_next(&self) -> Result<()> {
        self.run("skip_to_next", self.engine.skip_to_next()).await
    }

    pub async fn skip_to_previous(&self) -> Result<()> {
        self.run("skip_to_previous", self.engine.skip_to_previous())
            .await
    }

    pub async fn seek_to(&self, position_secs: f64) -> Result<()> {
        if !position_secs.is_finite() || position_secs < 0.0 {
            return Err(PlaybackError::InvalidSeek(position_secs));
        }
        let position = Duration::from_secs_f64(position_secs);
        self.run("seek_to", self.engine.seek_to(position)).await
    }

    /// Seeks relative to the current position, clamped to the track bounds.
    /// Returns the position that was sought to, in seconds.
    pub async fn seek_by(&self, delta_secs: f64) -> Result<f64> {
        if !delta_secs.is_finite() {
            return Err(PlaybackError::InvalidSeek(delta_secs));
        }

        let progress = self.progress().await?;
        let mut target = (progress.position.as_secs_f64() + delta_secs).max(0.0);
        if !progress.duration.is_zero() {
            target = target.min(progress.duration.as_secs_f64());
        }

        self.seek_to(target).await?;
        Ok(target)
    }

    pub async fn set_rate(&self, rate: f32) -> Result<()> {
        self.run("set_rate", self.engine.set_rate(rate)).await
    }

    pub async fn active_index(&self) -> Result<Option<usize>> {
        self.run("active_index", self.engine.active_index()).await
    }

    pub async fn queue_snapshot(&self) -> Result<Vec<EngineTrack>> {
        self.run("queue", self.engine.queue()).await
    }

    pub async fn progress(&self) -> Result<Progress> {
        self.run("progress", self.engine.progress())
            .await
            .map(Progress::from)
    }

    pub async fn status(&self) -> Result<EngineStatus> {
        self.run("status", self.engine.status()).await
    }

    /// Registers a listener that forwards engine events into the returned subscription.
    pub fn subscribe(&self) -> EngineSubscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let listener: EngineEventListener = Arc::new(move |event| {
            let _ = sender.send(event);
        });
        let id = self.engine.add_listener(listener);
        debug!(listener_id = id.0, "Engine listener registered");

        EngineSubscription {
            engine: Arc::clone(&self.engine),
            id,
            receiver,
            released: AtomicBool::new(false),
        }
    }
}

/// Engine events delivered to one listener, in emission order.
///
/// The listener is removed from the engine exactly once, either through
/// [`unsubscribe`](Self::unsubscribe) or on drop.
pub struct EngineSubscription {
    engine: Arc<dyn PlaybackEngine>,
    id: ListenerId,
    receiver: mpsc::UnboundedReceiver<EngineEvent>,
    released: AtomicBool,
}

impl EngineSubscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Next event, or `None` once the listener is gone.
    pub async fn recv(&mut self) -> Option<EngineEvent> {
        self.receiver.recv().await
    }

    pub fn unsubscribe(self) {
        self.release();
    }

    fn release(&self) {
        if !self.released.swap(true, Ordering::AcqRel) {
            self.engine.remove_listener(self.id);
            debug!(listener_id = self.id.0, "Engine listener removed");
        }
    }
}

impl Drop for EngineSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for EngineSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineSubscription")
            .field("id", &self.id)
            .field("released", &self.released.load(Ordering::Acquire))
            .finish()
    }
}
