//! Playback engine bridge traits and supporting types.
//!
//! Mobile hosts own a stateful native media engine (queue, transport,
//! lock-screen integration) whose internal concurrency is opaque to the core.
//! [`PlaybackEngine`] exposes the raw primitives of such an engine. Every
//! command crosses an asynchronous boundary, and the engine reports what
//! actually happened through [`EngineEvent`]s delivered to registered
//! listeners, in emission order but unordered relative to the caller's own
//! pending commands.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Transport status reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EngineStatus {
    /// The engine has not been set up yet.
    #[default]
    Uninitialized,
    /// Set up, nothing loaded or playback never started.
    Idle,
    /// Loading or connecting to the media stream.
    Buffering,
    Playing,
    Paused,
    Stopped,
}

impl EngineStatus {
    /// Returns `true` while the engine is waiting on media.
    pub fn is_busy(&self) -> bool {
        matches!(self, EngineStatus::Buffering)
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EngineStatus::Uninitialized => "uninitialized",
            EngineStatus::Idle => "idle",
            EngineStatus::Buffering => "buffering",
            EngineStatus::Playing => "playing",
            EngineStatus::Paused => "paused",
            EngineStatus::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

/// Events emitted by the engine, including OS remote-control signals
/// (lock screen, notification shade, headset buttons).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    StatusChanged(EngineStatus),
    /// The engine moved to another queue entry on its own (e.g. end of track).
    ActiveTrackChanged(Option<usize>),
    RemotePlay,
    RemotePause,
    RemoteNext,
    RemotePrevious,
}

/// Remote-control capabilities advertised to the OS media session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemoteCapability {
    Play,
    Pause,
    SkipToNext,
    SkipToPrevious,
}

/// Options applied once after the engine has been set up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Interval between progress events emitted by the engine.
    pub progress_update_interval: Duration,
    /// Keep playing when the host app is killed by the OS.
    pub continue_on_app_killed: bool,
    /// Capabilities shown on the lock screen and full notification.
    pub capabilities: Vec<RemoteCapability>,
    /// Capabilities shown in compact notification layouts.
    pub compact_capabilities: Vec<RemoteCapability>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        let all = vec![
            RemoteCapability::Play,
            RemoteCapability::Pause,
            RemoteCapability::SkipToNext,
            RemoteCapability::SkipToPrevious,
        ];
        Self {
            progress_update_interval: Duration::from_secs(10),
            continue_on_app_killed: true,
            capabilities: all.clone(),
            compact_capabilities: all,
        }
    }
}

/// Queue entry as understood by the native engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineTrack {
    pub id: String,
    pub url: String,
    pub title: String,
    pub artist: String,
    pub artwork: Option<String>,
    pub genre: String,
    pub is_live_stream: bool,
}

/// Position information for the active queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineProgress {
    pub position: Duration,
    /// Zero when the duration is not known yet.
    pub duration: Duration,
    pub buffered: Duration,
}

/// Identifier returned when registering an engine event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Callback invoked by the engine for every emitted event.
pub type EngineEventListener = Arc<dyn Fn(EngineEvent) + Send + Sync>;

/// Raw primitives of a host media-playback engine.
///
/// Implementations wrap the platform player (ExoPlayer/Media3,
/// AVQueuePlayer, ...). They hold no business logic: the core decides what to
/// call and in which order.
#[async_trait::async_trait]
pub trait PlaybackEngine: Send + Sync {
    /// Set up the native player. Returns [`BridgeError::AlreadyInitialized`]
    /// if the player already exists.
    ///
    /// [`BridgeError::AlreadyInitialized`]: crate::error::BridgeError::AlreadyInitialized
    async fn setup(&self) -> Result<()>;

    /// Apply capability and behaviour options.
    async fn update_options(&self, options: EngineOptions) -> Result<()>;

    /// Replace the native queue entirely.
    async fn set_queue(&self, tracks: Vec<EngineTrack>) -> Result<()>;

    /// Append entries to the end of the native queue.
    async fn add(&self, tracks: Vec<EngineTrack>) -> Result<()>;

    /// Stop playback and clear the native queue.
    async fn reset(&self) -> Result<()>;

    /// Jump to the queue entry at `index`.
    async fn skip(&self, index: usize) -> Result<()>;

    async fn skip_to_next(&self) -> Result<()>;

    async fn skip_to_previous(&self) -> Result<()>;

    async fn play(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    async fn seek_to(&self, position: Duration) -> Result<()>;

    async fn set_rate(&self, rate: f32) -> Result<()>;

    /// Index of the active queue entry, if any.
    async fn active_index(&self) -> Result<Option<usize>>;

    /// Snapshot of the native queue.
    async fn queue(&self) -> Result<Vec<EngineTrack>>;

    async fn progress(&self) -> Result<EngineProgress>;

    async fn status(&self) -> Result<EngineStatus>;

    /// Register a listener for engine and remote-control events.
    fn add_listener(&self, listener: EngineEventListener) -> ListenerId;

    /// Remove a previously registered listener.
    fn remove_listener(&self, id: ListenerId);
}
