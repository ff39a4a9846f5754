//! # Event Bus System
//!
//! Provides an event-driven architecture for the playback core using `tokio::sync::broadcast`.
//! This module enables decoupled communication between core modules and the host UI through
//! typed events.
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **Event Types**: Strongly-typed enum hierarchies for different domains
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Wrapper for consuming events with filtering
//! - **Subscription Management**: Multiple subscribers can listen independently
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐   emit    ┌───────────┐
//! │ Playback Ctrl   ├──────────>│           │
//! └─────────────────┘           │           │
//!                               │ EventBus  │
//! ┌─────────────────┐   emit    │ (broadcast│   subscribe   ┌────────────┐
//! │ Favorite Mediat.├──────────>│  channel) ├──────────────>│ Host UI    │
//! └─────────────────┘           │           │               └────────────┘
//!                               │           │
//! ┌─────────────────┐   emit    │           │   subscribe   ┌────────────┐
//! │ Notifications   ├──────────>│           ├──────────────>│ Subscriber │
//! └─────────────────┘           └───────────┘               └────────────┘
//! ```
//!
//! ## Usage
//!
//! ### Publishing Events
//!
//! ```rust
//! use core_runtime::events::{EventBus, CoreEvent, FavoriteEvent};
//!
//! let event_bus = EventBus::new(100);
//! let event = CoreEvent::Favorite(FavoriteEvent::Changed {
//!     track_id: "track-1".to_string(),
//!     is_favorite: true,
//!     pending: true,
//! });
//!
//! event_bus.emit(event).ok();
//! ```
//!
//! ### Subscribing to Events
//!
//! ```rust
//! use core_runtime::events::{EventBus, CoreEvent, EventStream};
//! use tokio::sync::broadcast::error::RecvError;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut stream = EventStream::new(event_bus.subscribe())
//!     .filter(|event| matches!(event, CoreEvent::Playback(_)));
//!
//! tokio::spawn(async move {
//!     loop {
//!         match stream.recv().await {
//!             Ok(event) => println!("Received: {}", event.description()),
//!             Err(RecvError::Lagged(n)) => eprintln!("Missed {} events", n),
//!             Err(RecvError::Closed) => break,
//!         }
//!     }
//! });
//! # }
//! ```
//!
//! ## Event Types
//!
//! ### Playback Events
//! - `StatusChanged`: The engine reported a new transport status
//! - `TrackChanged`: The current track moved
//! - `QueueReplaced`: The active queue was replaced or extended
//! - `RateChanged`: Playback rate acknowledged by the engine
//! - `Error`: A playback intent failed
//!
//! ### Favorite Events
//! - `Changed`: A favorite cache entry changed (optimistic, committed or rolled back)
//!
//! ### Notification Events
//! - `Raised`: A user-visible notification was pushed
//! - `Dismissed`: A notification was dismissed or expired
//!
//! ## Error Handling
//!
//! The event bus uses `tokio::sync::broadcast`, which can produce two types of errors:
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n` events.
//!   This is non-fatal; the subscriber can continue receiving new events.
//! - **`RecvError::Closed`**: All senders have been dropped. This indicates shutdown.
//!
//! Emitting with no subscribers returns an error; publishers ignore it.

use bridge_traits::playback::EngineStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// This value balances memory usage with the ability to handle bursts of events.
/// Subscribers that can't keep up will receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
///
/// This is the main event type published and received through the event bus.
/// It wraps domain-specific event types for different modules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Playback controller events
    Playback(PlaybackEvent),
    /// Favorite cache events
    Favorite(FavoriteEvent),
    /// User-visible notifications
    Notification(NotificationEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Favorite(e) => e.description(),
            CoreEvent::Notification(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Playback(PlaybackEvent::Error { recoverable, .. }) => {
                if *recoverable {
                    EventSeverity::Warning
                } else {
                    EventSeverity::Error
                }
            }
            CoreEvent::Notification(NotificationEvent::Raised { kind, .. }) => match kind {
                NotificationKind::Error => EventSeverity::Error,
                NotificationKind::Warning => EventSeverity::Warning,
                _ => EventSeverity::Info,
            },
            CoreEvent::Playback(PlaybackEvent::TrackChanged { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events emitted by the playback controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// The engine reported a new status; the store mirrors it.
    StatusChanged { status: EngineStatus },
    /// The current track changed.
    TrackChanged { track_id: String, title: String },
    /// The active queue was replaced or extended.
    QueueReplaced { track_count: usize },
    /// The engine acknowledged a new playback rate.
    RateChanged { rate: f32 },
    /// A playback intent failed; the store was left untouched.
    Error {
        track_id: Option<String>,
        message: String,
        recoverable: bool,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::StatusChanged { .. } => "Playback status changed",
            PlaybackEvent::TrackChanged { .. } => "Current track changed",
            PlaybackEvent::QueueReplaced { .. } => "Playback queue replaced",
            PlaybackEvent::RateChanged { .. } => "Playback rate changed",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// Favorite Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum FavoriteEvent {
    /// The cached favorite state for a track changed.
    ///
    /// `pending` is true while the optimistic value awaits the backend.
    Changed {
        track_id: String,
        is_favorite: bool,
        pending: bool,
    },
}

impl FavoriteEvent {
    fn description(&self) -> &str {
        match self {
            FavoriteEvent::Changed { pending: true, .. } => "Favorite change pending",
            FavoriteEvent::Changed { .. } => "Favorite state changed",
        }
    }
}

// ============================================================================
// Notification Events
// ============================================================================

/// Kind of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum NotificationEvent {
    Raised {
        id: String,
        kind: NotificationKind,
        message: String,
    },
    Dismissed {
        id: String,
    },
}

impl NotificationEvent {
    fn description(&self) -> &str {
        match self {
            NotificationEvent::Raised { .. } => "Notification raised",
            NotificationEvent::Dismissed { .. } => "Notification dismissed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (events are cloned for each subscriber)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{EventBus, CoreEvent, PlaybackEvent};
///
/// # #[tokio::main]
/// # async fn main() {
/// let event_bus = EventBus::new(100);
///
/// let mut ui = event_bus.subscribe();
/// let mut logger = event_bus.subscribe();
///
/// let event = CoreEvent::Playback(PlaybackEvent::QueueReplaced { track_count: 3 });
/// event_bus.emit(event).ok();
///
/// // Both subscribers receive their own copy
/// # tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
/// # }
/// ```
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of events to buffer per subscriber.
    ///   When a subscriber falls behind by more than this amount, it will
    ///   receive a `RecvError::Lagged` error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use core_runtime::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Creates a new event bus with the default buffer size.
    ///
    /// # Example
    ///
    /// ```rust
    /// use core_runtime::events::EventBus;
    ///
    /// let event_bus = EventBus::default();
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event.
    /// Returns an error if there are no active subscribers.
    ///
    /// # Example
    ///
    /// ```rust
    /// use core_runtime::events::{EventBus, CoreEvent, NotificationEvent};
    ///
    /// let event_bus = EventBus::new(100);
    /// let event = CoreEvent::Notification(NotificationEvent::Dismissed {
    ///     id: "n-1".to_string(),
    /// });
    ///
    /// match event_bus.emit(event) {
    ///     Ok(n) => println!("Event sent to {} subscribers", n),
    ///     Err(_) => println!("No active subscribers"),
    /// }
    /// ```
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Each call creates an independent receiver that will receive all future events.
    /// Past events are not replayed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use core_runtime::events::EventBus;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let event_bus = EventBus::new(100);
    /// let mut subscriber = event_bus.subscribe();
    ///
    /// tokio::spawn(async move {
    ///     while let Ok(event) = subscriber.recv().await {
    ///         println!("Received: {:?}", event);
    ///     }
    /// });
    /// # }
    /// ```
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    ///
    /// # Example
    ///
    /// ```rust
    /// use core_runtime::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// assert_eq!(event_bus.subscriber_count(), 0);
    ///
    /// let _subscriber = event_bus.subscribe();
    /// assert_eq!(event_bus.subscriber_count(), 1);
    /// ```
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with additional filtering capabilities.
///
/// This provides a more ergonomic API for consuming events with optional filtering
/// by event type or severity.
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{EventBus, EventStream, CoreEvent};
///
/// # #[tokio::main]
/// # async fn main() {
/// let event_bus = EventBus::new(100);
/// let stream = EventStream::new(event_bus.subscribe());
///
/// // Favorite events only
/// let mut favorites = stream.filter(|event| {
///     matches!(event, CoreEvent::Favorite(_))
/// });
/// # }
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Adds a filter function to this stream.
    ///
    /// Only events that match the filter will be returned by `recv()`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use core_runtime::events::{EventBus, EventStream, CoreEvent};
    ///
    /// let event_bus = EventBus::new(100);
    /// let stream = EventStream::new(event_bus.subscribe());
    ///
    /// let playback = stream.filter(|event| {
    ///     matches!(event, CoreEvent::Playback(_))
    /// });
    /// ```
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// This will skip events that don't match the filter and return the next matching event.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;

            // If no filter, return immediately
            let Some(filter) = &self.filter else {
                return Ok(event);
            };

            // Apply filter
            if filter(&event) {
                return Ok(event);
            }

            // Event didn't match filter, continue to next event
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    // If no filter, return immediately
                    let Some(filter) = &self.filter else {
                        return Some(Ok(event));
                    };

                    // Apply filter
                    if filter(&event) {
                        return Some(Ok(event));
                    }

                    // Event didn't match filter, continue
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
