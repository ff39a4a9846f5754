//! User-visible notifications (toasts).
//!
//! The core raises a notification when something the user did could not be
//! applied, e.g. a favorite toggle the backend rejected. Hosts render them
//! from [`NotificationCenter::list`] or from `CoreEvent::Notification` events.

use crate::events::{CoreEvent, EventBus, NotificationEvent, NotificationKind};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// A notification currently shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

struct Inner {
    entries: Mutex<Vec<Notification>>,
    event_bus: EventBus,
    duration: Duration,
}

impl Inner {
    fn dismiss(&self, id: &str) -> bool {
        let removed = {
            let mut entries = self.entries.lock();
            let before = entries.len();
            entries.retain(|entry| entry.id != id);
            entries.len() != before
        };

        if removed {
            let _ = self
                .event_bus
                .emit(CoreEvent::Notification(NotificationEvent::Dismissed {
                    id: id.to_string(),
                }));
        }
        removed
    }
}

/// Holds the active notifications and expires them after a fixed duration.
///
/// Cloning is cheap; clones share the same list.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Inner>,
}

impl NotificationCenter {
    /// `duration` of zero keeps notifications until they are dismissed.
    pub fn new(event_bus: EventBus, duration: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(Vec::new()),
                event_bus,
                duration,
            }),
        }
    }

    /// Shows a notification and returns its id.
    ///
    /// Auto-dismiss needs a Tokio runtime; outside one the notification
    /// stays until dismissed.
    pub fn push(&self, message: impl Into<String>, kind: NotificationKind) -> String {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            kind,
            message: message.into(),
            created_at: Utc::now(),
        };
        let id = notification.id.clone();

        debug!(notification_id = %id, kind = ?kind, "Raising notification");
        let message = notification.message.clone();
        self.inner.entries.lock().push(notification);
        let _ = self
            .inner
            .event_bus
            .emit(CoreEvent::Notification(NotificationEvent::Raised {
                id: id.clone(),
                kind,
                message,
            }));

        if !self.inner.duration.is_zero() {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                let inner = Arc::clone(&self.inner);
                let expired = id.clone();
                handle.spawn(async move {
                    tokio::time::sleep(inner.duration).await;
                    inner.dismiss(&expired);
                });
            }
        }

        id
    }

    pub fn success(&self, message: impl Into<String>) -> String {
        self.push(message, NotificationKind::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> String {
        self.push(message, NotificationKind::Error)
    }

    pub fn warning(&self, message: impl Into<String>) -> String {
        self.push(message, NotificationKind::Warning)
    }

    pub fn info(&self, message: impl Into<String>) -> String {
        self.push(message, NotificationKind::Info)
    }

    /// Removes a notification. Returns `false` if it was already gone.
    pub fn dismiss(&self, id: &str) -> bool {
        self.inner.dismiss(id)
    }

    /// Removes every notification.
    pub fn clear(&self) {
        let drained: Vec<Notification> = self.inner.entries.lock().drain(..).collect();
        for notification in drained {
            let _ = self
                .inner
                .event_bus
                .emit(CoreEvent::Notification(NotificationEvent::Dismissed {
                    id: notification.id,
                }));
        }
    }

    /// Active notifications, oldest first.
    pub fn list(&self) -> Vec<Notification> {
        self.inner.entries.lock().clone()
    }
}

impl std::fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("active", &self.inner.entries.lock().len())
            .field("duration", &self.inner.duration)
            .finish()
    }
}
