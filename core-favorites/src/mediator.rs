//! Optimistic favorite toggling.
//!
//! The UI flips immediately; the server call follows. A failed call restores
//! the previous value and raises an error notification.

use std::sync::Arc;

use core_runtime::events::{CoreEvent, EventBus, FavoriteEvent};
use core_runtime::NotificationCenter;
use tracing::{debug, info, instrument, warn};

use crate::api::FavoriteApi;
use crate::cache::{FavoriteCache, FavoriteState};
use crate::error::Result;

/// Result of [`FavoriteMediator::toggle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The server accepted the toggle; carries the value now shown.
    Committed(bool),
    /// The server call failed and the previous value was restored.
    RolledBack { restored: bool, reason: String },
    /// A toggle for this track is already outstanding; this one was ignored.
    InFlight,
}

pub struct FavoriteMediator {
    api: Arc<dyn FavoriteApi>,
    cache: FavoriteCache,
    notifications: NotificationCenter,
    event_bus: EventBus,
}

impl FavoriteMediator {
    pub fn new(
        api: Arc<dyn FavoriteApi>,
        notifications: NotificationCenter,
        event_bus: EventBus,
    ) -> Self {
        Self {
            api,
            cache: FavoriteCache::new(),
            notifications,
            event_bus,
        }
    }

    /// Value to display for `track_id`, if known.
    pub fn is_favorite(&self, track_id: &str) -> Option<bool> {
        self.cache.is_favorite(track_id)
    }

    pub fn state(&self, track_id: &str) -> Option<FavoriteState> {
        self.cache.get(track_id)
    }

    pub fn cache(&self) -> &FavoriteCache {
        &self.cache
    }

    #[instrument(skip(self))]
    pub async fn toggle(&self, track_id: &str) -> ToggleOutcome {
        let Some(optimistic) = self.cache.begin_toggle(track_id) else {
            debug!("Favorite toggle already in flight");
            return ToggleOutcome::InFlight;
        };
        self.emit(track_id, optimistic, true);

        match self.api.toggle_favorite(track_id).await {
            Ok(status) => {
                if status.is_favorite() != optimistic {
                    warn!(
                        server = status.is_favorite(),
                        optimistic, "Server favorite state differs from optimistic value"
                    );
                }
                let value = self.cache.commit(track_id).unwrap_or(optimistic);
                self.emit(track_id, value, false);
                info!(is_favorite = value, "Favorite toggled");
                ToggleOutcome::Committed(value)
            }
            Err(e) => {
                let restored = self.cache.rollback(track_id).unwrap_or(!optimistic);
                self.emit(track_id, restored, false);

                let reason = e.user_message();
                warn!(error = %e, restored, "Favorite toggle failed, rolled back");
                self.notifications.error(reason.clone());
                ToggleOutcome::RolledBack { restored, reason }
            }
        }
    }

    /// Seeds the cache from the server. A pending toggle is left alone and
    /// its optimistic value is returned instead.
    #[instrument(skip(self))]
    pub async fn refresh(&self, track_id: &str) -> Result<bool> {
        let value = self.api.is_favorite(track_id).await?;
        if self.cache.seed(track_id, value) {
            self.emit(track_id, value, false);
        }
        Ok(self.cache.is_favorite(track_id).unwrap_or(value))
    }

    fn emit(&self, track_id: &str, is_favorite: bool, pending: bool) {
        let _ = self.event_bus.emit(CoreEvent::Favorite(FavoriteEvent::Changed {
            track_id: track_id.to_string(),
            is_favorite,
            pending,
        }));
    }
}
