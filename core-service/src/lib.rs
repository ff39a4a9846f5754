//! Core service façade.
//!
//! Wires a validated [`CoreConfig`] into the pieces a host app needs for one
//! run: a single [`PlaybackController`], a single [`FavoriteMediator`], the
//! [`NotificationCenter`] and the [`EventBus`] they all publish to.
//!
//! ```ignore
//! let config = CoreConfig::builder()
//!     .api_base_url("https://api.example.com")
//!     .playback_engine(engine)
//!     .auth_token(token)
//!     .build()?;
//!
//! let core = CoreService::new(config)?;
//! core.activate().await;
//! core.playback().press_track(track, list).await;
//! core.favorites().toggle(&track_id).await;
//! core.shutdown().await;
//! ```

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use core_favorites::{FavoriteApi, FavoriteMediator, HttpFavoriteApi};
use core_playback::{IntentOutcome, PlaybackController};
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventBus, EventStream};
use core_runtime::NotificationCenter;
use tracing::{info, instrument, warn};

/// Primary façade exposed to host applications.
pub struct CoreService {
    event_bus: EventBus,
    notifications: NotificationCenter,
    playback: Arc<PlaybackController>,
    favorites: FavoriteMediator,
    favorite_api: Option<Arc<HttpFavoriteApi>>,
}

impl CoreService {
    /// Builds the service with the backend favorites API over the configured
    /// HTTP client.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;
        let api = Arc::new(HttpFavoriteApi::new(
            Arc::clone(&config.http_client),
            config.api_base_url.clone(),
            config.auth_token.clone(),
        ));
        let mut service = Self::assemble(config, Arc::clone(&api) as Arc<dyn FavoriteApi>);
        service.favorite_api = Some(api);
        Ok(service)
    }

    /// Builds the service around a host-provided favorites API.
    pub fn with_favorite_api(config: CoreConfig, api: Arc<dyn FavoriteApi>) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config, api))
    }

    fn assemble(config: CoreConfig, api: Arc<dyn FavoriteApi>) -> Self {
        let event_bus = EventBus::new(config.event_buffer_size);
        let notifications =
            NotificationCenter::new(event_bus.clone(), config.notification_duration);
        let playback = PlaybackController::new(
            Arc::clone(&config.playback_engine),
            config.player.clone(),
            event_bus.clone(),
        );
        let favorites = FavoriteMediator::new(api, notifications.clone(), event_bus.clone());

        Self {
            event_bus,
            notifications,
            playback,
            favorites,
            favorite_api: None,
        }
    }

    pub fn playback(&self) -> &Arc<PlaybackController> {
        &self.playback
    }

    pub fn favorites(&self) -> &FavoriteMediator {
        &self.favorites
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn subscribe_events(&self) -> EventStream {
        EventStream::new(self.event_bus.subscribe())
    }

    /// Replaces the bearer token used by the built-in favorites API.
    pub fn set_auth_token(&self, token: Option<String>) {
        match &self.favorite_api {
            Some(api) => api.set_auth_token(token),
            None => warn!("Auth token ignored, favorites API is host-provided"),
        }
    }

    /// Starts listening to the engine and sets it up.
    ///
    /// A setup failure leaves the player inert (controls disabled) rather
    /// than failing the app; the next intent retries it.
    #[instrument(skip(self))]
    pub async fn activate(&self) -> IntentOutcome {
        self.playback.activate().await;
        let outcome = self.playback.initialize().await;
        match &outcome {
            IntentOutcome::Failed(e) => warn!(error = %e, "Core activated with an inert player"),
            _ => info!("Core activated"),
        }
        outcome
    }

    /// Stops engine event handling and drops pending notifications.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        self.playback.deactivate().await;
        self.notifications.clear();
        info!("Core shut down");
    }
}
