//! # Core Configuration Module
//!
//! Provides configuration management for the playback core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds all necessary dependencies and settings for the core library.
//! It enforces fail-fast validation to ensure all required bridges are provided
//! before initialization.
//!
//! ## Required Dependencies
//!
//! - `PlaybackEngine` - The native media engine driven by the playback controller
//! - Backend base URL - Where favorites are read and toggled
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - HTTP operations (desktop default: reqwest)
//!
//! When the `desktop-shims` feature is enabled, the `bridge-desktop` HTTP
//! client is injected automatically if none is provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, PlayerSettings};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .api_base_url("https://api.ampli.app")
//!     .playback_engine(Arc::new(MyNativeEngine::new()))
//!     .auth_token(session.token())
//!     .player_settings(PlayerSettings::default().with_skip_interval(Duration::from_secs(15)))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
pub use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{EngineOptions, HttpClient, PlaybackEngine, RemoteCapability};
use std::sync::Arc;
use std::time::Duration;

/// Default time a notification stays visible.
pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_millis(3000);

/// Playback rates offered by the full player.
pub const DEFAULT_PLAYBACK_RATES: [f32; 7] = [0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0];

/// Core configuration for the playback core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Backend base URL, without trailing slash
    pub api_base_url: String,

    /// HTTP client for backend requests
    pub http_client: Arc<dyn HttpClient>,

    /// Native playback engine (required)
    pub playback_engine: Arc<dyn PlaybackEngine>,

    /// Bearer token sent with backend requests
    pub auth_token: Option<String>,

    /// Capacity of the event bus channel
    pub event_buffer_size: usize,

    /// Player behaviour
    pub player: PlayerSettings,

    /// How long notifications stay visible; zero keeps them until dismissed
    pub notification_duration: Duration,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("api_base_url", &self.api_base_url)
            .field("http_client", &"HttpClient { ... }")
            .field("playback_engine", &"PlaybackEngine { ... }")
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("event_buffer_size", &self.event_buffer_size)
            .field("player", &self.player)
            .field("notification_duration", &self.notification_duration)
            .finish()
    }
}

/// Player behaviour settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSettings {
    /// Interval between engine progress events
    pub progress_update_interval: Duration,

    /// Step used by skip forward / skip backward
    pub skip_interval: Duration,

    /// Selectable playback rates; the accepted range spans min..=max
    pub playback_rates: Vec<f32>,

    /// Remote-control buttons advertised to the OS
    pub remote_capabilities: Vec<RemoteCapability>,

    /// Keep playing after the host app is killed
    pub continue_on_app_killed: bool,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            progress_update_interval: Duration::from_secs(10),
            skip_interval: Duration::from_secs(10),
            playback_rates: DEFAULT_PLAYBACK_RATES.to_vec(),
            remote_capabilities: vec![
                RemoteCapability::Play,
                RemoteCapability::Pause,
                RemoteCapability::SkipToNext,
                RemoteCapability::SkipToPrevious,
            ],
            continue_on_app_killed: true,
        }
    }
}

impl PlayerSettings {
    pub fn with_skip_interval(mut self, interval: Duration) -> Self {
        self.skip_interval = interval;
        self
    }

    pub fn with_progress_update_interval(mut self, interval: Duration) -> Self {
        self.progress_update_interval = interval;
        self
    }

    pub fn with_playback_rates(mut self, rates: Vec<f32>) -> Self {
        self.playback_rates = rates;
        self
    }

    pub fn with_remote_capabilities(mut self, capabilities: Vec<RemoteCapability>) -> Self {
        self.remote_capabilities = capabilities;
        self
    }

    pub fn with_continue_on_app_killed(mut self, enabled: bool) -> Self {
        self.continue_on_app_killed = enabled;
        self
    }

    /// Lowest and highest configured rate.
    pub fn rate_bounds(&self) -> Option<(f32, f32)> {
        let min = self.playback_rates.iter().copied().reduce(f32::min)?;
        let max = self.playback_rates.iter().copied().reduce(f32::max)?;
        Some((min, max))
    }

    /// Returns `true` if `rate` lies inside the configured range.
    pub fn supports_rate(&self, rate: f32) -> bool {
        match self.rate_bounds() {
            Some((min, max)) => rate.is_finite() && rate >= min && rate <= max,
            None => false,
        }
    }

    /// Options applied to the engine right after setup.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            progress_update_interval: self.progress_update_interval,
            continue_on_app_killed: self.continue_on_app_killed,
            capabilities: self.remote_capabilities.clone(),
            compact_capabilities: self.remote_capabilities.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.playback_rates.is_empty() {
            return Err(Error::Config(
                "At least one playback rate must be configured".to_string(),
            ));
        }

        if let Some(rate) = self
            .playback_rates
            .iter()
            .find(|rate| !rate.is_finite() || **rate <= 0.0)
        {
            return Err(Error::Config(format!(
                "Playback rates must be positive, got {}",
                rate
            )));
        }

        if self.progress_update_interval.is_zero() {
            return Err(Error::Config(
                "Progress update interval must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Base URL is a non-empty `http://` or `https://` URL
    /// - Event buffer is not zero-sized
    /// - Player settings are consistent
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(Error::Config("API base URL cannot be empty".to_string()));
        }

        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(Error::Config(format!(
                "API base URL must start with http:// or https://, got '{}'",
                self.api_base_url
            )));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        self.player.validate()
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required to reach the backend. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the default ReqwestHttpClient. \
                 Mobile: inject the platform HTTP stack (URLSession/OkHttp)."
            .to_string(),
    }
}

fn playback_engine_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "PlaybackEngine".to_string(),
        message: "PlaybackEngine implementation is required to drive playback. \
                 Mobile: inject the native player bridge (AVQueuePlayer/Media3)."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::new()
        .map_err(|e| Error::Internal(format!("Failed to create default HttpClient: {}", e)))?;
    let client: Arc<dyn HttpClient> = Arc::new(client);
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Call [`build()`](CoreConfigBuilder::build) once every required value is set.
#[derive(Default)]
pub struct CoreConfigBuilder {
    api_base_url: Option<String>,
    http_client: Option<Arc<dyn HttpClient>>,
    playback_engine: Option<Arc<dyn PlaybackEngine>>,
    auth_token: Option<String>,
    event_buffer_size: Option<usize>,
    player: Option<PlayerSettings>,
    notification_duration: Option<Duration>,
}

impl CoreConfigBuilder {
    /// Sets the backend base URL (required). A trailing slash is removed.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.api_base_url = Some(url.trim_end_matches('/').to_string());
        self
    }

    /// Sets the HTTP client implementation.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the native playback engine (required).
    pub fn playback_engine(mut self, engine: Arc<dyn PlaybackEngine>) -> Self {
        self.playback_engine = Some(engine);
        self
    }

    /// Sets the bearer token used for backend requests.
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    pub fn player_settings(mut self, settings: PlayerSettings) -> Self {
        self.player = Some(settings);
        self
    }

    /// Sets how long notifications stay visible. `Duration::ZERO` disables auto-dismiss.
    pub fn notification_duration(mut self, duration: Duration) -> Self {
        self.notification_duration = Some(duration);
        self
    }

    /// Builds the configuration, failing on the first missing or invalid value.
    pub fn build(self) -> Result<CoreConfig> {
        let api_base_url = self.api_base_url.ok_or_else(|| {
            Error::Config("API base URL is required. Use .api_base_url() to set it.".to_string())
        })?;

        let playback_engine = self
            .playback_engine
            .ok_or_else(playback_engine_missing_error)?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let config = CoreConfig {
            api_base_url,
            http_client,
            playback_engine,
            auth_token: self.auth_token,
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            player: self.player.unwrap_or_default(),
            notification_duration: self
                .notification_duration
                .unwrap_or(DEFAULT_NOTIFICATION_DURATION),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{
        EngineEventListener, EngineProgress, EngineStatus, EngineTrack, HttpRequest,
        HttpResponse, ListenerId,
    };
    use mockall::mock;

    mock! {
        pub Engine {}

        #[async_trait::async_trait]
        impl PlaybackEngine for Engine {
            async fn setup(&self) -> BridgeResult<()>;
            async fn update_options(&self, options: EngineOptions) -> BridgeResult<()>;
            async fn set_queue(&self, tracks: Vec<EngineTrack>) -> BridgeResult<()>;
            async fn add(&self, tracks: Vec<EngineTrack>) -> BridgeResult<()>;
            async fn reset(&self) -> BridgeResult<()>;
            async fn skip(&self, index: usize) -> BridgeResult<()>;
            async fn skip_to_next(&self) -> BridgeResult<()>;
            async fn skip_to_previous(&self) -> BridgeResult<()>;
            async fn play(&self) -> BridgeResult<()>;
            async fn pause(&self) -> BridgeResult<()>;
            async fn seek_to(&self, position: Duration) -> BridgeResult<()>;
            async fn set_rate(&self, rate: f32) -> BridgeResult<()>;
            async fn active_index(&self) -> BridgeResult<Option<usize>>;
            async fn queue(&self) -> BridgeResult<Vec<EngineTrack>>;
            async fn progress(&self) -> BridgeResult<EngineProgress>;
            async fn status(&self) -> BridgeResult<EngineStatus>;
            fn add_listener(&self, listener: EngineEventListener) -> ListenerId;
            fn remove_listener(&self, id: ListenerId);
        }
    }

    mock! {
        pub Http {}

        #[async_trait::async_trait]
        impl HttpClient for Http {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    fn engine() -> Arc<dyn PlaybackEngine> {
        Arc::new(MockEngine::new())
    }

    fn http() -> Arc<dyn HttpClient> {
        Arc::new(MockHttp::new())
    }

    #[test]
    fn test_build_applies_defaults() {
        let config = CoreConfig::builder()
            .api_base_url("http://localhost:8989/")
            .playback_engine(engine())
            .http_client(http())
            .build()
            .unwrap();

        assert_eq!(config.api_base_url, "http://localhost:8989");
        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
        assert_eq!(config.notification_duration, Duration::from_millis(3000));
        assert_eq!(config.player, PlayerSettings::default());
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn test_builder_requires_base_url() {
        let result = CoreConfig::builder()
            .playback_engine(engine())
            .http_client(http())
            .build();

        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_requires_playback_engine() {
        let result = CoreConfig::builder()
            .api_base_url("https://api.ampli.app")
            .http_client(http())
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "PlaybackEngine")
            }
            other => panic!("expected CapabilityMissing, got {:?}", other),
        }
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_requires_http_client_without_shims() {
        let result = CoreConfig::builder()
            .api_base_url("https://api.ampli.app")
            .playback_engine(engine())
            .build();

        assert!(matches!(
            result,
            Err(Error::CapabilityMissing { ref capability, .. }) if capability == "HttpClient"
        ));
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_build_with_desktop_http_client() {
        let config = CoreConfig::builder()
            .api_base_url("https://api.ampli.app")
            .playback_engine(engine())
            .build();

        assert!(config.is_ok());
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let result = CoreConfig::builder()
            .api_base_url("ftp://files.ampli.app")
            .playback_engine(engine())
            .http_client(http())
            .build();

        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_zero_event_buffer() {
        let result = CoreConfig::builder()
            .api_base_url("https://api.ampli.app")
            .playback_engine(engine())
            .http_client(http())
            .event_buffer_size(0)
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_player_settings_validation() {
        assert!(PlayerSettings::default().validate().is_ok());
        assert!(PlayerSettings::default()
            .with_playback_rates(vec![])
            .validate()
            .is_err());
        assert!(PlayerSettings::default()
            .with_playback_rates(vec![1.0, -0.5])
            .validate()
            .is_err());
        assert!(PlayerSettings::default()
            .with_progress_update_interval(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn test_supports_rate_uses_configured_range() {
        let settings = PlayerSettings::default();
        assert_eq!(settings.rate_bounds(), Some((0.5, 2.0)));
        assert!(settings.supports_rate(1.0));
        assert!(settings.supports_rate(1.1));
        assert!(!settings.supports_rate(2.5));
        assert!(!settings.supports_rate(0.25));
        assert!(!settings.supports_rate(f32::NAN));
    }

    #[test]
    fn test_engine_options_follow_settings() {
        let settings = PlayerSettings::default()
            .with_remote_capabilities(vec![RemoteCapability::Play, RemoteCapability::Pause])
            .with_continue_on_app_killed(false);

        let options = settings.engine_options();
        assert_eq!(options.capabilities.len(), 2);
        assert_eq!(options.compact_capabilities, options.capabilities);
        assert!(!options.continue_on_app_killed);
        assert_eq!(options.progress_update_interval, Duration::from_secs(10));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = CoreConfig::builder()
            .api_base_url("https://api.ampli.app")
            .playback_engine(engine())
            .http_client(http())
            .auth_token("very-secret")
            .build()
            .unwrap();

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
