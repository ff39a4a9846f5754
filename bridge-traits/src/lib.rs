//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback core and the
//! platform-specific pieces it cannot own: the native media engine, the HTTP
//! transport to the backend, and the host logging pipeline.
//!
//! ## Traits
//!
//! - [`PlaybackEngine`](playback::PlaybackEngine) - Native queue/transport primitives and event listeners
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations with retry and TLS
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ HTTP only |
//! | iOS      | TBD                 | 📋 Planned |
//! | Android  | TBD                 | 📋 Planned |
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Engine
//! implementations must report the two setup conditions the core depends on
//! with dedicated variants:
//!
//! - `BridgeError::AlreadyInitialized` when `setup` races with another caller
//! - `BridgeError::NotInitialized` when a command arrives before setup
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds to support safe concurrent usage
//! across async tasks. Engine listeners may be invoked from any thread.

pub mod error;
pub mod http;
pub mod logging;
pub mod playback;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use playback::{
    EngineEvent, EngineEventListener, EngineOptions, EngineProgress, EngineStatus, EngineTrack,
    ListenerId, PlaybackEngine, RemoteCapability,
};
