//! # Playback Synchronization
//!
//! Keeps a native media engine and the UI-facing playback state in agreement.
//!
//! ## Overview
//!
//! - [`EngineAdapter`] wraps a [`bridge_traits::PlaybackEngine`] with
//!   idempotent setup and typed errors
//! - [`PlaybackStore`] is the single source of truth read by the UI; only the
//!   controller holds its [`StoreWriter`]
//! - [`PlaybackController`] turns taps, transport buttons and remote-control
//!   events into engine commands and discards completions that a newer intent
//!   has overtaken
//! - [`queue`] compares and deduplicates track lists by id

pub mod adapter;
pub mod controller;
pub mod error;
pub mod progress;
pub mod queue;
pub mod store;
pub mod track;

pub use adapter::{EngineAdapter, EngineSubscription};
pub use controller::{IntentOutcome, PlaybackController};
pub use error::{PlaybackError, Result};
pub use progress::{format_duration, map_range, Progress};
pub use store::{PlaybackSession, PlaybackStore, StoreWriter};
pub use track::{Category, Track};
