//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the playback core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//! - User-visible notifications
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the playback and favorites
//! crates depend on. It establishes the logging conventions, the fail-fast
//! configuration builder, and the event broadcasting used to reach the host UI.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod notifications;

pub use error::{Error, Result};
pub use notifications::{Notification, NotificationCenter};
