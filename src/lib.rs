//! Workspace placeholder crate.
//!
//! Exposes feature flags that map onto the workspace crates so host
//! applications can depend on `ampli-workspace` alone:
//!
//! - `desktop-shims` (default): the full [`core_service`] façade with the
//!   reqwest-backed HTTP client
//! - `playback-only`: just [`core_playback`]
//! - `favorites-only`: just [`core_favorites`]

#[cfg(feature = "desktop-shims")]
pub use core_service;

#[cfg(feature = "playback-only")]
pub use core_playback;

#[cfg(feature = "favorites-only")]
pub use core_favorites;
