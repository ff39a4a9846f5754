//! # Favorites
//!
//! Optimistic favorite toggling on top of the backend favorites API.
//!
//! - [`HttpFavoriteApi`] talks to the backend through the host
//!   [`bridge_traits::http::HttpClient`]
//! - [`FavoriteCache`] holds one flag per track id, with a pending state
//!   while a toggle is outstanding
//! - [`FavoriteMediator`] flips the cache first, calls the server, and rolls
//!   back with a notification on failure

pub mod api;
pub mod cache;
pub mod error;
pub mod mediator;

pub use api::{FavoriteApi, FavoriteStatus, HttpFavoriteApi};
pub use cache::{FavoriteCache, FavoriteState};
pub use error::{FavoriteError, Result};
pub use mediator::{FavoriteMediator, ToggleOutcome};
