//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop hosts and tests
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! Mobile hosts inject their own HTTP stack and native playback engine. On
//! desktop the core falls back to:
//! - `HttpClient` using `reqwest`
//!
//! There is no desktop playback engine; hosts always provide one.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::ReqwestHttpClient;
//!
//! let http_client = ReqwestHttpClient::new()?;
//! ```

mod http;

pub use http::ReqwestHttpClient;
