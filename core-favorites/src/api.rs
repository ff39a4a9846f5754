//! Backend favorites API
//!
//! `POST {base}/favorite?audioId=<id>` toggles the favorite server-side and
//! answers `{"status": "added" | "removed"}`.
//! `GET {base}/favorite/is-fav?audioId=<id>` answers `{"result": bool}`.
//! Failures carry `{"error": "..."}`.

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
use parking_lot::RwLock;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::error::{FavoriteError, Result};

/// Server-side state after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteStatus {
    Added,
    Removed,
}

impl FavoriteStatus {
    pub fn is_favorite(self) -> bool {
        matches!(self, FavoriteStatus::Added)
    }
}

#[derive(Debug, Deserialize)]
struct ToggleResponse {
    status: FavoriteStatus,
}

#[derive(Debug, Deserialize)]
struct IsFavoriteResponse {
    result: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Remote favorites collaborator.
#[async_trait]
pub trait FavoriteApi: Send + Sync {
    /// Flips the favorite flag for `track_id` on the server.
    async fn toggle_favorite(&self, track_id: &str) -> Result<FavoriteStatus>;

    /// Current server-side flag for `track_id`.
    async fn is_favorite(&self, track_id: &str) -> Result<bool>;
}

/// [`FavoriteApi`] over the host [`HttpClient`].
pub struct HttpFavoriteApi {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    auth_token: RwLock<Option<String>>,
}

impl HttpFavoriteApi {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        auth_token: Option<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: RwLock::new(auth_token),
        }
    }

    /// Replaces the bearer token, e.g. after sign-in or sign-out.
    pub fn set_auth_token(&self, token: Option<String>) {
        *self.auth_token.write() = token;
    }

    pub fn has_auth_token(&self) -> bool {
        self.auth_token.read().is_some()
    }

    fn request(&self, method: HttpMethod, path: &str, track_id: &str) -> Result<HttpRequest> {
        if track_id.trim().is_empty() {
            return Err(FavoriteError::InvalidTrackId(track_id.to_string()));
        }
        let token = self
            .auth_token
            .read()
            .clone()
            .ok_or(FavoriteError::Unauthenticated)?;

        let url = format!(
            "{}{}?audioId={}",
            self.base_url,
            path,
            urlencoding::encode(track_id)
        );
        Ok(HttpRequest::new(method, url)
            .header("Accept", "application/json")
            .bearer_token(token))
    }

    fn check(response: HttpResponse) -> Result<HttpResponse> {
        if response.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorResponse>()
            .map(|e| e.error)
            .unwrap_or_else(|_| format!("Request failed with status {}", response.status));
        warn!(status = response.status, %message, "Favorite API request failed");
        Err(FavoriteError::Api {
            status_code: response.status,
            message,
        })
    }
}

#[async_trait]
impl FavoriteApi for HttpFavoriteApi {
    #[instrument(skip(self))]
    async fn toggle_favorite(&self, track_id: &str) -> Result<FavoriteStatus> {
        let request = self.request(HttpMethod::Post, "/favorite", track_id)?;

        // A toggle is not idempotent; a blind retry could flip it back.
        let policy = RetryPolicy {
            max_attempts: 1,
            ..RetryPolicy::default()
        };
        let response = Self::check(self.http_client.execute_with_retry(request, policy).await?)?;

        let body: ToggleResponse = response
            .json()
            .map_err(|e| FavoriteError::Parse(e.to_string()))?;
        debug!(status = ?body.status, "Favorite toggled");
        Ok(body.status)
    }

    #[instrument(skip(self))]
    async fn is_favorite(&self, track_id: &str) -> Result<bool> {
        let request = self.request(HttpMethod::Get, "/favorite/is-fav", track_id)?;
        let response = Self::check(self.http_client.execute(request).await?)?;

        let body: IsFavoriteResponse = response
            .json()
            .map_err(|e| FavoriteError::Parse(e.to_string()))?;
        Ok(body.result)
    }
}
