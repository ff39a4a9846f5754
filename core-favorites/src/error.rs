//! Error types for the favorites client

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FavoriteError {
    /// The backend answered with a non-success status.
    #[error("Favorite API error (status {status_code}): {message}")]
    Api { status_code: u16, message: String },

    /// No bearer token is configured.
    #[error("Not signed in")]
    Unauthenticated,

    #[error("Invalid track id: {0:?}")]
    InvalidTrackId(String),

    #[error("Failed to parse favorite response: {0}")]
    Parse(String),

    /// Transport failure reported by the HTTP bridge.
    #[error("Network error: {0}")]
    Network(String),
}

impl FavoriteError {
    /// Text shown to the user when a toggle is rolled back.
    pub fn user_message(&self) -> String {
        match self {
            FavoriteError::Api { message, .. } => message.clone(),
            FavoriteError::Unauthenticated => "Please sign in to manage favorites".to_string(),
            FavoriteError::Network(_) => "Could not reach the server".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<bridge_traits::error::BridgeError> for FavoriteError {
    fn from(error: bridge_traits::error::BridgeError) -> Self {
        FavoriteError::Network(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FavoriteError>;

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::BridgeError;

    #[test]
    fn test_error_display() {
        let error = FavoriteError::Api {
            status_code: 403,
            message: "Please verify your email".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Favorite API error (status 403): Please verify your email"
        );
        assert_eq!(error.user_message(), "Please verify your email");
    }

    #[test]
    fn test_bridge_errors_become_network_errors() {
        let error: FavoriteError = BridgeError::OperationFailed("timeout".to_string()).into();
        assert!(matches!(error, FavoriteError::Network(_)));
        assert_eq!(error.user_message(), "Could not reach the server");
    }
}
