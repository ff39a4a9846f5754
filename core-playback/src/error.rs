//! # Playback Error Types
//!
//! Error types for engine commands and controller intents.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    // ========================================================================
    // Engine Errors
    // ========================================================================
    /// The engine rejected a command because it is not set up. Recovered by
    /// re-running initialization on the next intent.
    #[error("Playback engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Engine setup failed for a reason other than a concurrent setup.
    #[error("Playback engine initialization failed: {0}")]
    EngineInitFailed(String),

    /// A single engine command failed.
    #[error("Engine command '{command}' failed: {message}")]
    CommandFailed {
        command: &'static str,
        message: String,
    },

    // ========================================================================
    // Intent Errors
    // ========================================================================
    /// The requested track is not part of the queue it was pressed from.
    #[error("Track not in queue: {0}")]
    TrackNotInQueue(String),

    /// The queue lists the same track id more than once.
    #[error("Queue contains duplicate track ids")]
    DuplicateTrackIds,

    /// Seek target lies outside the current track.
    #[error("Invalid seek position: {0}s")]
    InvalidSeek(f64),

    /// Rate outside the configured playback-rate range.
    #[error("Unsupported playback rate: {0}")]
    UnsupportedRate(f32),

    /// A newer intent replaced this one before it finished.
    #[error("Intent superseded by a newer one")]
    Superseded,
}

impl PlaybackError {
    /// Maps a bridge error raised by `command` onto the playback taxonomy.
    pub fn from_bridge(command: &'static str, error: BridgeError) -> Self {
        match error {
            BridgeError::NotInitialized => {
                PlaybackError::EngineUnavailable(format!("{} before setup", command))
            }
            BridgeError::NotAvailable(message) => PlaybackError::EngineUnavailable(message),
            other => PlaybackError::CommandFailed {
                command,
                message: other.to_string(),
            },
        }
    }

    /// Returns `true` if the engine has to be initialized again.
    pub fn is_engine_unavailable(&self) -> bool {
        matches!(self, PlaybackError::EngineUnavailable(_))
    }

    /// Returns `true` if this error is transient and the intent can be retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlaybackError::EngineUnavailable(_) | PlaybackError::CommandFailed { .. }
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_initialized_maps_to_engine_unavailable() {
        let error = PlaybackError::from_bridge("play", BridgeError::NotInitialized);
        assert!(error.is_engine_unavailable());
        assert!(error.is_transient());
    }

    #[test]
    fn operation_failure_keeps_command_name() {
        let error = PlaybackError::from_bridge(
            "skip",
            BridgeError::OperationFailed("index out of range".to_string()),
        );
        assert_eq!(
            error.to_string(),
            "Engine command 'skip' failed: Bridge operation failed: index out of range"
        );
        assert!(!error.is_engine_unavailable());
    }

    #[test]
    fn intent_errors_are_not_transient() {
        assert!(!PlaybackError::TrackNotInQueue("x".to_string()).is_transient());
        assert!(!PlaybackError::EngineInitFailed("no audio session".to_string()).is_transient());
        assert!(!PlaybackError::Superseded.is_transient());
    }
}
