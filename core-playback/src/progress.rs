//! Playback progress as rendered by the mini player and the full player.

use bridge_traits::EngineProgress;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Position information for the current track.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Progress {
    pub position: Duration,
    /// Zero while the engine does not know the duration yet.
    pub duration: Duration,
    pub buffered: Duration,
}

impl Progress {
    /// Position mapped onto `0.0..=100.0`. An unknown duration yields `0.0`.
    pub fn percent(&self) -> f64 {
        map_range(
            self.position.as_secs_f64(),
            (0.0, self.duration.as_secs_f64()),
            (0.0, 100.0),
        )
        .clamp(0.0, 100.0)
    }

    /// Buffered amount mapped onto `0.0..=100.0`.
    pub fn buffered_percent(&self) -> f64 {
        map_range(
            self.buffered.as_secs_f64(),
            (0.0, self.duration.as_secs_f64()),
            (0.0, 100.0),
        )
        .clamp(0.0, 100.0)
    }

    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.position)
    }
}

impl From<EngineProgress> for Progress {
    fn from(progress: EngineProgress) -> Self {
        Self {
            position: progress.position,
            duration: progress.duration,
            buffered: progress.buffered,
        }
    }
}

/// Linear map of `value` from `input` onto `output`. Degenerate inputs map to `0.0`.
pub fn map_range(value: f64, input: (f64, f64), output: (f64, f64)) -> f64 {
    let mapped = (value - input.0) / (input.1 - input.0) * (output.1 - output.0) + output.0;
    if mapped.is_finite() {
        mapped
    } else {
        0.0
    }
}

/// Formats a duration as `m:ss`, truncating fractional seconds.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{}:{:02}", total / 60, total % 60)
}
