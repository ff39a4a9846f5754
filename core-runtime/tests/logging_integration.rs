//! Integration tests for logging system

use async_trait::async_trait;
use bridge_traits::error::Result as SinkResult;
use bridge_traits::logging::{LogEntry, LogLevel, LoggerSink};
use core_runtime::logging::{init_logging, redact_if_sensitive, LogFormat, LoggingConfig};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct CapturingSink {
    entries: Mutex<Vec<LogEntry>>,
}

#[async_trait]
impl LoggerSink for CapturingSink {
    async fn log(&self, entry: LogEntry) -> SinkResult<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

// A global subscriber can be installed once per process, so everything that
// depends on it lives in this single test.
#[test]
fn test_global_logging_mirrors_to_sink() {
    let sink = Arc::new(CapturingSink::default());
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .with_logger_sink(sink.clone());

    init_logging(config).expect("first initialization succeeds");

    tracing::info!(target: "core_playback", track_id = "a1", "Track changed");
    tracing::debug!(target: "core_playback", "below sink level");
    tracing::info!(target: "hyper", "filtered out by default directives");
    tracing::warn!(target: "core_favorites", authorization = "Bearer abc", "Toggle failed");

    {
        let entries = sink.entries.lock().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "Track changed");
        assert_eq!(entries[0].fields.get("track_id"), Some(&"a1".to_string()));
        assert_eq!(entries[1].level, LogLevel::Warn);
        assert_eq!(
            entries[1].fields.get("authorization"),
            Some(&"[REDACTED]".to_string())
        );
    }

    assert!(init_logging(LoggingConfig::default()).is_err());
}

#[test]
fn test_redaction_of_bearer_values() {
    assert_eq!(redact_if_sensitive("auth_token", "abc"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("value", "Bearer abc"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("audio_id", "65f1c2"), "65f1c2");
}

#[test]
fn test_format_selection() {
    #[cfg(debug_assertions)]
    assert_eq!(LoggingConfig::default().format, LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(LoggingConfig::default().format, LogFormat::Json);
}
