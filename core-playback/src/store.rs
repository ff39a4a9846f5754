//! Reactive playback state shared with the UI.
//!
//! [`PlaybackStore`] is the read side and can be cloned freely.
//! [`StoreWriter`] is the only way to mutate the session; it is not `Clone`,
//! and the controller owns the single instance.

use crate::queue;
use crate::track::Track;
use bridge_traits::EngineStatus;
use serde::Serialize;
use tokio::sync::watch;

/// Snapshot of what is playing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSession {
    /// Always an entry of `queue` when set.
    pub current_track: Option<Track>,
    pub queue: Vec<Track>,
    /// Last status reported by the engine.
    pub engine_status: EngineStatus,
    pub playback_rate: f32,
    /// Why engine setup failed, if it did. Controls stay disabled while set.
    pub engine_fault: Option<String>,
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self {
            current_track: None,
            queue: Vec::new(),
            engine_status: EngineStatus::Uninitialized,
            playback_rate: 1.0,
            engine_fault: None,
        }
    }
}

impl PlaybackSession {
    pub fn is_ready(&self) -> bool {
        !matches!(
            self.engine_status,
            EngineStatus::Uninitialized | EngineStatus::Idle
        )
    }

    pub fn is_playing(&self) -> bool {
        self.engine_status == EngineStatus::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.engine_status == EngineStatus::Paused
    }

    pub fn is_busy(&self) -> bool {
        self.engine_status.is_busy()
    }

    pub fn current_index(&self) -> Option<usize> {
        let current = self.current_track.as_ref()?;
        queue::index_of(&self.queue, &current.id)
    }

    pub fn can_skip_next(&self) -> bool {
        self.controls_enabled()
            && self
                .current_index()
                .is_some_and(|index| index + 1 < self.queue.len())
    }

    pub fn can_skip_previous(&self) -> bool {
        self.controls_enabled() && self.current_index().is_some_and(|index| index > 0)
    }

    pub fn controls_enabled(&self) -> bool {
        self.engine_fault.is_none()
    }

    pub fn is_current(&self, track_id: &str) -> bool {
        self.current_track
            .as_ref()
            .is_some_and(|track| track.id == track_id)
    }
}

/// Read-only handle on the playback session.
#[derive(Debug, Clone)]
pub struct PlaybackStore {
    receiver: watch::Receiver<PlaybackSession>,
}

impl PlaybackStore {
    /// Creates the store and its single writer.
    pub fn new() -> (PlaybackStore, StoreWriter) {
        let (sender, receiver) = watch::channel(PlaybackSession::default());
        (PlaybackStore { receiver }, StoreWriter { sender })
    }

    pub fn snapshot(&self) -> PlaybackSession {
        self.receiver.borrow().clone()
    }

    /// Receiver that is notified after every change.
    pub fn watch(&self) -> watch::Receiver<PlaybackSession> {
        self.receiver.clone()
    }
}

/// Write side of the playback session.
#[derive(Debug)]
pub struct StoreWriter {
    sender: watch::Sender<PlaybackSession>,
}

impl StoreWriter {
    pub fn snapshot(&self) -> PlaybackSession {
        self.sender.borrow().clone()
    }

    /// Returns `true` if the status changed.
    pub fn set_status(&self, status: EngineStatus) -> bool {
        self.sender.send_if_modified(|session| {
            if session.engine_status == status {
                return false;
            }
            session.engine_status = status;
            true
        })
    }

    /// Replaces the queue and moves to `current`.
    ///
    /// Rejected (returns `false`) if `current` is not part of `queue` or the
    /// queue holds duplicate ids.
    pub fn replace_queue(&self, queue: Vec<Track>, current: Option<Track>) -> bool {
        if !queue::has_unique_ids(&queue) {
            return false;
        }
        if let Some(track) = &current {
            if queue::index_of(&queue, &track.id).is_none() {
                return false;
            }
        }

        self.sender.send_modify(|session| {
            session.queue = queue;
            session.current_track = current;
        });
        true
    }

    /// Moves to the queue entry with `track_id`. Returns the new current track
    /// if it changed.
    pub fn set_current_track(&self, track_id: &str) -> Option<Track> {
        let mut changed = None;
        self.sender.send_if_modified(|session| {
            if session.is_current(track_id) {
                return false;
            }
            let Some(index) = queue::index_of(&session.queue, track_id) else {
                return false;
            };
            let track = session.queue[index].clone();
            session.current_track = Some(track.clone());
            changed = Some(track);
            true
        });
        changed
    }

    /// Appends tracks whose ids are not queued yet. Returns how many were added.
    pub fn append(&self, tracks: Vec<Track>) -> usize {
        let mut added = 0;
        self.sender.send_if_modified(|session| {
            let fresh = queue::new_entries(&session.queue, tracks);
            added = fresh.len();
            session.queue.extend(fresh);
            added > 0
        });
        added
    }

    pub fn set_rate(&self, rate: f32) -> bool {
        self.sender.send_if_modified(|session| {
            if session.playback_rate == rate {
                return false;
            }
            session.playback_rate = rate;
            true
        })
    }

    pub fn set_engine_fault(&self, fault: Option<String>) -> bool {
        self.sender.send_if_modified(|session| {
            if session.engine_fault == fault {
                return false;
            }
            session.engine_fault = fault;
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracks(ids: &[&str]) -> Vec<Track> {
        ids.iter()
            .map(|id| Track::new(*id, format!("Track {}", id), format!("https://cdn/{}.mp3", id)))
            .collect()
    }

    #[test]
    fn fresh_session_is_empty_and_inert() {
        let (store, _writer) = PlaybackStore::new();
        let session = store.snapshot();
        assert!(session.current_track.is_none());
        assert_eq!(session.engine_status, EngineStatus::Uninitialized);
        assert_eq!(session.playback_rate, 1.0);
        assert!(!session.is_ready());
        assert!(!session.can_skip_next());
    }

    #[test]
    fn replace_queue_rejects_foreign_current_track() {
        let (store, writer) = PlaybackStore::new();
        let queue = tracks(&["a", "b"]);
        let stranger = tracks(&["z"]).remove(0);

        assert!(!writer.replace_queue(queue.clone(), Some(stranger)));
        assert!(store.snapshot().queue.is_empty());

        assert!(writer.replace_queue(queue.clone(), Some(queue[1].clone())));
        assert_eq!(store.snapshot().current_index(), Some(1));
    }

    #[test]
    fn replace_queue_rejects_duplicate_ids() {
        let (_store, writer) = PlaybackStore::new();
        assert!(!writer.replace_queue(tracks(&["a", "a"]), None));
    }

    #[test]
    fn set_current_track_requires_queued_id() {
        let (store, writer) = PlaybackStore::new();
        let queue = tracks(&["a", "b", "c"]);
        writer.replace_queue(queue.clone(), Some(queue[0].clone()));

        assert!(writer.set_current_track("z").is_none());
        assert_eq!(writer.set_current_track("c").map(|t| t.id), Some("c".to_string()));
        assert!(writer.set_current_track("c").is_none());
        assert!(store.snapshot().is_current("c"));
    }

    #[test]
    fn skip_flags_follow_position() {
        let (store, writer) = PlaybackStore::new();
        let queue = tracks(&["a", "b", "c"]);
        writer.replace_queue(queue.clone(), Some(queue[0].clone()));

        let session = store.snapshot();
        assert!(session.can_skip_next());
        assert!(!session.can_skip_previous());

        writer.set_current_track("c");
        let session = store.snapshot();
        assert!(!session.can_skip_next());
        assert!(session.can_skip_previous());
    }

    #[test]
    fn engine_fault_disables_controls() {
        let (store, writer) = PlaybackStore::new();
        let queue = tracks(&["a", "b"]);
        writer.replace_queue(queue.clone(), Some(queue[0].clone()));
        writer.set_engine_fault(Some("audio session denied".to_string()));

        let session = store.snapshot();
        assert!(!session.controls_enabled());
        assert!(!session.can_skip_next());
    }

    #[test]
    fn status_flags() {
        let (store, writer) = PlaybackStore::new();
        assert!(writer.set_status(EngineStatus::Buffering));
        assert!(!writer.set_status(EngineStatus::Buffering));
        assert!(store.snapshot().is_busy());

        writer.set_status(EngineStatus::Paused);
        let session = store.snapshot();
        assert!(session.is_ready());
        assert!(session.is_paused());
        assert!(!session.is_playing());
    }

    #[test]
    fn append_skips_known_ids() {
        let (store, writer) = PlaybackStore::new();
        writer.replace_queue(tracks(&["a"]), None);
        assert_eq!(writer.append(tracks(&["a", "b"])), 1);
        assert_eq!(writer.append(tracks(&["b"])), 0);
        assert_eq!(store.snapshot().queue.len(), 2);
    }

    #[tokio::test]
    async fn watchers_see_changes() {
        let (store, writer) = PlaybackStore::new();
        let mut watcher = store.watch();

        writer.set_status(EngineStatus::Playing);
        watcher.changed().await.unwrap();
        assert!(watcher.borrow().is_playing());
    }
}
