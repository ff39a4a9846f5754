//! Keyed favorite cache with optimistic entries.

use parking_lot::Mutex;
use std::collections::HashMap;

/// Cached favorite flag for one track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteState {
    /// Agrees with the last server answer.
    Synced(bool),
    /// A toggle is in flight; `previous` is restored if it fails.
    Pending { optimistic: bool, previous: bool },
}

impl FavoriteState {
    /// Value to display.
    pub fn is_favorite(&self) -> bool {
        match *self {
            FavoriteState::Synced(value) => value,
            FavoriteState::Pending { optimistic, .. } => optimistic,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, FavoriteState::Pending { .. })
    }
}

/// Each entry moves `Synced -> Pending -> Synced`; while an entry is
/// `Pending` no second toggle can start for that id.
#[derive(Debug, Default)]
pub struct FavoriteCache {
    entries: Mutex<HashMap<String, FavoriteState>>,
}

impl FavoriteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, track_id: &str) -> Option<FavoriteState> {
        self.entries.lock().get(track_id).copied()
    }

    pub fn is_favorite(&self, track_id: &str) -> Option<bool> {
        self.get(track_id).map(|state| state.is_favorite())
    }

    /// Flips the entry optimistically. Unknown ids start from `false`.
    /// Returns the optimistic value, or `None` if a toggle is already pending.
    pub fn begin_toggle(&self, track_id: &str) -> Option<bool> {
        let mut entries = self.entries.lock();
        let previous = match entries.get(track_id) {
            Some(FavoriteState::Pending { .. }) => return None,
            Some(FavoriteState::Synced(value)) => *value,
            None => false,
        };
        let optimistic = !previous;
        entries.insert(
            track_id.to_string(),
            FavoriteState::Pending {
                optimistic,
                previous,
            },
        );
        Some(optimistic)
    }

    /// Keeps the optimistic value. Returns it, or `None` if nothing was pending.
    pub fn commit(&self, track_id: &str) -> Option<bool> {
        let mut entries = self.entries.lock();
        let entry = entries.get_mut(track_id)?;
        match *entry {
            FavoriteState::Pending { optimistic, .. } => {
                *entry = FavoriteState::Synced(optimistic);
                Some(optimistic)
            }
            FavoriteState::Synced(_) => None,
        }
    }

    /// Restores the pre-toggle value. Returns it, or `None` if nothing was pending.
    pub fn rollback(&self, track_id: &str) -> Option<bool> {
        let mut entries = self.entries.lock();
        let entry = entries.get_mut(track_id)?;
        match *entry {
            FavoriteState::Pending { previous, .. } => {
                *entry = FavoriteState::Synced(previous);
                Some(previous)
            }
            FavoriteState::Synced(_) => None,
        }
    }

    /// Stores a server answer unless a toggle is pending for the id.
    /// Returns `true` if the displayed value changed.
    pub fn seed(&self, track_id: &str, value: bool) -> bool {
        let mut entries = self.entries.lock();
        match entries.get(track_id) {
            Some(FavoriteState::Pending { .. }) => false,
            Some(FavoriteState::Synced(current)) if *current == value => false,
            _ => {
                entries.insert(track_id.to_string(), FavoriteState::Synced(value));
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drops every synced entry, keeping pending toggles.
    pub fn clear_synced(&self) {
        self.entries.lock().retain(|_, state| state.is_pending());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_lifecycle() {
        let cache = FavoriteCache::new();
        assert_eq!(cache.begin_toggle("a"), Some(true));
        assert_eq!(
            cache.get("a"),
            Some(FavoriteState::Pending {
                optimistic: true,
                previous: false
            })
        );
        assert_eq!(cache.begin_toggle("a"), None);
        assert_eq!(cache.commit("a"), Some(true));
        assert_eq!(cache.get("a"), Some(FavoriteState::Synced(true)));
        assert_eq!(cache.commit("a"), None);
    }

    #[test]
    fn test_rollback_restores_previous() {
        let cache = FavoriteCache::new();
        cache.seed("a", true);
        assert_eq!(cache.begin_toggle("a"), Some(false));
        assert_eq!(cache.is_favorite("a"), Some(false));
        assert_eq!(cache.rollback("a"), Some(true));
        assert_eq!(cache.get("a"), Some(FavoriteState::Synced(true)));
    }

    #[test]
    fn test_seed_never_overwrites_pending() {
        let cache = FavoriteCache::new();
        cache.begin_toggle("a");
        assert!(!cache.seed("a", false));
        assert!(cache.get("a").is_some_and(|s| s.is_pending()));

        assert!(cache.seed("b", false));
        assert!(!cache.seed("b", false));
        assert!(cache.seed("b", true));
    }

    #[test]
    fn test_keys_are_independent() {
        let cache = FavoriteCache::new();
        assert_eq!(cache.begin_toggle("a"), Some(true));
        assert_eq!(cache.begin_toggle("b"), Some(true));
        cache.rollback("a");
        assert_eq!(cache.is_favorite("a"), Some(false));
        assert!(cache.get("b").is_some_and(|s| s.is_pending()));

        cache.clear_synced();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a"), None);
    }
}
