//! Queue identity helpers.

use crate::track::Track;
use std::collections::HashSet;

/// Returns `true` if both queues hold the same ids in the same order.
///
/// Deciding between "reposition inside the current queue" and "replace the
/// whole engine queue" goes through this function only.
pub fn same_queue(a: &[Track], b: &[Track]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(left, right)| left.id == right.id)
}

/// Position of `track_id` in `queue`.
pub fn index_of(queue: &[Track], track_id: &str) -> Option<usize> {
    queue.iter().position(|track| track.id == track_id)
}

/// Returns `true` if no id appears twice.
pub fn has_unique_ids(queue: &[Track]) -> bool {
    let mut seen = HashSet::with_capacity(queue.len());
    queue.iter().all(|track| seen.insert(track.id.as_str()))
}

/// Tracks from `incoming` whose ids are neither in `queue` nor repeated earlier in `incoming`.
pub fn new_entries(queue: &[Track], incoming: Vec<Track>) -> Vec<Track> {
    let mut seen: HashSet<String> = queue.iter().map(|track| track.id.clone()).collect();
    incoming
        .into_iter()
        .filter(|track| seen.insert(track.id.clone()))
        .collect()
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
    fn identical_ids_are_the_same_queue() {
        let mut other = tracks(&["a", "b", "c"]);
        other[1].title = "Renamed".to_string();
        assert!(same_queue(&tracks(&["a", "b", "c"]), &other));
    }

    #[test]
    fn order_and_length_matter() {
        assert!(!same_queue(&tracks(&["a", "b", "c"]), &tracks(&["a", "c", "b"])));
        assert!(!same_queue(&tracks(&["a", "b"]), &tracks(&["a", "b", "c"])));
        assert!(same_queue(&[], &[]));
    }

    #[test]
    fn index_lookup() {
        let queue = tracks(&["a", "b", "c"]);
        assert_eq!(index_of(&queue, "c"), Some(2));
        assert_eq!(index_of(&queue, "z"), None);
    }

    #[test]
    fn duplicate_detection() {
        assert!(has_unique_ids(&tracks(&["a", "b"])));
        assert!(!has_unique_ids(&tracks(&["a", "b", "a"])));
    }

    #[test]
    fn new_entries_skip_known_ids() {
        let queue = tracks(&["a", "b"]);
        let added = new_entries(&queue, tracks(&["b", "c", "c", "d"]));
        let ids: Vec<&str> = added.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d"]);
    }
}
