//! Nearest-timestamp selection.

use super::entry::TimeIndexEntry;
use shared_types::Timestamp;

/// Pick the entry closest to `target`.
///
/// Smallest absolute difference wins; on a tie the larger height wins.
pub fn nearest(candidates: &[TimeIndexEntry], target: Timestamp) -> Option<&TimeIndexEntry> {
    candidates.iter().min_by(|a, b| {
        a.timestamp
            .abs_diff(target)
            .cmp(&b.timestamp.abs_diff(target))
            .then_with(|| b.height.cmp(&a.height))
    })
}

/// Inclusive scan window `[target - buffer, target + buffer]`.
pub fn scan_window(target: Timestamp, buffer: u64) -> (Timestamp, Timestamp) {
    (target.saturating_sub(buffer), target.saturating_add(buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::SourceId;

    fn entry(timestamp: Timestamp, height: u64) -> TimeIndexEntry {
        TimeIndexEntry::new(timestamp, height, SourceId::new("s"))
    }

    #[test]
    fn test_closest_wins() {
        let entries = vec![entry(900, 9), entry(1_020, 10), entry(1_100, 11)];
        assert_eq!(nearest(&entries, 1_000).map(|e| e.height), Some(10));
    }

    #[test]
    fn test_tie_prefers_larger_height() {
        let entries = vec![entry(990, 9), entry(1_010, 10)];
        assert_eq!(nearest(&entries, 1_000).map(|e| e.height), Some(10));

        let reversed = vec![entry(1_010, 10), entry(990, 9)];
        assert_eq!(nearest(&reversed, 1_000).map(|e| e.height), Some(10));
    }

    #[test]
    fn test_empty_candidates() {
        assert!(nearest(&[], 1_000).is_none());
    }

    #[test]
    fn test_scan_window_saturates() {
        assert_eq!(scan_window(5, 10_000), (0, 10_005));
        assert_eq!(scan_window(u64::MAX - 1, 10), (u64::MAX - 11, u64::MAX));
    }
}
