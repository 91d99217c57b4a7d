//! Bounded-size, descending-by-size "biggest changes" tracker.

use serde::{Deserialize, Serialize};

use crate::fs::Revnum;

/// One entry in a [`LargestChanges`] list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    /// Size of the change, in bytes (the representation's on-disk size).
    pub size: u64,
    /// Revision the change occurred in.
    pub revision: Revnum,
    /// Repository path of the changed node.
    pub path: String,
}

/// A fixed-capacity, descending-by-size list of the largest changes seen.
///
/// The engine uses a capacity of 64. `changes` is pre-filled with
/// `capacity` size-`0` placeholder entries and stays at exactly that
/// length for its whole lifetime — every insert replaces the tail and
/// bubbles it into place, there is no separate "not yet full" growth
/// phase. This matters because `min_size` (the size of the current tail)
/// only becomes a real size once `capacity` real changes have displaced
/// every placeholder; until then it reads `0`, so real zero-size changes
/// are the only thing ever rejected (by the initial `min_size = 1`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LargestChanges {
    capacity: usize,
    /// Entries, kept sorted descending by `size`, always `capacity` long.
    pub changes: Vec<ChangeEntry>,
    /// Size of the current tail entry. Starts at `1` (so a zero-size
    /// change is never recorded), then tracks the smallest entry still in
    /// the list — including placeholder zeros before the list has
    /// accumulated `capacity` real changes.
    pub min_size: u64,
}

impl LargestChanges {
    /// Creates a tracker with room for `capacity` entries, pre-filled with
    /// `capacity` size-`0` placeholders.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            changes: vec![
                ChangeEntry {
                    size: 0,
                    revision: 0,
                    path: String::new(),
                };
                capacity
            ],
            min_size: 1,
        }
    }

    /// Considers `(size, revision, path)` for inclusion in the list,
    /// replacing the current tail (smallest entry, whether a placeholder
    /// or a real change) if `size` is large enough to beat it.
    pub fn insert(&mut self, size: u64, revision: Revnum, path: impl Into<String>) {
        if self.capacity == 0 || size < self.min_size {
            return;
        }
        let entry = ChangeEntry {
            size,
            revision,
            path: path.into(),
        };
        let last = self.changes.len() - 1;
        self.changes[last] = entry;
        let mut i = last;
        while i > 0 && self.changes[i - 1].size < self.changes[i].size {
            self.changes.swap(i - 1, i);
            i -= 1;
        }
        self.min_size = self.changes.last().map(|e| e.size).unwrap_or(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_sorted_descending_and_bounded() {
        let mut lc = LargestChanges::new(4);
        for (i, size) in [5u64, 1, 9, 3, 7, 2, 100, 4].into_iter().enumerate() {
            lc.insert(size, i as u64, format!("/p{i}"));
        }
        let sizes: Vec<u64> = lc.changes.iter().map(|e| e.size).collect();
        assert_eq!(sizes, vec![100, 9, 7, 5]);
        assert_eq!(lc.changes.len(), 4);
        assert_eq!(lc.min_size, lc.changes.last().unwrap().size);
    }

    #[test]
    fn discards_sizes_below_min() {
        let mut lc = LargestChanges::new(2);
        lc.insert(10, 1, "/a");
        lc.insert(20, 2, "/b");
        assert_eq!(lc.min_size, 10);
        lc.insert(5, 3, "/c");
        assert_eq!(lc.changes.len(), 2, "smaller-than-min entry must be dropped");
        assert_eq!(lc.changes[0].size, 20);
        assert_eq!(lc.changes[1].size, 10);
    }

    #[test]
    fn zero_size_never_recorded() {
        let mut lc = LargestChanges::new(4);
        lc.insert(0, 1, "/empty");
        assert!(lc.changes.iter().all(|e| e.size == 0 && e.path.is_empty()));
    }

    #[test]
    fn list_is_always_full_even_with_few_real_changes() {
        let mut lc = LargestChanges::new(4);
        lc.insert(10, 1, "/a");
        assert_eq!(lc.changes.len(), 4);
        assert_eq!(lc.changes[0].size, 10);
        assert!(lc.changes[1..].iter().all(|e| e.size == 0));
        assert_eq!(lc.min_size, 0, "tail is still a zero placeholder");
    }
}
