#![allow(missing_docs)]

use proptest::prelude::*;
use revstats::model::histogram::Histogram;
use revstats::model::largest_changes::LargestChanges;

proptest! {
    #[test]
    fn prop_histogram_bucket_never_drops_or_duplicates_a_sample(sizes in prop::collection::vec(0u64..1_000_000, 1..200)) {
        let mut h = Histogram::default();
        for &s in &sizes {
            h.add(s);
        }
        let bucketed: u64 = h.buckets.iter().map(|b| b.count).sum();
        prop_assert_eq!(bucketed, sizes.len() as u64);
        prop_assert_eq!(h.total.count, sizes.len() as u64);
        prop_assert_eq!(h.total.sum, sizes.iter().sum::<u64>());
    }

    #[test]
    fn prop_largest_changes_stays_sorted_descending_and_within_capacity(
        capacity in 1usize..16,
        sizes in prop::collection::vec(0u64..10_000, 0..200),
    ) {
        let mut lc = LargestChanges::new(capacity);
        for (i, &size) in sizes.iter().enumerate() {
            lc.insert(size, i as u64, format!("/p{i}"));
        }
        // The list is pre-filled with placeholders and always stays at
        // exactly `capacity` entries, real or not.
        prop_assert_eq!(lc.changes.len(), capacity);
        for pair in lc.changes.windows(2) {
            prop_assert!(pair[0].size >= pair[1].size);
        }
        if let Some(&max) = sizes.iter().max() {
            if max > 0 {
                prop_assert_eq!(lc.changes[0].size, max);
            }
        }
    }
}
