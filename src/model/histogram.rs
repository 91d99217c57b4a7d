//! Fixed-width bucketed size counters.

use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;

/// Number of buckets in a [`Histogram`]. Bucket `k` holds sizes `s` with
/// `2^(k-1) <= s < 2^k` (bucket `0` holds only `s == 0`).
pub const BUCKET_COUNT: usize = 64;

/// Count and byte-sum accumulator, either for one bucket or as the
/// histogram-wide total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Number of values folded into this bucket.
    pub count: u64,
    /// Sum of the values folded into this bucket.
    pub sum: u64,
}

impl Bucket {
    fn add(&mut self, size: u64) {
        self.count += 1;
        self.sum += size;
    }
}

/// A log2-bucketed histogram of sizes.
///
/// Bucket index for size `s` is the smallest `k` such that `2^k > s`: `s =
/// 0` lands in bucket `0`, and in general bucket `k` covers `[2^(k-1),
/// 2^k)`. This is `s.bit_length()` in the usual sense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Histogram {
    /// Per-bucket counters.
    #[serde(with = "BigArray")]
    pub buckets: [Bucket; BUCKET_COUNT],
    /// Sum over all buckets, maintained incrementally.
    pub total: Bucket,
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            buckets: [Bucket::default(); BUCKET_COUNT],
            total: Bucket::default(),
        }
    }
}

impl Histogram {
    /// Creates an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// The bucket index size `s` falls into: the smallest `k` with
    /// `2^k > s`.
    pub fn bucket_index(size: u64) -> usize {
        if size == 0 {
            0
        } else {
            let k = 64 - size.leading_zeros() as usize;
            k.min(BUCKET_COUNT - 1)
        }
    }

    /// Adds `size` to the histogram, updating both its bucket and the
    /// running total.
    pub fn add(&mut self, size: u64) {
        let idx = Self::bucket_index(size);
        self.buckets[idx].add(size);
        self.total.add(size);
    }
}
