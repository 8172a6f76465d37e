//! Bucket sizing and placement strategies
//!
//! A BHD header is a hash table of fixed-average-size chains. The bucket
//! count is chosen from the total file count and every entry lands in the
//! bucket its hash selects. Both choices are pluggable one-method
//! strategies so alternate table shapes can be swapped in without touching
//! the packer.

use std::sync::Arc;

/// Chooses the number of buckets for a given file count.
pub trait BucketCountStrategy: Send + Sync {
    fn bucket_count(&self, total_files: usize) -> usize;
}

/// Chooses the bucket an entry hash belongs to.
pub trait BucketIndexStrategy: Send + Sync {
    fn bucket_index(&self, hash: u64, bucket_count: usize) -> usize;
}

/// `true` if `n` is prime, by trial division up to the square root.
fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n == 2 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut i = 3;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 2;
    }
    true
}

/// The smallest prime greater than or equal to `n`.
pub fn next_prime(n: u64) -> u64 {
    let mut candidate = n;
    loop {
        if is_prime(candidate) {
            return candidate;
        }
        candidate += 1;
    }
}

/// Default count strategy: the next prime at or above
/// `total_files / distribution`.
///
/// A prime modulus spreads clustered hashes; the distribution factor sets
/// the average chain length.
#[derive(Debug, Clone, Copy)]
pub struct DistributionCount {
    pub distribution: usize,
}

impl Default for DistributionCount {
    fn default() -> Self {
        Self { distribution: 7 }
    }
}

impl BucketCountStrategy for DistributionCount {
    fn bucket_count(&self, total_files: usize) -> usize {
        next_prime((total_files / self.distribution) as u64) as usize
    }
}

/// Default index strategy: `hash mod bucket_count`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModulusIndex;

impl BucketIndexStrategy for ModulusIndex {
    fn bucket_index(&self, hash: u64, bucket_count: usize) -> usize {
        (hash % bucket_count as u64) as usize
    }
}

/// The strategy pair an archive carries.
#[derive(Clone)]
pub struct BucketInfo {
    count: Arc<dyn BucketCountStrategy>,
    index: Arc<dyn BucketIndexStrategy>,
}

impl BucketInfo {
    pub fn new(
        count: Arc<dyn BucketCountStrategy>,
        index: Arc<dyn BucketIndexStrategy>,
    ) -> Self {
        Self { count, index }
    }

    /// Default strategies with a non-default distribution factor.
    pub fn with_distribution(distribution: usize) -> Self {
        Self::new(
            Arc::new(DistributionCount { distribution }),
            Arc::new(ModulusIndex),
        )
    }

    pub fn bucket_count(&self, total_files: usize) -> usize {
        self.count.bucket_count(total_files)
    }

    pub fn bucket_index(&self, hash: u64, bucket_count: usize) -> usize {
        self.index.bucket_index(hash, bucket_count)
    }
}

impl Default for BucketInfo {
    fn default() -> Self {
        Self::new(Arc::new(DistributionCount::default()), Arc::new(ModulusIndex))
    }
}

impl std::fmt::Debug for BucketInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketInfo").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_prime() {
        assert_eq!(next_prime(0), 2);
        assert_eq!(next_prime(1), 2);
        assert_eq!(next_prime(2), 2);
        assert_eq!(next_prime(4), 5);
        assert_eq!(next_prime(10), 11);
        assert_eq!(next_prime(14), 17);
        assert_eq!(next_prime(142), 149);
    }

    #[test]
    fn test_distribution_count() {
        let strategy = DistributionCount::default();
        assert_eq!(strategy.bucket_count(100), 17);
        assert_eq!(strategy.bucket_count(1000), 149);
        // Count is always at least 2, even for empty archives.
        assert_eq!(strategy.bucket_count(0), 2);
    }

    #[test]
    fn test_modulus_index_in_range() {
        let strategy = ModulusIndex;
        for hash in [0u64, 1, 16, 17, 12345, u32::MAX as u64, u64::MAX] {
            let index = strategy.bucket_index(hash, 17);
            assert!(index < 17, "hash {hash} mapped to {index}");
        }
    }

    #[test]
    fn test_bucket_info_defaults() {
        let info = BucketInfo::default();
        let count = info.bucket_count(100);
        assert_eq!(count, 17);
        assert!(info.bucket_index(u64::MAX, count) < count);
    }
}
