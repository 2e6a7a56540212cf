//! Defines partitioners for distributing data in a shuffle.

use std::fmt::Debug;
use std::hash::{DefaultHasher, Hash, Hasher};

/// Decides which reduce partition a key is sent to.
pub trait Partitioner<K>: Send + Sync + Debug {
    /// Number of output partitions
    fn num_partitions(&self) -> u32;

    /// Partition index for `key`, always below `num_partitions()`
    fn get_partition(&self, key: &K) -> u32;
}

/// A partitioner that uses the hash of the key to distribute data.
///
/// `DefaultHasher::new()` uses fixed keys, so the same key maps to the same
/// partition across runs.
#[derive(Clone, Debug)]
pub struct HashPartitioner {
    num_partitions: u32,
    seed: u64,
}

impl HashPartitioner {
    pub fn new(num_partitions: u32) -> Self {
        assert!(num_partitions > 0, "Number of partitions must be positive.");
        Self {
            num_partitions,
            seed: 0,
        }
    }

    pub fn with_seed(num_partitions: u32, seed: u64) -> Self {
        assert!(num_partitions > 0, "Number of partitions must be positive.");
        Self {
            num_partitions,
            seed,
        }
    }
}

impl<K: HashPartitionable> Partitioner<K> for HashPartitioner {
    fn num_partitions(&self) -> u32 {
        self.num_partitions
    }

    fn get_partition(&self, key: &K) -> u32 {
        key.get_partition_with_seed(self.num_partitions, self.seed)
    }
}

/// A specific partitioner for types that implement Hash
pub trait HashPartitionable: Hash + Send + Sync {
    fn get_partition(&self, num_partitions: u32) -> u32 {
        self.get_partition_with_seed(num_partitions, 0)
    }

    fn get_partition_with_seed(&self, num_partitions: u32, seed: u64) -> u32 {
        let mut s = DefaultHasher::new();
        seed.hash(&mut s);
        self.hash(&mut s);
        (s.finish() % num_partitions as u64) as u32
    }
}

impl<T: Hash + Send + Sync + ?Sized> HashPartitionable for T {}
