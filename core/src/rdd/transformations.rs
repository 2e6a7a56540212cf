//! RDD transformation implementations.
//!
//! Narrow transformations are all expressed through `MapPartitionsRdd`;
//! key-based aggregations go through a `ShuffledRdd`.

use crate::rdd::{Rdd, ShuffledRdd};
use crate::shuffle::{Aggregator, CountAggregator, HashPartitioner, Partitioner, ReduceAggregator};
use crate::traits::{Data, Dependency, Partition, RddBase, RddResult};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// Function applied to the iterator of one partition
pub type PartitionFn<T, U> =
    Arc<dyn Fn(Box<dyn Iterator<Item = T>>) -> Box<dyn Iterator<Item = U>> + Send + Sync>;

/// RDD that applies a function to every partition of its parent
pub struct MapPartitionsRdd<T: Data, U: Data> {
    id: usize,
    parent: Arc<dyn RddBase<Item = T>>,
    func: PartitionFn<T, U>,
}

impl<T: Data, U: Data> MapPartitionsRdd<T, U> {
    pub fn new(id: usize, parent: Arc<dyn RddBase<Item = T>>, func: PartitionFn<T, U>) -> Self {
        Self { id, parent, func }
    }
}

impl<T: Data, U: Data> Debug for MapPartitionsRdd<T, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapPartitionsRdd")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("func", &"<partition_function>")
            .finish()
    }
}

impl<T: Data, U: Data> RddBase for MapPartitionsRdd<T, U> {
    type Item = U;

    fn id(&self) -> usize {
        self.id
    }

    fn num_partitions(&self) -> usize {
        self.parent.num_partitions()
    }

    fn partitions(&self) -> Vec<Arc<dyn Partition>> {
        self.parent.partitions()
    }

    fn compute(&self, partition: &dyn Partition) -> RddResult<Box<dyn Iterator<Item = U>>> {
        let parent_iter = self.parent.compute(partition)?;
        Ok((self.func)(parent_iter))
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::Narrow {
            parent_id: self.parent.id(),
        }]
    }

    fn prepare_stages(&self, scheduler: &crate::scheduler::LocalScheduler) -> RddResult<()> {
        self.parent.prepare_stages(scheduler)
    }
}

impl<T: Data> Rdd<T> {
    /// Apply `f` to each partition's iterator.
    pub fn map_partitions<U, F>(&self, f: F) -> Rdd<U>
    where
        U: Data,
        F: Fn(Box<dyn Iterator<Item = T>>) -> Box<dyn Iterator<Item = U>> + Send + Sync + 'static,
    {
        let id = self.context().new_rdd_id();
        let rdd = MapPartitionsRdd::new(id, self.base(), Arc::new(f));
        Rdd::new(self.context().clone(), Arc::new(rdd))
    }

    /// Apply a map transformation to this RDD
    pub fn map<U, F>(&self, f: F) -> Rdd<U>
    where
        U: Data,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.map_partitions(move |iter| {
            let f = f.clone();
            Box::new(iter.map(move |item| f(item))) as Box<dyn Iterator<Item = U>>
        })
    }

    /// Map every element to zero or more elements and flatten the result
    pub fn flat_map<U, I, F>(&self, f: F) -> Rdd<U>
    where
        U: Data,
        I: IntoIterator<Item = U> + 'static,
        I::IntoIter: 'static,
        F: Fn(T) -> I + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.map_partitions(move |iter| {
            let f = f.clone();
            Box::new(iter.flat_map(move |item| f(item))) as Box<dyn Iterator<Item = U>>
        })
    }

    /// Apply a filter transformation to this RDD
    pub fn filter<F>(&self, predicate: F) -> Rdd<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        self.map_partitions(move |iter| {
            let predicate = predicate.clone();
            Box::new(iter.filter(move |item| predicate(item))) as Box<dyn Iterator<Item = T>>
        })
    }
}

/// An extension trait for RDDs of key-value pairs.
pub trait PairRdd<K: Data, V: Data> {
    /// Merges the values of each key with `reduce_func`, using a hash
    /// partitioner with the context's default parallelism.
    /// This is a wide transformation that triggers a shuffle.
    fn reduce_by_key<F>(&self, reduce_func: F) -> Rdd<(K, V)>
    where
        F: Fn(V, V) -> V + Send + Sync + 'static;

    /// Same as `reduce_by_key` with an explicit partitioner.
    fn reduce_by_key_with<F>(
        &self,
        reduce_func: F,
        partitioner: Arc<dyn Partitioner<K>>,
    ) -> Rdd<(K, V)>
    where
        F: Fn(V, V) -> V + Send + Sync + 'static;

    /// Combine values with the same key using a custom aggregator.
    fn combine_by_key<C: Data>(
        &self,
        aggregator: Arc<dyn Aggregator<K, V, C>>,
        partitioner: Arc<dyn Partitioner<K>>,
    ) -> Rdd<(K, C)>;

    /// Counts the elements of each key and returns the counts to the driver.
    fn count_by_key(&self) -> RddResult<HashMap<K, u64>>;

    /// Returns the pairs to the driver as a map. When a key occurs more than
    /// once the value from the last partition wins.
    fn collect_as_map(&self) -> RddResult<HashMap<K, V>>;
}

impl<K, V> PairRdd<K, V> for Rdd<(K, V)>
where
    K: Data + Hash + Eq,
    V: Data,
{
    fn reduce_by_key<F>(&self, reduce_func: F) -> Rdd<(K, V)>
    where
        F: Fn(V, V) -> V + Send + Sync + 'static,
    {
        let partitions = self.context().default_shuffle_partitions();
        self.reduce_by_key_with(reduce_func, Arc::new(HashPartitioner::new(partitions)))
    }

    fn reduce_by_key_with<F>(
        &self,
        reduce_func: F,
        partitioner: Arc<dyn Partitioner<K>>,
    ) -> Rdd<(K, V)>
    where
        F: Fn(V, V) -> V + Send + Sync + 'static,
    {
        self.combine_by_key::<V>(Arc::new(ReduceAggregator::new(reduce_func)), partitioner)
    }

    fn combine_by_key<C: Data>(
        &self,
        aggregator: Arc<dyn Aggregator<K, V, C>>,
        partitioner: Arc<dyn Partitioner<K>>,
    ) -> Rdd<(K, C)> {
        let context = self.context();
        let rdd = ShuffledRdd::new(
            context.new_rdd_id(),
            context.new_shuffle_id(),
            self.base(),
            aggregator,
            partitioner,
        );
        Rdd::new(context.clone(), Arc::new(rdd))
    }

    fn count_by_key(&self) -> RddResult<HashMap<K, u64>> {
        let partitions = self.context().default_shuffle_partitions();
        self.combine_by_key::<u64>(
            Arc::new(CountAggregator::<V>::new()),
            Arc::new(HashPartitioner::new(partitions)),
        )
        .collect_as_map()
    }

    fn collect_as_map(&self) -> RddResult<HashMap<K, V>> {
        Ok(self.collect()?.into_iter().collect())
    }
}
