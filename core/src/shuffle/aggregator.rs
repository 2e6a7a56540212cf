//! Defines the Aggregator trait for combining values in shuffle operations.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// Aggregator trait for combining values for a key.
/// Used in operations like `reduce_by_key`, `count_by_key` and `combine_by_key`.
///
/// K: Key type
/// V: Input value type
/// C: Combiner (intermediate/output) type
pub trait Aggregator<K, V, C>: Send + Sync + Debug {
    /// Create a combiner from the first value for a key.
    fn create_combiner(&self, v: V) -> C;

    /// Merge a new value into an existing combiner.
    fn merge_value(&self, c: C, v: V) -> C;

    /// Merge two combiners.
    fn merge_combiners(&self, c1: C, c2: C) -> C;
}

/// Folds a stream of pairs into one combiner per key.
///
/// This is the map-side half of a shuffle; the reduce side merges the
/// resulting maps with `merge_combiners`.
pub fn combine_values_by_key<K, V, C, I>(
    aggregator: &dyn Aggregator<K, V, C>,
    pairs: I,
) -> HashMap<K, C>
where
    K: Hash + Eq,
    I: IntoIterator<Item = (K, V)>,
{
    let mut combiners: HashMap<K, C> = HashMap::new();
    for (key, value) in pairs {
        let combined = match combiners.remove(&key) {
            Some(c) => aggregator.merge_value(c, value),
            None => aggregator.create_combiner(value),
        };
        combiners.insert(key, combined);
    }
    combiners
}

/// Merges partial combiners into `target`.
pub fn merge_combiners_by_key<K, V, C, I>(
    aggregator: &dyn Aggregator<K, V, C>,
    target: &mut HashMap<K, C>,
    partials: I,
) where
    K: Hash + Eq,
    I: IntoIterator<Item = (K, C)>,
{
    for (key, partial) in partials {
        let merged = match target.remove(&key) {
            Some(existing) => aggregator.merge_combiners(existing, partial),
            None => partial,
        };
        target.insert(key, merged);
    }
}

/// Aggregator for `reduce_by_key`, where the combiner type is the value type
#[derive(Clone)]
pub struct ReduceAggregator<V> {
    reduce_func: Arc<dyn Fn(V, V) -> V + Send + Sync>,
}

impl<V> ReduceAggregator<V> {
    pub fn new<F>(reduce_func: F) -> Self
    where
        F: Fn(V, V) -> V + Send + Sync + 'static,
    {
        Self {
            reduce_func: Arc::new(reduce_func),
        }
    }
}

impl<V> Debug for ReduceAggregator<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReduceAggregator")
            .field("reduce_func", &"<reduce_function>")
            .finish()
    }
}

impl<K, V> Aggregator<K, V, V> for ReduceAggregator<V> {
    fn create_combiner(&self, v: V) -> V {
        v
    }

    fn merge_value(&self, c: V, v: V) -> V {
        (self.reduce_func)(c, v)
    }

    fn merge_combiners(&self, c1: V, c2: V) -> V {
        (self.reduce_func)(c1, c2)
    }
}

/// Sums the values of each key with `+`
#[derive(Clone)]
pub struct SumAggregator<V> {
    _phantom: std::marker::PhantomData<fn(V)>,
}

impl<V> SumAggregator<V> {
    pub fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<V> Debug for SumAggregator<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SumAggregator")
    }
}

impl<V> Default for SumAggregator<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Aggregator<K, V, V> for SumAggregator<V>
where
    V: std::ops::Add<Output = V>,
{
    fn create_combiner(&self, v: V) -> V {
        v
    }

    fn merge_value(&self, c: V, v: V) -> V {
        c + v
    }

    fn merge_combiners(&self, c1: V, c2: V) -> V {
        c1 + c2
    }
}

/// Count aggregator that counts the number of values per key
#[derive(Clone)]
pub struct CountAggregator<V> {
    _phantom: std::marker::PhantomData<fn(V)>,
}

impl<V> CountAggregator<V> {
    pub fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<V> Debug for CountAggregator<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CountAggregator")
    }
}

impl<V> Default for CountAggregator<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Aggregator<K, V, u64> for CountAggregator<V> {
    fn create_combiner(&self, _v: V) -> u64 {
        1
    }

    fn merge_value(&self, c: u64, _v: V) -> u64 {
        c + 1
    }

    fn merge_combiners(&self, c1: u64, c2: u64) -> u64 {
        c1 + c2
    }
}

/// Aggregator assembled from three closures, for `combine_by_key`
#[derive(Clone)]
pub struct CombineAggregator<V, C> {
    create_combiner: Arc<dyn Fn(V) -> C + Send + Sync>,
    merge_value: Arc<dyn Fn(C, V) -> C + Send + Sync>,
    merge_combiners: Arc<dyn Fn(C, C) -> C + Send + Sync>,
}

impl<V, C> CombineAggregator<V, C> {
    pub fn new<F, G, H>(create_combiner: F, merge_value: G, merge_combiners: H) -> Self
    where
        F: Fn(V) -> C + Send + Sync + 'static,
        G: Fn(C, V) -> C + Send + Sync + 'static,
        H: Fn(C, C) -> C + Send + Sync + 'static,
    {
        Self {
            create_combiner: Arc::new(create_combiner),
            merge_value: Arc::new(merge_value),
            merge_combiners: Arc::new(merge_combiners),
        }
    }
}

impl<V, C> Debug for CombineAggregator<V, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombineAggregator").finish_non_exhaustive()
    }
}

impl<K, V, C> Aggregator<K, V, C> for CombineAggregator<V, C> {
    fn create_combiner(&self, v: V) -> C {
        (self.create_combiner)(v)
    }

    fn merge_value(&self, c: C, v: V) -> C {
        (self.merge_value)(c, v)
    }

    fn merge_combiners(&self, c1: C, c2: C) -> C {
        (self.merge_combiners)(c1, c2)
    }
}
