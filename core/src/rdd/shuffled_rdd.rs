//! RDD that represents a shuffle dependency.

use crate::scheduler::{LocalScheduler, Task};
use crate::shuffle::{Aggregator, Partitioner, combine_values_by_key, merge_combiners_by_key};
use crate::traits::{Data, Dependency, Partition, RddBase, RddError, RddResult};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Map-side output of a shuffle, indexed as `[map_partition][reduce_partition]`.
type MapOutputs<K, C> = Arc<Vec<Vec<HashMap<K, C>>>>;

/// ShuffledRdd is an RDD that has a shuffle dependency on its parent.
/// It is the result of operations like `reduce_by_key` and `combine_by_key`.
///
/// K: Key type
/// V: Value type of the parent RDD
/// C: Combiner type (output value type)
pub struct ShuffledRdd<K: Data, V: Data, C: Data> {
    id: usize,
    shuffle_id: usize,
    parent: Arc<dyn RddBase<Item = (K, V)>>,
    aggregator: Arc<dyn Aggregator<K, V, C>>,
    partitioner: Arc<dyn Partitioner<K>>,
    map_outputs: Mutex<Option<MapOutputs<K, C>>>,
}

impl<K: Data, V: Data, C: Data> ShuffledRdd<K, V, C>
where
    K: Hash + Eq,
{
    pub fn new(
        id: usize,
        shuffle_id: usize,
        parent: Arc<dyn RddBase<Item = (K, V)>>,
        aggregator: Arc<dyn Aggregator<K, V, C>>,
        partitioner: Arc<dyn Partitioner<K>>,
    ) -> Self {
        Self {
            id,
            shuffle_id,
            parent,
            aggregator,
            partitioner,
            map_outputs: Mutex::new(None),
        }
    }

    pub fn shuffle_id(&self) -> usize {
        self.shuffle_id
    }

    fn outputs(&self) -> RddResult<Option<MapOutputs<K, C>>> {
        let guard = self
            .map_outputs
            .lock()
            .map_err(|_| RddError::ShuffleError(format!("Shuffle {} state poisoned", self.shuffle_id)))?;
        Ok(guard.clone())
    }

    /// Runs one map task per parent partition. Each task combines its values
    /// by key and buckets the combiners by reduce partition.
    fn run_map_stage(&self, scheduler: &LocalScheduler) -> RddResult<MapOutputs<K, C>> {
        let num_reducers = self.partitioner.num_partitions() as usize;
        let tasks: Vec<Task<Vec<HashMap<K, C>>>> = self
            .parent
            .partitions()
            .into_iter()
            .map(|partition| {
                let parent = self.parent.clone();
                let aggregator = self.aggregator.clone();
                let partitioner = self.partitioner.clone();
                Task::new(
                    partition,
                    Arc::new(move |p: &dyn Partition| -> RddResult<Vec<Vec<HashMap<K, C>>>> {
                        let combined = combine_values_by_key(aggregator.as_ref(), parent.compute(p)?);
                        let mut buckets: Vec<HashMap<K, C>> =
                            (0..num_reducers).map(|_| HashMap::new()).collect();
                        for (key, combiner) in combined {
                            let bucket = partitioner.get_partition(&key) as usize;
                            let target = buckets.get_mut(bucket).ok_or_else(|| {
                                RddError::ShuffleError(format!(
                                    "Partitioner returned {} for {} partitions",
                                    bucket, num_reducers
                                ))
                            })?;
                            target.insert(key, combiner);
                        }
                        Ok(vec![buckets])
                    }),
                )
            })
            .collect();

        debug!(
            "Running map stage of shuffle {} ({} map tasks, {} reduce partitions)",
            self.shuffle_id,
            tasks.len(),
            num_reducers
        );
        Ok(Arc::new(scheduler.execute_and_collect(tasks)?))
    }
}

impl<K: Data, V: Data, C: Data> Debug for ShuffledRdd<K, V, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShuffledRdd")
            .field("id", &self.id)
            .field("shuffle_id", &self.shuffle_id)
            .field("parent", &self.parent)
            .field("partitioner", &self.partitioner)
            .finish()
    }
}

impl<K: Data, V: Data, C: Data> RddBase for ShuffledRdd<K, V, C>
where
    K: Hash + Eq,
{
    type Item = (K, C);

    fn id(&self) -> usize {
        self.id
    }

    fn num_partitions(&self) -> usize {
        self.partitioner.num_partitions() as usize
    }

    fn compute(&self, partition: &dyn Partition) -> RddResult<Box<dyn Iterator<Item = (K, C)>>> {
        let partition_index = partition.index();
        if partition_index >= self.num_partitions() {
            return Err(RddError::InvalidPartition(partition_index));
        }

        let outputs = self.outputs()?.ok_or_else(|| {
            RddError::ShuffleError(format!(
                "Map outputs of shuffle {} are not available",
                self.shuffle_id
            ))
        })?;

        let mut merged: HashMap<K, C> = HashMap::new();
        for map_output in outputs.iter() {
            if let Some(bucket) = map_output.get(partition_index) {
                merge_combiners_by_key(
                    self.aggregator.as_ref(),
                    &mut merged,
                    bucket.iter().map(|(k, c)| (k.clone(), c.clone())),
                );
            }
        }

        Ok(Box::new(merged.into_iter()))
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::Shuffle {
            parent_id: self.parent.id(),
            shuffle_id: self.shuffle_id,
        }]
    }

    /// The map stage runs at most once; later jobs reuse its output.
    fn prepare_stages(&self, scheduler: &LocalScheduler) -> RddResult<()> {
        let mut guard = self
            .map_outputs
            .lock()
            .map_err(|_| RddError::ShuffleError(format!("Shuffle {} state poisoned", self.shuffle_id)))?;
        if guard.is_some() {
            return Ok(());
        }

        self.parent.prepare_stages(scheduler)?;
        *guard = Some(self.run_map_stage(scheduler)?);
        Ok(())
    }
}
