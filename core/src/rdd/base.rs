//! The `Rdd` handle and the source RDDs that read data into the engine.

use crate::context::FlowContext;
use crate::input::TextInput;
use crate::traits::{Data, Dependency, Partition, RddBase, RddError, RddResult};
use std::fmt::Debug;
use std::sync::Arc;

/// A handle to an RDD: its lineage plus the context that runs its jobs.
///
/// Transformations return new handles lazily; actions (see `actions.rs`)
/// schedule a job on the context.
pub struct Rdd<T: Data> {
    context: FlowContext,
    base: Arc<dyn RddBase<Item = T>>,
}

impl<T: Data> Rdd<T> {
    pub(crate) fn new(context: FlowContext, base: Arc<dyn RddBase<Item = T>>) -> Self {
        Self { context, base }
    }

    pub fn id(&self) -> usize {
        self.base.id()
    }

    pub fn num_partitions(&self) -> usize {
        self.base.num_partitions()
    }

    pub fn dependencies(&self) -> Vec<Dependency> {
        self.base.dependencies()
    }

    pub fn context(&self) -> &FlowContext {
        &self.context
    }

    /// The underlying lineage node
    pub fn base(&self) -> Arc<dyn RddBase<Item = T>> {
        self.base.clone()
    }
}

impl<T: Data> Clone for Rdd<T> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
            base: self.base.clone(),
        }
    }
}

impl<T: Data> Debug for Rdd<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rdd").field("base", &self.base).finish()
    }
}

/// RDD backed by an in-memory vector, sliced into contiguous partitions
pub struct ParallelCollectionRdd<T: Data> {
    id: usize,
    data: Arc<Vec<T>>,
    num_partitions: usize,
}

impl<T: Data> ParallelCollectionRdd<T> {
    pub fn new(id: usize, data: Vec<T>, num_partitions: usize) -> Self {
        Self {
            id,
            data: Arc::new(data),
            num_partitions: num_partitions.max(1),
        }
    }
}

impl<T: Data> Debug for ParallelCollectionRdd<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelCollectionRdd")
            .field("id", &self.id)
            .field("data_len", &self.data.len())
            .field("num_partitions", &self.num_partitions)
            .finish()
    }
}

impl<T: Data> RddBase for ParallelCollectionRdd<T> {
    type Item = T;

    fn id(&self) -> usize {
        self.id
    }

    fn num_partitions(&self) -> usize {
        self.num_partitions
    }

    fn compute(&self, partition: &dyn Partition) -> RddResult<Box<dyn Iterator<Item = T>>> {
        let partition_index = partition.index();
        if partition_index >= self.num_partitions {
            return Err(RddError::InvalidPartition(partition_index));
        }

        let data_len = self.data.len();
        let partition_size = data_len.div_ceil(self.num_partitions);
        let start = partition_index * partition_size;
        let end = std::cmp::min(start + partition_size, data_len);

        if start >= data_len {
            Ok(Box::new(std::iter::empty()))
        } else {
            Ok(Box::new(self.data[start..end].to_vec().into_iter()))
        }
    }

    fn dependencies(&self) -> Vec<Dependency> {
        Vec::new()
    }
}

/// RDD of the lines of a text file, one partition per byte-range split
#[derive(Debug)]
pub struct TextFileRdd {
    id: usize,
    input: TextInput,
}

impl TextFileRdd {
    pub fn new(id: usize, input: TextInput) -> Self {
        Self { id, input }
    }

    pub fn input(&self) -> &TextInput {
        &self.input
    }
}

impl RddBase for TextFileRdd {
    type Item = String;

    fn id(&self) -> usize {
        self.id
    }

    fn num_partitions(&self) -> usize {
        self.input.num_splits()
    }

    fn compute(&self, partition: &dyn Partition) -> RddResult<Box<dyn Iterator<Item = String>>> {
        let partition_index = partition.index();
        if partition_index >= self.input.num_splits() {
            return Err(RddError::InvalidPartition(partition_index));
        }

        let lines = self.input.read_split(partition_index).map_err(|e| {
            RddError::IoError(format!(
                "Failed to read {} (split {}): {}",
                self.input.path().display(),
                partition_index,
                e
            ))
        })?;
        Ok(Box::new(lines.into_iter()))
    }

    fn dependencies(&self) -> Vec<Dependency> {
        Vec::new()
    }
}
