//! Local Task Scheduler
//!
//! This module provides a local task scheduler that owns a dedicated Rayon
//! thread pool and executes RDD tasks in parallel on a single machine.

use crate::traits::{Partition, RddError, RddResult};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

/// Task represents a unit of work to be executed
pub struct Task<T> {
    pub partition: Arc<dyn Partition>,
    pub compute_fn: ComputeFn<T>,
}

/// Type alias for complex compute function type
pub type ComputeFn<T> = Arc<dyn Fn(&dyn Partition) -> RddResult<Vec<T>> + Send + Sync>;

impl<T> Debug for Task<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("partition", &self.partition)
            .field("compute_fn", &"<function>")
            .finish()
    }
}

impl<T> Task<T> {
    pub fn new(partition: Arc<dyn Partition>, compute_fn: ComputeFn<T>) -> Self {
        Self {
            partition,
            compute_fn,
        }
    }

    pub fn execute(&self) -> RddResult<Vec<T>> {
        (self.compute_fn)(self.partition.as_ref())
    }
}

/// LocalScheduler manages parallel execution of tasks on its own Rayon pool
pub struct LocalScheduler {
    pool: ThreadPool,
    /// Number of threads in the thread pool
    num_threads: usize,
}

impl Debug for LocalScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalScheduler")
            .field("num_threads", &self.num_threads)
            .finish()
    }
}

impl LocalScheduler {
    /// Create a new LocalScheduler with the specified number of threads
    pub fn new(num_threads: usize) -> RddResult<Self> {
        if num_threads == 0 {
            return Err(RddError::ContextError(
                "Scheduler needs at least one thread".to_string(),
            ));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("wisp-worker-{}", i))
            .build()
            .map_err(|e| RddError::ContextError(format!("Failed to build thread pool: {}", e)))?;

        Ok(Self { pool, num_threads })
    }

    /// Get the number of threads
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Execute a collection of tasks in parallel, returning results in task order
    pub fn execute_tasks<T>(&self, tasks: Vec<Task<T>>) -> RddResult<Vec<Vec<T>>>
    where
        T: Send,
    {
        debug!("Executing {} tasks on {} threads", tasks.len(), self.num_threads);
        self.pool
            .install(|| tasks.into_par_iter().map(|task| task.execute()).collect())
    }

    /// Execute a collection of tasks and collect all results into a single vector
    pub fn execute_and_collect<T>(&self, tasks: Vec<Task<T>>) -> RddResult<Vec<T>>
    where
        T: Send,
    {
        let partition_results = self.execute_tasks(tasks)?;
        Ok(partition_results.into_iter().flatten().collect())
    }
}
