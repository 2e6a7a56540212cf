//! Core traits for the Wisp engine
//!
//! This module defines the fundamental abstractions for RDDs (Resilient Distributed Datasets)
//! and related operations.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;
use thiserror::Error;
use wisp_common::CommonError;

/// Error types for RDD operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RddError {
    #[error("Computation failed: {0}")]
    ComputationError(String),

    #[error("Invalid partition: {0}")]
    InvalidPartition(usize),

    #[error("Context error: {0}")]
    ContextError(String),

    #[error("Shuffle error: {0}")]
    ShuffleError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Result type for RDD operations
pub type RddResult<T> = Result<T, RddError>;

impl From<RddError> for CommonError {
    fn from(error: RddError) -> Self {
        match &error {
            RddError::IoError(message) => {
                let message = message.clone();
                CommonError::io_error_with_source(message, error)
            }
            RddError::ContextError(_) => {
                CommonError::configuration_error_with_source("Context unavailable", error)
            }
            _ => CommonError::execution_error_with_source("RDD job failed", error),
        }
    }
}

/// Partition represents a logical partition of data in an RDD
pub trait Partition: Send + Sync + Debug {
    /// Get the partition index
    fn index(&self) -> usize;

    /// Get a unique identifier for this partition
    fn id(&self) -> String {
        format!("partition_{}", self.index())
    }
}

/// Basic partition implementation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicPartition {
    index: usize,
}

impl BasicPartition {
    pub fn new(index: usize) -> Self {
        Self { index }
    }
}

impl Partition for BasicPartition {
    fn index(&self) -> usize {
        self.index
    }
}

/// A data type that can be used in an RDD.
pub trait Data:
    Send + Sync + Clone + Debug + Serialize + for<'de> Deserialize<'de> + 'static
{
}
impl<T> Data for T where
    T: Send + Sync + Clone + Debug + Serialize + for<'de> Deserialize<'de> + 'static
{
}

/// Represents a dependency of an RDD on its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    /// Each partition of the child depends on the same-index partition of the parent.
    Narrow { parent_id: usize },
    /// Each partition of the child depends on every partition of the parent.
    Shuffle { parent_id: usize, shuffle_id: usize },
}

/// Base trait for all RDDs.
///
/// Implementations describe how to compute one partition from their parents;
/// scheduling and result collection belong to the context.
pub trait RddBase: Send + Sync + Debug {
    type Item: Data;

    /// Get a unique ID for this RDD.
    fn id(&self) -> usize;

    /// Get the number of partitions
    fn num_partitions(&self) -> usize;

    /// Get the list of partitions for this RDD
    fn partitions(&self) -> Vec<Arc<dyn Partition>> {
        (0..self.num_partitions())
            .map(|i| Arc::new(BasicPartition::new(i)) as Arc<dyn Partition>)
            .collect()
    }

    /// Compute the elements of this RDD for the given partition
    fn compute(&self, partition: &dyn Partition)
    -> RddResult<Box<dyn Iterator<Item = Self::Item>>>;

    /// Get dependencies of this RDD (for lineage tracking)
    fn dependencies(&self) -> Vec<Dependency>;

    /// Run the shuffle map stages this RDD depends on.
    ///
    /// Called on the driver before the result tasks of a job are scheduled, so
    /// that `compute` never has to wait on another stage from inside a worker.
    fn prepare_stages(&self, scheduler: &crate::scheduler::LocalScheduler) -> RddResult<()> {
        let _ = scheduler;
        Ok(())
    }
}
