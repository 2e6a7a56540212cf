//! RDD Actions
//!
//! This module contains action implementations for RDDs.
//! Actions trigger computation and return results to the driver program.

use crate::rdd::Rdd;
use crate::traits::{Data, RddResult};

impl<T: Data> Rdd<T> {
    /// Collect all elements of the RDD into a vector, in partition order
    pub fn collect(&self) -> RddResult<Vec<T>> {
        let partitions = self
            .context()
            .run_job(&self.base(), |iter| iter.collect::<Vec<T>>())?;
        Ok(partitions.into_iter().flatten().collect())
    }

    /// Count the number of elements in the RDD
    pub fn count(&self) -> RddResult<usize> {
        let counts = self.context().run_job(&self.base(), |iter| iter.count())?;
        Ok(counts.into_iter().sum())
    }

    /// Take the first n elements of the RDD
    pub fn take(&self, n: usize) -> RddResult<Vec<T>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let partitions = self
            .context()
            .run_job(&self.base(), move |iter| iter.take(n).collect::<Vec<T>>())?;
        Ok(partitions.into_iter().flatten().take(n).collect())
    }

    /// Get the first element of the RDD
    pub fn first(&self) -> RddResult<Option<T>> {
        Ok(self.take(1)?.into_iter().next())
    }

    /// Reduce the elements of the RDD with an associative function.
    /// Returns `None` for an empty RDD.
    pub fn reduce<F>(&self, f: F) -> RddResult<Option<T>>
    where
        F: Fn(T, T) -> T + Send + Sync + 'static,
    {
        let f = std::sync::Arc::new(f);
        let per_partition = {
            let f = f.clone();
            self.context()
                .run_job(&self.base(), move |iter| iter.reduce(|a, b| f(a, b)))?
        };
        Ok(per_partition.into_iter().flatten().reduce(|a, b| f(a, b)))
    }
}
