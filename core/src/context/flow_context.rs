//! FlowContext - Local execution context for RDD operations
//!
//! This module provides the entry point for the RDD API. A context owns the
//! scheduler's thread pool, hands out RDD and shuffle ids, and runs jobs.

use crate::config::{FlowConf, Master};
use crate::input::TextInput;
use crate::rdd::{ParallelCollectionRdd, Rdd, TextFileRdd};
use crate::scheduler::{LocalScheduler, Task};
use crate::traits::{Data, Partition, RddBase, RddError, RddResult};
use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{debug, info};
use uuid::Uuid;
use wisp_common::error::Result;

struct ContextInner {
    app_id: String,
    conf: FlowConf,
    scheduler: LocalScheduler,
    next_rdd_id: AtomicUsize,
    next_shuffle_id: AtomicUsize,
    stopped: AtomicBool,
}

/// FlowContext manages RDD operations on a local thread pool.
///
/// Cloning is cheap; every clone refers to the same running context.
#[derive(Clone)]
pub struct FlowContext {
    inner: Arc<ContextInner>,
}

impl FlowContext {
    /// Create a new context from a validated configuration
    pub fn new(conf: FlowConf) -> Result<Self> {
        conf.validate()?;
        let scheduler = LocalScheduler::new(conf.master.num_threads())?;
        let app_id = format!("local-{}", Uuid::new_v4());

        info!(
            "Starting FlowContext '{}' ({}) on {} with {} worker threads",
            conf.app_name,
            app_id,
            conf.master,
            scheduler.num_threads()
        );

        Ok(Self {
            inner: Arc::new(ContextInner {
                app_id,
                conf,
                scheduler,
                next_rdd_id: AtomicUsize::new(0),
                next_shuffle_id: AtomicUsize::new(0),
                stopped: AtomicBool::new(false),
            }),
        })
    }

    /// Create a context for `app_name` on the given master string
    pub fn with_master(app_name: impl Into<String>, master: &str) -> Result<Self> {
        let master: Master = master.parse()?;
        Self::new(FlowConf::new(app_name, master))
    }

    /// Get the application name
    pub fn app_name(&self) -> &str {
        &self.inner.conf.app_name
    }

    /// Unique id of this run of the application
    pub fn app_id(&self) -> &str {
        &self.inner.app_id
    }

    pub fn conf(&self) -> &FlowConf {
        &self.inner.conf
    }

    pub fn master(&self) -> Master {
        self.inner.conf.master
    }

    /// Default partition count for `parallelize` and shuffles
    pub fn default_parallelism(&self) -> usize {
        self.inner.conf.default_parallelism
    }

    /// Partition count of shuffles that are not given a partitioner.
    /// A validated configuration always fits.
    pub(crate) fn default_shuffle_partitions(&self) -> u32 {
        u32::try_from(self.default_parallelism()).unwrap_or(u32::MAX)
    }

    /// Default minimum number of partitions for text input
    pub fn default_min_partitions(&self) -> usize {
        self.default_parallelism().min(2)
    }

    /// Create an RDD from a vector of data
    pub fn parallelize<T: Data>(&self, data: Vec<T>) -> Rdd<T> {
        self.parallelize_with_partitions(data, self.default_parallelism())
    }

    /// Create an RDD from a vector with specified number of partitions
    pub fn parallelize_with_partitions<T: Data>(&self, data: Vec<T>, num_partitions: usize) -> Rdd<T> {
        let rdd = ParallelCollectionRdd::new(self.new_rdd_id(), data, num_partitions);
        Rdd::new(self.clone(), Arc::new(rdd))
    }

    /// Create an RDD of the lines of a text file
    pub fn text_file(&self, path: impl AsRef<Path>) -> Result<Rdd<String>> {
        self.text_file_with_partitions(path, self.default_min_partitions())
    }

    /// Create an RDD of the lines of a text file, split into up to
    /// `min_partitions` partitions of equal byte size.
    ///
    /// The file must exist when this is called; its lines are read when a job runs.
    pub fn text_file_with_partitions(
        &self,
        path: impl AsRef<Path>,
        min_partitions: usize,
    ) -> Result<Rdd<String>> {
        self.ensure_active()?;
        let input = TextInput::open(path, min_partitions)?;
        let rdd = TextFileRdd::new(self.new_rdd_id(), input);
        Ok(Rdd::new(self.clone(), Arc::new(rdd)))
    }

    /// Run `func` over every partition of `rdd` and return one result per
    /// partition, in partition order.
    pub fn run_job<T, U, F>(&self, rdd: &Arc<dyn RddBase<Item = T>>, func: F) -> RddResult<Vec<U>>
    where
        T: Data,
        U: Send + 'static,
        F: Fn(Box<dyn Iterator<Item = T>>) -> U + Send + Sync + 'static,
    {
        self.ensure_active()?;
        debug!(
            "Running job on RDD {} with {} partitions",
            rdd.id(),
            rdd.num_partitions()
        );

        rdd.prepare_stages(&self.inner.scheduler)?;

        let func = Arc::new(func);
        let tasks: Vec<Task<U>> = rdd
            .partitions()
            .into_iter()
            .map(|partition| {
                let rdd = rdd.clone();
                let func = func.clone();
                Task::new(
                    partition,
                    Arc::new(move |p: &dyn Partition| -> RddResult<Vec<U>> {
                        Ok(vec![func(rdd.compute(p)?)])
                    }),
                )
            })
            .collect();

        self.inner.scheduler.execute_and_collect(tasks)
    }

    /// Stop the context. Returns true if this call stopped it, false if it
    /// was already stopped.
    pub fn stop(&self) -> bool {
        let was_running = !self.inner.stopped.swap(true, Ordering::SeqCst);
        if was_running {
            info!("Stopping FlowContext '{}' ({})", self.app_name(), self.app_id());
        }
        was_running
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    pub(crate) fn ensure_active(&self) -> RddResult<()> {
        if self.is_stopped() {
            return Err(RddError::ContextError(format!(
                "FlowContext '{}' has been stopped",
                self.app_name()
            )));
        }
        Ok(())
    }

    pub(crate) fn new_rdd_id(&self) -> usize {
        self.inner.next_rdd_id.fetch_add(1, Ordering::SeqCst)
    }

    pub(crate) fn new_shuffle_id(&self) -> usize {
        self.inner.next_shuffle_id.fetch_add(1, Ordering::SeqCst)
    }
}

impl Debug for FlowContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowContext")
            .field("app_name", &self.app_name())
            .field("app_id", &self.app_id())
            .field("master", &self.master())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}
