//! Task Scheduler module
//!
//! This module provides task scheduling for parallel execution of RDD jobs
//! on a Rayon thread pool.

pub mod local_scheduler;

pub use local_scheduler::*;
