//! RDD (Resilient Distributed Dataset) implementations
//!
//! This module contains the RDD handle, the source RDDs, and the
//! transformations and actions available on them.

pub mod actions;
pub mod base;
pub mod shuffled_rdd;
pub mod transformations;

pub use base::*;
pub use shuffled_rdd::*;
pub use transformations::*;
