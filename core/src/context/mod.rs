//! Context module for Wisp
//!
//! This module provides the execution context for RDD operations.

pub mod flow_context;

pub use flow_context::*;
