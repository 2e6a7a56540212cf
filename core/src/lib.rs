//! Wisp Core - a local, Spark-style data processing engine
//!
//! This crate provides the RDD API (a context, lazy transformations, actions
//! and hash shuffles executed on a rayon thread pool) and a DataFrame API
//! built on DataFusion. Everything runs in a single process.

pub mod config;
pub mod context;
pub mod input;
pub mod rdd;
pub mod scheduler;
pub mod shuffle;
pub mod sql;
pub mod traits;

pub use config::{FlowConf, Master};
pub use context::FlowContext;
pub use rdd::{PairRdd, Rdd};
pub use sql::{DataFrame, WispSession};
pub use traits::{Data, RddError, RddResult};
