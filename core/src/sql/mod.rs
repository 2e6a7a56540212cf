//! Tabular query API backed by DataFusion.
//!
//! A [`WispSession`] pairs a [`FlowContext`](crate::context::FlowContext) with a
//! DataFusion `SessionContext`, so both the RDD API and the DataFrame API are
//! available from one entry point.

pub mod dataframe;
pub mod functions;
pub mod reader;
pub mod session;

pub use dataframe::{DataFrame, GroupedData};
pub use reader::DataFrameReader;
pub use session::{SessionBuilder, WispSession};

pub use datafusion::arrow;
pub use datafusion::prelude::Expr;
