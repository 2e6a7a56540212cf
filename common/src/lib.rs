//! Common utilities and abstractions for the Wisp project.
//!
//! This crate currently hosts the shared error type used by the engine and
//! the applications built on top of it.

pub mod error;

pub use error::{CommonError, ErrorContext, Result};
