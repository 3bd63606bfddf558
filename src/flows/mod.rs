//! # Order Processing Flows
//!
//! [`Context`] wraps the order an event carries; [`Pipeline`] chains the
//! [`Step`]s that process it.

pub mod context;
pub mod pipeline;

pub use context::{setup_contexts, Context};
pub use pipeline::{Next, Pipeline, Step};
