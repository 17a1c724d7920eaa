//! Execution context domain
//!
//! The per-run value object threaded through every agent call, and the two
//! fixed classification axes (dimension × process phase) that select the
//! work mode of the panel.

pub mod dimension;
pub mod execution;

pub use dimension::{Dimension, ProcessPhase};
pub use execution::ExecutionContext;
