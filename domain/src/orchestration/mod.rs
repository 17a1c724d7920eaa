//! Boomerang orchestration domain
//!
//! The event vocabulary a run emits, the fatal/recoverable failure
//! discriminant, and the result types of a run and its debate.

pub mod event;
pub mod failure;
pub mod value_objects;

pub use event::{BoomerangEvent, ChatEvent};
pub use failure::{FailureClass, FatalKind};
pub use value_objects::{BoomerangOutcome, DebateOutcome, DebateRound, RunStatus};
