//! Agent domain
//!
//! The fixed panel of agent identities that take part in a Boomerang run:
//! specialists that each give an independent opinion, and a single reviewer
//! that challenges the collective output.

pub mod identity;
pub mod registry;

pub use identity::{AgentIdentity, AgentKind};
pub use registry::AgentRegistry;
