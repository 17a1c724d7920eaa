//! Application-level configuration.
//!
//! - [`AgentSettings`]: model, prompt version, token limits, pricing and
//!   call timeout shared by every agent of the panel

pub mod agent_settings;

pub use agent_settings::AgentSettings;
