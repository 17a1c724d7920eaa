//! Prompt domain
//!
//! Pure builders for every instruction sent to the model: the per-agent
//! system prompt (persona, role, dimension × phase intersection, response
//! style) and the user-facing templates of the debate and synopsis flows.

pub mod agent;
mod template;

pub use agent::{AgentPromptTemplate, Intersection};
pub use template::PromptTemplate;
