//! Agent identity value object

use crate::core::string::title_case;
use serde::{Deserialize, Serialize};

/// Whether an agent opines on the prompt or reviews the other opinions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Specialist,
    Reviewer,
}

/// A named persona backed by the language model (Value Object)
///
/// Identities are defined once at process start and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentIdentity {
    /// Unique key, lowercase (e.g. `"lyra"`)
    pub name: String,
    /// Role category label (e.g. `"Goal"`)
    pub role: String,
    /// Display colour used by front ends
    pub color: String,
    /// Persona instruction text that opens the system prompt
    pub persona: String,
    pub kind: AgentKind,
}

impl AgentIdentity {
    pub fn specialist(
        name: impl Into<String>,
        role: impl Into<String>,
        color: impl Into<String>,
        persona: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            color: color.into(),
            persona: persona.into(),
            kind: AgentKind::Specialist,
        }
    }

    pub fn reviewer(
        name: impl Into<String>,
        role: impl Into<String>,
        color: impl Into<String>,
        persona: impl Into<String>,
    ) -> Self {
        Self {
            kind: AgentKind::Reviewer,
            ..Self::specialist(name, role, color, persona)
        }
    }

    pub fn is_reviewer(&self) -> bool {
        self.kind == AgentKind::Reviewer
    }

    /// Capitalized name for prompts and console output
    pub fn display_name(&self) -> String {
        title_case(&self.name)
    }
}

impl std::fmt::Display for AgentIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
