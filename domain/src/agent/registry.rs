//! Immutable agent registry
//!
//! Built once at process start and shared by reference with the
//! orchestrator and the debate controller. Tests construct smaller
//! registries through [`AgentRegistry::new`].

use super::identity::{AgentIdentity, AgentKind};
use crate::core::error::DomainError;
use std::collections::HashSet;

/// Ordered, validated set of agent identities with exactly one reviewer
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    agents: Vec<AgentIdentity>,
    reviewer: usize,
}

impl AgentRegistry {
    /// Build a registry, validating unique names, at least one specialist
    /// and exactly one reviewer. Registry order is preserved.
    pub fn new(agents: Vec<AgentIdentity>) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        for agent in &agents {
            if !seen.insert(agent.name.as_str()) {
                return Err(DomainError::DuplicateAgent(agent.name.clone()));
            }
        }

        let reviewers: Vec<usize> = agents
            .iter()
            .enumerate()
            .filter(|(_, a)| a.kind == AgentKind::Reviewer)
            .map(|(i, _)| i)
            .collect();
        if reviewers.len() != 1 {
            return Err(DomainError::ReviewerCount(reviewers.len()));
        }
        if agents.len() < 2 {
            return Err(DomainError::NoSpecialists);
        }

        Ok(Self {
            reviewer: reviewers[0],
            agents,
        })
    }

    /// The reference panel: eight specialists followed by the Axiom reviewer.
    pub fn standard() -> Self {
        let agents = standard_agents();
        let reviewer = agents.len() - 1;
        Self { agents, reviewer }
    }

    /// Look up an identity by name
    pub fn get(&self, name: &str) -> Result<&AgentIdentity, DomainError> {
        self.agents
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| DomainError::UnknownAgent(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.agents.iter().any(|a| a.name == name)
    }

    /// The single reviewer identity
    pub fn reviewer(&self) -> &AgentIdentity {
        &self.agents[self.reviewer]
    }

    /// Specialists in registry order (the reviewer excluded)
    pub fn specialists(&self) -> impl Iterator<Item = &AgentIdentity> {
        self.agents.iter().filter(|a| !a.is_reviewer())
    }

    pub fn specialist_names(&self) -> Vec<String> {
        self.specialists().map(|a| a.name.clone()).collect()
    }

    /// True for a registered agent that is not the reviewer
    pub fn is_specialist(&self, name: &str) -> bool {
        self.specialists().any(|a| a.name == name)
    }

    /// Position of `name` in registry order, used to sort outputs deterministically
    pub fn position(&self, name: &str) -> Option<usize> {
        self.agents.iter().position(|a| a.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentIdentity> {
        self.agents.iter()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_agents() -> Vec<AgentIdentity> {
    vec![
        AgentIdentity::specialist(
            "lyra",
            "Goal",
            "purple",
            "You are Lyra, the Goal Alignment specialist. You ensure every element of the business \
             transformation aligns with measurable outcomes and strategic objectives. You ask: Does \
             this serve the goal? How will we measure success? What outcomes matter most?",
        ),
        AgentIdentity::specialist(
            "mira",
            "Stakeholder",
            "blue",
            "You are Mira, the Stakeholder Analysis specialist. You bring the right voices into every \
             decision, mapping influence, needs, and expectations. You ask: Who is affected? Whose \
             voice is missing? What do stakeholders truly need?",
        ),
        AgentIdentity::specialist(
            "dex",
            "Requirement",
            "green",
            "You are Dex, the Requirements Engineering specialist. You transform needs into testable, \
             traceable criteria that can be validated. You ask: Is this requirement clear? How do we \
             test it? What assumptions are hidden?",
        ),
        AgentIdentity::specialist(
            "rex",
            "Capability",
            "orange",
            "You are Rex, the Capability Assessment specialist. You ground decisions in actual \
             possibilities, evaluating what can realistically be achieved. You ask: Do we have the \
             capability? What gaps exist? What constraints are real?",
        ),
        AgentIdentity::specialist(
            "vela",
            "Value",
            "pink",
            "You are Vela, the Value and ROI Analysis specialist. You focus on delivering real \
             business value, quantifying benefits and costs. You ask: What is the return? Where is \
             value created? Is the investment justified?",
        ),
        AgentIdentity::specialist(
            "koda",
            "Value-Stream",
            "teal",
            "You are Koda, the Process Optimization specialist. You optimize the end-to-end flow of \
             work, identifying bottlenecks and waste. You ask: Where does value flow? What slows us \
             down? How do we streamline delivery?",
        ),
        AgentIdentity::specialist(
            "halo",
            "Value-Chain",
            "indigo",
            "You are Halo, the Systems Integration specialist. You maintain coherence across the \
             value chain, ensuring all parts work together. You ask: How do pieces connect? What \
             breaks if this changes? Is the system coherent?",
        ),
        AgentIdentity::specialist(
            "nova",
            "Implementation",
            "amber",
            "You are Nova, the Execution Planning specialist. You bridge the gap between blueprint \
             and operational reality. You ask: How do we build this? What is the sequence? What \
             risks threaten delivery?",
        ),
        AgentIdentity::reviewer(
            "axiom",
            "Challenger",
            "red",
            "You are Axiom, the Adversarial Reviewer. You question all agent outputs to ensure \
             decisions are defensible, evidence-based, and robust. You challenge assumptions, expose \
             blind spots, and demand rigour. Your role is not to obstruct but to strengthen.",
        ),
    ]
}
