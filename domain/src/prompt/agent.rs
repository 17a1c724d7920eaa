//! System prompt construction for panel agents.
//!
//! Deterministic and I/O free: the same identity, dimension and phase always
//! produce the same text.

use crate::agent::{AgentIdentity, AgentRegistry};
use crate::context::{Dimension, ProcessPhase};
use crate::core::error::DomainError;

/// Work mode at the intersection of a dimension and a process phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intersection {
    pub label: &'static str,
    pub guidance: &'static str,
}

impl Intersection {
    /// Exhaustive over the 3 × 4 table, so no combination can be missing.
    pub fn of(dimension: Dimension, phase: ProcessPhase) -> Self {
        use Dimension::*;
        use ProcessPhase::*;

        let (label, guidance) = match (dimension, phase) {
            (Architecture, Generate) => (
                "Imagining",
                "Imagine bold structural possibilities. Explore foundational frameworks, \
                 system boundaries, and high-level patterns that could support the goal.",
            ),
            (Architecture, Review) => (
                "Critiquing",
                "Critique the proposed architecture. Identify structural weaknesses, \
                 missing components, scalability risks, and integration gaps.",
            ),
            (Architecture, Validate) => (
                "Proving",
                "Prove the architecture is sound. Verify structural integrity through \
                 traceability, stress scenarios, and alignment with constraints.",
            ),
            (Architecture, Summarize) => (
                "Distilling",
                "Distill the architectural decisions into a clear, defensible summary. \
                 Capture key trade-offs, rationale, and recommended next steps.",
            ),
            (Design, Generate) => (
                "Exploring",
                "Explore creative design solutions. Generate interaction patterns, \
                 user flows, information architecture, and experience concepts.",
            ),
            (Design, Review) => (
                "Shaping",
                "Shape the design through critical evaluation. Refine usability, \
                 coherence, accessibility, and alignment with user needs.",
            ),
            (Design, Validate) => (
                "Testing",
                "Test the design against real-world scenarios. Validate usability, \
                 edge cases, accessibility standards, and stakeholder expectations.",
            ),
            (Design, Summarize) => (
                "Crystallizing",
                "Crystallize the design decisions into actionable specifications. \
                 Document patterns, standards, and implementation guidance.",
            ),
            (Engineering, Generate) => (
                "Inventing",
                "Invent technical approaches. Propose implementation strategies, \
                 technology choices, data models, and integration patterns.",
            ),
            (Engineering, Review) => (
                "Optimizing",
                "Optimize the engineering plan. Review for performance, maintainability, \
                 security, technical debt, and operational concerns.",
            ),
            (Engineering, Validate) => (
                "Verifying",
                "Verify the engineering solution meets requirements. Check feasibility, \
                 test coverage, deployment readiness, and compliance.",
            ),
            (Engineering, Summarize) => (
                "Synthesizing",
                "Synthesize the engineering outcomes. Consolidate technical decisions, \
                 implementation plans, risk mitigations, and delivery milestones.",
            ),
        };

        Self { label, guidance }
    }
}

/// Builder for the per-agent system instruction
pub struct AgentPromptTemplate;

impl AgentPromptTemplate {
    /// Build the system prompt for `agent`.
    ///
    /// `panel_size` is the number of agents in the registry and appears in the
    /// role statement. The intersection block is only added when both
    /// `dimension` and `phase` are known.
    pub fn system_prompt(
        agent: &AgentIdentity,
        panel_size: usize,
        dimension: Option<Dimension>,
        phase: Option<ProcessPhase>,
    ) -> String {
        let mut parts = vec![agent.persona.clone()];

        parts.push(format!(
            "\nYour role category is '{}'. You are one of {} InCube cognitive agents working together \
             to support business transformation decisions.",
            agent.role, panel_size
        ));

        if let (Some(dimension), Some(phase)) = (dimension, phase) {
            let intersection = Intersection::of(dimension, phase);
            parts.push(format!(
                "\n## Current Context\n- Dimension: {}\n- Phase: {}\n- Intersection: {}\n",
                dimension.title(),
                phase.title(),
                intersection.label
            ));
            parts.push(format!("## Intersection Guidance\n{}", intersection.guidance));
        }

        parts.push(Self::response_guidelines().to_string());

        parts.join("\n")
    }

    /// Look `name` up in `registry` and build its system prompt
    pub fn for_agent(
        registry: &AgentRegistry,
        name: &str,
        dimension: Option<Dimension>,
        phase: Option<ProcessPhase>,
    ) -> Result<String, DomainError> {
        let agent = registry.get(name)?;
        Ok(Self::system_prompt(agent, registry.len(), dimension, phase))
    }

    fn response_guidelines() -> &'static str {
        "\n## Response Guidelines\n\
         - Be specific and actionable, not generic.\n\
         - Ground your analysis in the context provided.\n\
         - Identify risks, assumptions, and trade-offs explicitly.\n\
         - When uncertain, say so and explain what evidence would help.\n\
         - Keep responses focused and concise."
    }
}
