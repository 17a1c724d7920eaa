//! Prompt templates for the debate and synopsis flows

use crate::core::string::{title_case, truncate_chars};
use crate::debate::SpecialistOutput;
use crate::session::ChallengeRecord;

/// Maximum characters of each specialist opinion embedded in a synopsis prompt
pub const SYNOPSIS_EXCERPT_CHARS: usize = 1500;

/// Templates for generating prompts at each debate stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// User prompt asking the reviewer to raise challenges against every
    /// specialist output
    pub fn challenge_prompt(outputs: &[SpecialistOutput]) -> String {
        let mut parts = vec![
            format!(
                "You are reviewing the outputs of {} specialist agents. Your job is to identify weaknesses, \
                 contradictions, unsupported claims, and blind spots across their collective analysis.\n",
                outputs.len()
            ),
            "## Specialist Outputs\n".to_string(),
        ];

        for output in outputs {
            parts.push(format!(
                "### {} ({})\n{}\n",
                title_case(&output.agent),
                output.role,
                output.content
            ));
        }

        parts.push(
            r#"## Your Task
Review all outputs and produce a JSON array of challenges. Each challenge must have:
- "challenge_text": A clear statement of the issue
- "severity": One of "high", "medium", "low"
- "targeted_agents": Array of agent names (e.g., ["lyra", "dex"]) that should respond
- "evidence_needed": What evidence would resolve this challenge

Respond ONLY with a JSON array. No other text."#
                .to_string(),
        );

        parts.join("\n")
    }

    /// User prompt asking a specialist to defend its analysis
    pub fn challenge_response_prompt(reviewer: &str, challenge_text: &str) -> String {
        format!(
            "You have been challenged by {}, the adversarial reviewer.\n\n\
             ## Challenge\n{}\n\n\
             Respond with specific evidence, reasoning, and any corrections to your original analysis.",
            title_case(reviewer),
            challenge_text
        )
    }

    /// User prompt asking the reviewer to rule on a challenge.
    /// `responses` is `(agent, response)` in the order they were collected.
    pub fn verdict_prompt(challenge_text: &str, responses: &[(String, String)]) -> String {
        let mut parts = vec![
            format!("## Original Challenge\n{}\n", challenge_text),
            "## Agent Responses\n".to_string(),
        ];

        for (agent, response) in responses {
            parts.push(format!("### {}\n{}\n", title_case(agent), response));
        }

        parts.push(
            r#"## Your Verdict
Evaluate the responses and determine a resolution. Respond with a JSON object:
- "resolution": One of "resolved", "accepted_risk", "action_required"
- "resolution_text": A brief explanation of your verdict

Respond ONLY with a JSON object. No other text."#
                .to_string(),
        );

        parts.join("\n")
    }

    /// System prompt for the synopsis writer
    pub fn synopsis_system() -> &'static str {
        "You are a concise business analyst. Given the outputs of specialist AI agents \
         and any challenges raised by the Axiom reviewer, write a clear, actionable synopsis \
         of the analysis (3-5 paragraphs). Focus on key findings, risks identified, and \
         recommended actions. Do NOT use bullet points for the main body; use flowing prose. \
         Keep it under 800 words."
    }

    /// User prompt for the synopsis.
    /// `opinions` is `(agent, content)`; each content is cut to
    /// [`SYNOPSIS_EXCERPT_CHARS`] characters.
    pub fn synopsis_prompt(opinions: &[(String, String)], challenges: &[ChallengeRecord]) -> String {
        let mut sections = vec!["## Specialist Agent Outputs\n".to_string()];

        for (agent, content) in opinions {
            if content.is_empty() {
                continue;
            }
            sections.push(format!(
                "### {}\n{}",
                title_case(agent),
                truncate_chars(content, SYNOPSIS_EXCERPT_CHARS)
            ));
        }

        let reviews: Vec<String> = challenges
            .iter()
            .map(|challenge| {
                let mut entry = format!(
                    "- **Challenge** ({}): {}",
                    challenge.severity, challenge.challenge_text
                );
                if let Some(verdict) = &challenge.verdict {
                    if !verdict.resolution_text.is_empty() {
                        entry.push_str(&format!(
                            "\n  **Verdict** ({}): {}",
                            verdict.resolution, verdict.resolution_text
                        ));
                    }
                }
                entry
            })
            .collect();

        if !reviews.is_empty() {
            sections.push(format!("\n## Axiom Review\n{}", reviews.join("\n")));
        }
        sections.push("\n---\nWrite a synopsis summarizing the above analysis.".to_string());

        sections.join("\n\n")
    }
}
