//! Console output formatter for Boomerang results

use boomerang_application::Synopsis;
use boomerang_domain::{
    AgentRegistry, AuditReport, BoomerangEvent, BoomerangOutcome, Resolution, RunStatus, Severity,
};
use colored::{Color, ColoredString, Colorize};
use serde::Serialize;

/// Characters of an agent answer shown inline before it is cut
const PREVIEW_CHARS: usize = 160;

/// Formats events and results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// One line (or block) for a live event; `None` for events that only
    /// move progress bars
    pub fn event_line(event: &BoomerangEvent, registry: &AgentRegistry) -> Option<String> {
        match event {
            BoomerangEvent::BoomerangStart { subject_id } => Some(format!(
                "{} {}",
                "Subject:".cyan().bold(),
                subject_id
            )),
            BoomerangEvent::AgentComplete {
                agent,
                content,
                output_tokens,
                ..
            } => Some(format!(
                "{} {} {}\n{}",
                "v".green(),
                Self::agent_label(agent, registry),
                format!("({} tokens)", output_tokens).dimmed(),
                Self::indent(&Self::preview(content), "    ")
            )),
            BoomerangEvent::AgentError {
                agent,
                error,
                classification,
            } => Some(format!(
                "{} {} {} {}",
                "x".red(),
                Self::agent_label(agent, registry),
                format!("[{}]", classification).red(),
                error
            )),
            BoomerangEvent::AxiomStart { agent } => Some(Self::section_header(&format!(
                "{} is reviewing the panel",
                Self::agent_label(agent, registry)
            ))),
            BoomerangEvent::AxiomChallenge {
                challenge_text,
                severity,
                targeted_agents,
                evidence_needed,
            } => {
                let mut block = format!(
                    "\n{} {}\n{}",
                    Self::severity_badge(*severity),
                    "Challenge".bold(),
                    Self::indent(challenge_text, "  ")
                );
                if !targeted_agents.is_empty() {
                    block.push_str(&format!(
                        "\n  {} {}",
                        "Targets:".dimmed(),
                        targeted_agents.join(", ")
                    ));
                }
                if !evidence_needed.is_empty() {
                    block.push_str(&format!("\n  {} {}", "Evidence:".dimmed(), evidence_needed));
                }
                Some(block)
            }
            BoomerangEvent::ChallengeResponse {
                agent, response, ..
            } => Some(format!(
                "  {} {}\n{}",
                "<-".cyan(),
                Self::agent_label(agent, registry),
                Self::indent(&Self::preview(response), "     ")
            )),
            BoomerangEvent::AxiomVerdict {
                resolution,
                resolution_text,
                ..
            } => Some(format!(
                "  {} {}\n{}",
                "Verdict:".bold(),
                Self::resolution_badge(*resolution),
                Self::indent(resolution_text, "     ")
            )),
            BoomerangEvent::BoomerangError { error, message } => Some(format!(
                "{} {} {}",
                "Error:".red().bold(),
                format!("[{}]", error).red(),
                message
            )),
            BoomerangEvent::BoomerangComplete {
                agents_completed,
                aborted,
                ..
            } => {
                let status = if *aborted {
                    "aborted".red().bold()
                } else {
                    "complete".green().bold()
                };
                Some(format!(
                    "\n{} {} ({} specialists answered)",
                    "Boomerang".bold(),
                    status,
                    agents_completed.len()
                ))
            }
            BoomerangEvent::Error { error } => {
                Some(format!("{} {}", "Error:".red().bold(), error))
            }
            BoomerangEvent::ChallengeComplete { subject_id } => Some(format!(
                "\n{} {}",
                "Challenge complete for".green().bold(),
                subject_id
            )),
            BoomerangEvent::Phase { .. } | BoomerangEvent::AgentStart { .. } => None,
        }
    }

    /// Closing summary of a run
    pub fn format_outcome(outcome: &BoomerangOutcome) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("Boomerang Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Subject:".cyan().bold(),
            outcome.subject_id
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Status:".cyan().bold(),
            Self::status_label(outcome.status)
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Answered:".cyan().bold(),
            outcome.agents_completed().join(", ")
        ));
        if !outcome.failed_agents.is_empty() {
            output.push_str(&format!(
                "{} {}\n",
                "Failed:".red().bold(),
                outcome.failed_agents.join(", ")
            ));
        }

        if let Some(debate) = &outcome.debate {
            output.push_str(&Self::section_header(&format!(
                "Debate: {} challenges",
                debate.challenge_count()
            )));
            for (i, round) in debate.rounds.iter().enumerate() {
                output.push_str(&format!(
                    "{}. {} {} {}\n",
                    i + 1,
                    Self::severity_badge(round.challenge.severity),
                    round.challenge.challenge_text,
                    format!("-> {}", round.verdict.resolution).dimmed()
                ));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// Agent assessments followed by the decision trail
    pub fn format_audit(report: &AuditReport, registry: &AgentRegistry) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("Decision Audit"));
        output.push('\n');

        if report.is_empty() {
            output.push_str("Nothing recorded for this subject yet.\n");
            output.push_str(&Self::footer());
            return output;
        }

        output.push_str(&Self::section_header("Agent Assessments"));
        for agent in &report.agents_completed {
            let Some(assessment) = report.agent_assessments.get(agent) else {
                continue;
            };
            output.push_str(&format!(
                "\n{} {}\n  {}\n",
                Self::agent_label(agent, registry),
                format!("(confidence {:.2})", assessment.confidence).dimmed(),
                assessment.summary
            ));
            for finding in &assessment.key_findings {
                output.push_str(&format!("  * {}\n", finding));
            }
        }

        if !report.decision_audit.is_empty() {
            output.push_str(&Self::section_header("Decision Trail"));
            for entry in &report.decision_audit {
                output.push_str(&format!(
                    "\n{} {}\n  {} {}\n  {} {}\n",
                    Self::resolution_badge(entry.resolution),
                    entry.challenge,
                    "Evidence:".dimmed(),
                    entry.evidence,
                    "Agents:".dimmed(),
                    entry.agents.join(", ")
                ));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    pub fn format_synopsis(synopsis: &Synopsis) -> String {
        format!(
            "{}\n\n{}\n\n{}\n",
            "=== Synopsis ===".cyan().bold(),
            synopsis.text,
            format!(
                "{} input / {} output tokens",
                synopsis.input_tokens, synopsis.output_tokens
            )
            .dimmed()
        )
    }

    /// Format any result as JSON
    pub fn format_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Agent name in its display colour
    pub fn agent_label(agent: &str, registry: &AgentRegistry) -> ColoredString {
        match registry.get(agent) {
            Ok(identity) => identity
                .display_name()
                .color(Self::palette(&identity.color))
                .bold(),
            Err(_) => agent.bold(),
        }
    }

    /// Map an identity colour name onto a terminal colour
    fn palette(name: &str) -> Color {
        match name {
            "purple" => Color::Magenta,
            "pink" => Color::BrightMagenta,
            "indigo" => Color::TrueColor { r: 75, g: 0, b: 130 },
            "orange" => Color::TrueColor { r: 255, g: 140, b: 0 },
            "amber" => Color::TrueColor { r: 255, g: 191, b: 0 },
            "teal" => Color::Cyan,
            other => Color::from(other),
        }
    }

    fn severity_badge(severity: Severity) -> ColoredString {
        let label = format!("[{}]", severity.as_str().to_uppercase());
        match severity {
            Severity::High => label.red().bold(),
            Severity::Medium => label.yellow().bold(),
            Severity::Low => label.blue(),
        }
    }

    fn resolution_badge(resolution: Resolution) -> ColoredString {
        match resolution {
            Resolution::Resolved => resolution.as_str().green().bold(),
            Resolution::AcceptedRisk => resolution.as_str().yellow().bold(),
            Resolution::ActionRequired => resolution.as_str().red().bold(),
        }
    }

    fn status_label(status: RunStatus) -> ColoredString {
        match status {
            RunStatus::Completed => "completed".green().bold(),
            RunStatus::DebateFailed => "debate failed".yellow().bold(),
            RunStatus::Aborted => "aborted".red().bold(),
            RunStatus::NoOutputs => "no specialist answered".red().bold(),
        }
    }

    fn preview(text: &str) -> String {
        let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if flat.chars().count() <= PREVIEW_CHARS {
            return flat;
        }
        let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
