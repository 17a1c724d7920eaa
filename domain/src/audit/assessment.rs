use crate::core::string::{char_len, truncate_chars};
use serde::{Deserialize, Serialize};

const SUMMARY_CHARS: usize = 300;
const FINDING_CHARS: usize = 200;
const MAX_FINDINGS: usize = 5;
const MIN_FINDING_CHARS: usize = 10;
const CONFIDENCE_FLOOR: f64 = 0.3;
const FULL_CONFIDENCE_CHARS: f64 = 2000.0;
const BULLET_CHARS: &str = "- *0123456789.)";

/// Structured view of one specialist's raw output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAssessment {
    /// First non-blank line, at most 300 characters
    pub summary: String,
    /// Grows with output length: 0.3 floor, 1.0 at 2000 characters
    pub confidence: f64,
    /// Up to five bullet or numbered items
    pub key_findings: Vec<String>,
}

impl AgentAssessment {
    pub fn from_output(content: &str) -> Self {
        let lines: Vec<&str> = content
            .trim()
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let summary = lines
            .first()
            .map(|line| truncate_chars(line, SUMMARY_CHARS))
            .unwrap_or_else(|| "No output".to_string());

        Self {
            summary,
            confidence: confidence_for(content),
            key_findings: key_findings(&lines),
        }
    }
}

fn confidence_for(content: &str) -> f64 {
    let raw = (char_len(content) as f64 / FULL_CONFIDENCE_CHARS).clamp(CONFIDENCE_FLOOR, 1.0);
    (raw * 100.0).round() / 100.0
}

fn key_findings(lines: &[&str]) -> Vec<String> {
    let mut findings = Vec::new();

    for line in lines {
        let cleaned = line.trim_start_matches(|c: char| BULLET_CHARS.contains(c));
        if !cleaned.is_empty() && cleaned.len() != line.len() && char_len(cleaned) > MIN_FINDING_CHARS
        {
            findings.push(truncate_chars(cleaned.trim(), FINDING_CHARS));
        }
        if findings.len() >= MAX_FINDINGS {
            break;
        }
    }

    // No bullets: take the next few substantial lines after the summary
    if findings.is_empty() && lines.len() > 1 {
        findings = lines
            .iter()
            .skip(1)
            .take(3)
            .filter(|line| char_len(line) > MIN_FINDING_CHARS)
            .map(|line| truncate_chars(line, FINDING_CHARS))
            .collect();
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_output() {
        let assessment = AgentAssessment::from_output("");
        assert_eq!(assessment.summary, "No output");
        assert_eq!(assessment.confidence, 0.3);
        assert!(assessment.key_findings.is_empty());
    }

    #[test]
    fn test_confidence_boundaries() {
        assert_eq!(AgentAssessment::from_output(&"a".repeat(1000)).confidence, 0.5);
        assert_eq!(AgentAssessment::from_output(&"a".repeat(2000)).confidence, 1.0);
        assert_eq!(AgentAssessment::from_output(&"a".repeat(5000)).confidence, 1.0);
        assert_eq!(AgentAssessment::from_output(&"a".repeat(100)).confidence, 0.3);
        assert_eq!(AgentAssessment::from_output(&"a".repeat(1234)).confidence, 0.62);
    }

    #[test]
    fn test_confidence_is_monotonic() {
        let mut last = 0.0;
        for len in (0..2600).step_by(50) {
            let confidence = AgentAssessment::from_output(&"b".repeat(len)).confidence;
            assert!(confidence >= last);
            last = confidence;
        }
    }

    #[test]
    fn test_summary_truncated() {
        let assessment = AgentAssessment::from_output(&format!("\n\n  {}\nmore", "s".repeat(400)));
        assert_eq!(assessment.summary, "s".repeat(300));
    }

    #[test]
    fn test_bullet_findings() {
        let content = "Overview of the goal\n\
                       - Revenue must grow by 20 percent\n\
                       * Churn is the main risk here\n\
                       1. Hire two more engineers soon\n\
                       2) ok\n\
                       Plain sentence that is long enough";
        let assessment = AgentAssessment::from_output(content);
        assert_eq!(
            assessment.key_findings,
            vec![
                "Revenue must grow by 20 percent",
                "Churn is the main risk here",
                "Hire two more engineers soon",
            ]
        );
    }

    #[test]
    fn test_findings_capped_at_five() {
        let content: String = (0..8)
            .map(|i| format!("- finding number {i} is important\n"))
            .collect();
        assert_eq!(AgentAssessment::from_output(&content).key_findings.len(), 5);
    }

    #[test]
    fn test_fallback_findings_without_bullets() {
        let content = "Summary line\nSecond line with detail\nshort\nFourth line with detail\nFifth line never used";
        let assessment = AgentAssessment::from_output(content);
        assert_eq!(
            assessment.key_findings,
            vec!["Second line with detail", "Fourth line with detail"]
        );
    }

    #[test]
    fn test_finding_truncated() {
        let content = format!("Title\n- {}", "f".repeat(300));
        let assessment = AgentAssessment::from_output(&content);
        assert_eq!(assessment.key_findings, vec!["f".repeat(200)]);
    }
}
