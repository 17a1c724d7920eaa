//! Debate entities

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a reviewer challenge is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    #[default]
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    /// Lenient parse used on model output. Anything unrecognised is `Medium`.
    pub fn from_model(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Severity::High,
            "low" => Severity::Low,
            _ => Severity::Medium,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome the reviewer assigns to a challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Resolved,
    AcceptedRisk,
    #[default]
    ActionRequired,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Resolved => "resolved",
            Resolution::AcceptedRisk => "accepted_risk",
            Resolution::ActionRequired => "action_required",
        }
    }

    /// Lenient parse used on model output. Anything unrecognised is
    /// `ActionRequired`.
    pub fn from_model(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "resolved" => Resolution::Resolved,
            "accepted_risk" | "accepted risk" => Resolution::AcceptedRisk,
            _ => Resolution::ActionRequired,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A critique raised by the reviewer against the specialists' outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub challenge_text: String,
    pub severity: Severity,
    pub targeted_agents: Vec<String>,
    pub evidence_needed: String,
}

impl Challenge {
    /// Targeted agent names with duplicates removed, first occurrence wins
    pub fn unique_targets(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for name in &self.targeted_agents {
            if !seen.contains(&name.as_str()) {
                seen.push(name.as_str());
            }
        }
        seen
    }
}

/// The reviewer's ruling on one challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub resolution: Resolution,
    pub resolution_text: String,
}

/// One specialist's opinion as fed into the challenge phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialistOutput {
    pub agent: String,
    pub role: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_from_model() {
        assert_eq!(Severity::from_model("HIGH"), Severity::High);
        assert_eq!(Severity::from_model(" low "), Severity::Low);
        assert_eq!(Severity::from_model("critical"), Severity::Medium);
        assert_eq!(Severity::from_model(""), Severity::Medium);
    }

    #[test]
    fn test_resolution_from_model() {
        assert_eq!(Resolution::from_model("resolved"), Resolution::Resolved);
        assert_eq!(Resolution::from_model("Accepted_Risk"), Resolution::AcceptedRisk);
        assert_eq!(Resolution::from_model("maybe"), Resolution::ActionRequired);
    }

    #[test]
    fn test_serde_tags() {
        assert_eq!(
            serde_json::to_string(&Resolution::AcceptedRisk).unwrap(),
            "\"accepted_risk\""
        );
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"high\"");
        assert_eq!(Resolution::ActionRequired.to_string(), "action_required");
    }

    #[test]
    fn test_unique_targets_keeps_first_seen_order() {
        let challenge = Challenge {
            challenge_text: "c".to_string(),
            severity: Severity::Low,
            targeted_agents: vec![
                "dex".to_string(),
                "lyra".to_string(),
                "dex".to_string(),
            ],
            evidence_needed: String::new(),
        };
        assert_eq!(challenge.unique_targets(), vec!["dex", "lyra"]);
    }
}
