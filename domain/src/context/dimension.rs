//! Classification axes for a run

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Domain dimension of the subject under review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Architecture,
    Design,
    Engineering,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [
        Dimension::Architecture,
        Dimension::Design,
        Dimension::Engineering,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Architecture => "architecture",
            Dimension::Design => "design",
            Dimension::Engineering => "engineering",
        }
    }

    /// Capitalized label used in prompts
    pub fn title(&self) -> &'static str {
        match self {
            Dimension::Architecture => "Architecture",
            Dimension::Design => "Design",
            Dimension::Engineering => "Engineering",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Dimension {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "architecture" => Ok(Dimension::Architecture),
            "design" => Ok(Dimension::Design),
            "engineering" => Ok(Dimension::Engineering),
            other => Err(DomainError::InvalidDimension(other.to_string())),
        }
    }
}

/// Process phase the panel is working in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessPhase {
    Generate,
    Review,
    Validate,
    Summarize,
}

impl ProcessPhase {
    pub const ALL: [ProcessPhase; 4] = [
        ProcessPhase::Generate,
        ProcessPhase::Review,
        ProcessPhase::Validate,
        ProcessPhase::Summarize,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessPhase::Generate => "generate",
            ProcessPhase::Review => "review",
            ProcessPhase::Validate => "validate",
            ProcessPhase::Summarize => "summarize",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ProcessPhase::Generate => "Generate",
            ProcessPhase::Review => "Review",
            ProcessPhase::Validate => "Validate",
            ProcessPhase::Summarize => "Summarize",
        }
    }
}

impl std::fmt::Display for ProcessPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProcessPhase {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generate" => Ok(ProcessPhase::Generate),
            "review" => Ok(ProcessPhase::Review),
            "validate" => Ok(ProcessPhase::Validate),
            "summarize" => Ok(ProcessPhase::Summarize),
            other => Err(DomainError::InvalidPhase(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_roundtrip() {
        for dimension in Dimension::ALL {
            let parsed: Dimension = dimension.as_str().parse().unwrap();
            assert_eq!(parsed, dimension);
        }
    }

    #[test]
    fn test_phase_roundtrip() {
        for phase in ProcessPhase::ALL {
            let parsed: ProcessPhase = phase.to_string().parse().unwrap();
            assert_eq!(parsed, phase);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Design".parse::<Dimension>().unwrap(), Dimension::Design);
        assert_eq!(
            " SUMMARIZE ".parse::<ProcessPhase>().unwrap(),
            ProcessPhase::Summarize
        );
    }

    #[test]
    fn test_parse_rejects_unknown_values() {
        assert_eq!(
            "marketing".parse::<Dimension>().unwrap_err(),
            DomainError::InvalidDimension("marketing".to_string())
        );
        assert!("deploy".parse::<ProcessPhase>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&Dimension::Engineering).unwrap();
        assert_eq!(json, "\"engineering\"");
        let phase: ProcessPhase = serde_json::from_str("\"validate\"").unwrap();
        assert_eq!(phase, ProcessPhase::Validate);
    }
}
