//! Debate domain
//!
//! Records produced by the reviewer's challenge → response → verdict flow
//! and the tolerant parsers that turn model output into them.

pub mod entities;
pub mod parsing;

pub use entities::{Challenge, Resolution, Severity, SpecialistOutput, Verdict};
pub use parsing::{
    ReviewParseError, fallback_challenge, fallback_verdict, parse_challenges, parse_verdict,
    strip_code_fence, try_parse_challenges, try_parse_verdict,
};
