//! Session domain.
//!
//! - [`records`]: what a model call leaves behind (sessions, challenges,
//!   verdicts, usage)
//! - [`cost`]: token pricing
//! - [`stream`]: events of a streaming model response

pub mod cost;
pub mod records;
pub mod stream;

pub use cost::TokenRates;
pub use records::{CallKind, ChallengeRecord, SessionRecord, UsageRecord, VerdictRecord};
pub use stream::StreamEvent;
