//! Streaming chat with a single agent

pub mod session;

pub use session::{ChatSession, ChatTurn, TurnEnd};
