//! Presentation layer for boomerang
//!
//! This crate contains CLI definitions, output formatters,
//! progress reporters, and the streaming chat interface.

pub mod chat;
pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::{ChatSession, ChatTurn, TurnEnd};
pub use cli::commands::{Cli, Command, ConfigAction, ContextArgs, OutputFormat};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
