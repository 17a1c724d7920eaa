//! Streaming events for model responses.

use crate::orchestration::FailureClass;

/// An event in a streaming model response.
///
/// Bridges the provider's transport-level stream (e.g. SSE chunks) to the
/// application layer. `Completed` and `Error` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text chunk from the model
    Delta(String),
    /// End of stream with final token usage
    Completed {
        input_tokens: u32,
        output_tokens: u32,
    },
    /// The provider failed mid-stream; the classification survives the
    /// channel so a fatal cause stays fatal
    Error {
        classification: FailureClass,
        message: String,
    },
}

impl StreamEvent {
    /// Returns the text content if this is a Delta event.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Completed { .. } | StreamEvent::Error { .. })
    }
}
