//! LLM Gateway port
//!
//! Defines the interface for communicating with the language-model provider.

use async_trait::async_trait;
use boomerang_domain::{FailureClass, FatalKind, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Credit balance exhausted: {0}")]
    CreditExhausted(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Transport closed")]
    TransportClosed,

    #[error("Other error: {0}")]
    Other(String),
}

impl GatewayError {
    /// Only rejected credentials and exhausted credit stop a whole run;
    /// everything else is confined to the failing call.
    pub fn classify(&self) -> FailureClass {
        match self {
            GatewayError::Authentication(_) => FailureClass::Fatal(FatalKind::Authentication),
            GatewayError::CreditExhausted(_) => FailureClass::Fatal(FatalKind::CreditBalance),
            _ => FailureClass::Recoverable,
        }
    }

    /// Provider detail without the variant prefix
    fn detail(&self) -> String {
        match self {
            GatewayError::Authentication(m)
            | GatewayError::CreditExhausted(m)
            | GatewayError::RateLimited(m)
            | GatewayError::RequestFailed(m)
            | GatewayError::Other(m) => m.clone(),
            GatewayError::Timeout | GatewayError::TransportClosed => self.to_string(),
        }
    }

    /// Terminal stream event for a failure that happens after the stream
    /// was handed out
    pub fn to_stream_event(&self) -> StreamEvent {
        StreamEvent::Error {
            classification: self.classify(),
            message: self.detail(),
        }
    }

    /// Rebuild an error from a terminal stream event, keeping fatal causes
    /// fatal
    pub fn from_stream_failure(classification: FailureClass, message: String) -> Self {
        match classification {
            FailureClass::Fatal(FatalKind::Authentication) => GatewayError::Authentication(message),
            FailureClass::Fatal(FatalKind::CreditBalance) => GatewayError::CreditExhausted(message),
            FailureClass::Recoverable => GatewayError::RequestFailed(message),
        }
    }
}

/// One non-streaming or streaming model call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Agent on whose behalf the call is made (for logging and test doubles)
    pub agent: String,
    pub model: String,
    pub system_prompt: String,
    pub message: String,
    pub max_tokens: u32,
}

/// A complete model answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Gateway for LLM communication
///
/// This port defines how the application layer communicates with the model
/// provider. Implementations (adapters) live in the infrastructure layer and
/// must map authentication and credit failures to their dedicated variants so
/// callers can classify them.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send a request and wait for the full answer
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, GatewayError>;

    /// Send a request and receive the answer as a stream of deltas.
    ///
    /// Default implementation calls `complete()` and replays the result as a
    /// single delta followed by `Completed`.
    async fn stream(&self, request: &CompletionRequest) -> Result<StreamHandle, GatewayError> {
        let completion = self.complete(request).await?;
        let (tx, rx) = mpsc::channel(2);
        // Receiver may already be gone; nothing to do then
        let _ = tx.send(StreamEvent::Delta(completion.text)).await;
        let _ = tx
            .send(StreamEvent::Completed {
                input_tokens: completion.input_tokens,
                output_tokens: completion.output_tokens,
            })
            .await;
        Ok(StreamHandle::new(rx))
    }
}

/// Handle for receiving streaming events from a model call.
///
/// Wraps an `mpsc::Receiver<StreamEvent>` and provides convenience methods
/// for consuming the stream.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Next event, or `None` once the sender is gone
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }

    /// Consume the stream and collect all text into a single completion.
    pub async fn collect(mut self) -> Result<Completion, GatewayError> {
        let mut text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => text.push_str(&chunk),
                StreamEvent::Completed {
                    input_tokens,
                    output_tokens,
                } => {
                    return Ok(Completion {
                        text,
                        input_tokens,
                        output_tokens,
                    });
                }
                StreamEvent::Error {
                    classification,
                    message,
                } => return Err(GatewayError::from_stream_failure(classification, message)),
            }
        }
        Err(GatewayError::TransportClosed)
    }
}
