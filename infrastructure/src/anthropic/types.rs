//! Wire types of the Messages API and error classification

use boomerang_application::GatewayError;
use serde::{Deserialize, Serialize};

/// Request body of `POST /v1/messages`
#[derive(Debug, Serialize)]
pub struct MessagesRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub system: &'a str,
    pub messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub struct Message<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// Response body of a non-streaming call
#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub usage: Usage,
}

impl MessagesResponse {
    /// Text of the first text block; empty when the model returned none
    pub fn first_text(&self) -> &str {
        self.content
            .iter()
            .find(|b| b.kind == "text")
            .and_then(|b| b.text.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiError {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
pub struct MessageStart {
    #[serde(default)]
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct BlockDelta {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

/// One `data:` payload of the event stream
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamPayload {
    MessageStart { message: MessageStart },
    ContentBlockDelta { delta: BlockDelta },
    MessageDelta {
        #[serde(default)]
        usage: Usage,
    },
    MessageStop,
    Error { error: ApiError },
    #[serde(other)]
    Other,
}

/// Map a non-success HTTP response to a gateway error.
///
/// | Condition | Error |
/// |-----------|-------|
/// | 401, 403, `authentication_error` | `Authentication` |
/// | 402, body mentions the credit balance | `CreditExhausted` |
/// | 429 | `RateLimited` |
/// | 408, 504 | `Timeout` |
/// | anything else | `RequestFailed` |
pub fn classify_http_error(status: u16, body: &str) -> GatewayError {
    let api_error = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error)
        .unwrap_or_default();
    let message = if api_error.message.is_empty() {
        body.trim().to_string()
    } else {
        api_error.message.clone()
    };

    if status == 401 || status == 403 || api_error.kind == "authentication_error" {
        return GatewayError::Authentication(message);
    }
    if status == 402 || mentions_credit_balance(body) {
        return GatewayError::CreditExhausted(message);
    }
    match status {
        429 => GatewayError::RateLimited(message),
        408 | 504 => GatewayError::Timeout,
        _ => GatewayError::RequestFailed(format!("HTTP {}: {}", status, message)),
    }
}

/// Map an `error` event received mid-stream
pub fn classify_stream_error(error: &ApiError) -> GatewayError {
    match error.kind.as_str() {
        "authentication_error" => GatewayError::Authentication(error.message.clone()),
        "rate_limit_error" => GatewayError::RateLimited(error.message.clone()),
        _ if mentions_credit_balance(&error.message) => {
            GatewayError::CreditExhausted(error.message.clone())
        }
        _ => GatewayError::RequestFailed(format!("{}: {}", error.kind, error.message)),
    }
}

fn mentions_credit_balance(text: &str) -> bool {
    text.to_lowercase().contains("credit balance")
}
