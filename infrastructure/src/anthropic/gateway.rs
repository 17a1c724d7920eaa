//! Messages API gateway

use super::types::{
    Message, MessagesRequest, MessagesResponse, StreamPayload, Usage, classify_http_error,
    classify_stream_error,
};
use async_trait::async_trait;
use boomerang_application::{
    Completion, CompletionRequest, GatewayError, LlmGateway, StreamHandle,
};
use boomerang_domain::StreamEvent;
use eventsource_stream::{EventStreamError, Eventsource};
use futures::{Stream, StreamExt};
use std::pin::pin;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

/// Connection settings of the gateway
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub base_url: String,
    pub api_version: String,
    /// Upper bound of a single HTTP exchange, streaming included
    pub request_timeout: Duration,
}

impl AnthropicConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            request_timeout: Duration::from_secs(300),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// [`LlmGateway`] backed by the Anthropic Messages API
pub struct AnthropicGateway {
    client: reqwest::Client,
    config: AnthropicConfig,
}

impl AnthropicGateway {
    pub fn new(config: AnthropicConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayError::Other(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Use a preconfigured client (proxy settings, TLS roots)
    pub fn with_client(client: reqwest::Client, config: AnthropicConfig) -> Self {
        Self { client, config }
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }

    /// POST the request; non-success statuses are classified here
    async fn post(
        &self,
        request: &CompletionRequest,
        stream: bool,
    ) -> Result<reqwest::Response, GatewayError> {
        let body = MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            system: &request.system_prompt,
            messages: vec![Message {
                role: "user",
                content: &request.message,
            }],
            stream,
        };

        debug!(
            "POST {} agent={} model={} stream={}",
            self.messages_url(),
            request.agent,
            request.model,
            stream
        );

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", &self.config.api_version)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = classify_http_error(status.as_u16(), &body);
            warn!("Anthropic API error for {} ({}): {}", request.agent, status, error);
            return Err(error);
        }
        Ok(response)
    }
}

fn transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}

#[async_trait]
impl LlmGateway for AnthropicGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, GatewayError> {
        let response = self.post(request, false).await?;
        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::RequestFailed(format!("Invalid response body: {}", e)))?;

        Ok(Completion {
            text: parsed.first_text().to_string(),
            input_tokens: parsed.usage.input_tokens,
            output_tokens: parsed.usage.output_tokens,
        })
    }

    async fn stream(&self, request: &CompletionRequest) -> Result<StreamHandle, GatewayError> {
        let response = self.post(request, true).await?;
        let (tx, rx) = mpsc::channel(64);
        let agent = request.agent.clone();
        let body = response.bytes_stream().map(|chunk| chunk.map_err(transport_error));

        tokio::spawn(forward_events(body, tx, agent));

        Ok(StreamHandle::new(rx))
    }
}

/// Decode the SSE body and forward translated events until a terminal one.
///
/// A body that ends without `message_stop` just drops `tx`, so the consumer
/// sees a closed transport.
async fn forward_events<S, B>(body: S, tx: mpsc::Sender<StreamEvent>, agent: String)
where
    S: Stream<Item = Result<B, GatewayError>>,
    B: AsRef<[u8]>,
{
    let mut events = pin!(body.eventsource());
    let mut usage = Usage::default();

    while let Some(event) = events.next().await {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                let error = match e {
                    EventStreamError::Transport(e) => e,
                    other => GatewayError::RequestFailed(format!("Malformed event stream: {}", other)),
                };
                warn!("Stream for {} failed: {}", agent, error);
                let _ = tx.send(error.to_stream_event()).await;
                return;
            }
        };

        let Some(item) = translate(&event.data, &mut usage) else {
            continue;
        };
        let terminal = item.is_terminal();
        if tx.send(item).await.is_err() {
            debug!("Stream receiver for {} dropped", agent);
            return;
        }
        if terminal {
            return;
        }
    }

    warn!("Stream for {} ended before message_stop", agent);
}

/// Turn one event payload into a stream event, tracking usage on the way
fn translate(data: &str, usage: &mut Usage) -> Option<StreamEvent> {
    let payload: StreamPayload = match serde_json::from_str(data) {
        Ok(payload) => payload,
        Err(e) => {
            debug!("Skipping unparseable stream event: {}", e);
            return None;
        }
    };

    match payload {
        StreamPayload::MessageStart { message } => {
            usage.input_tokens = message.usage.input_tokens;
            None
        }
        StreamPayload::ContentBlockDelta { delta } if delta.kind == "text_delta" => {
            Some(StreamEvent::Delta(delta.text))
        }
        StreamPayload::ContentBlockDelta { .. } => None,
        StreamPayload::MessageDelta { usage: delta } => {
            usage.output_tokens = delta.output_tokens;
            None
        }
        StreamPayload::MessageStop => Some(StreamEvent::Completed {
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
        }),
        StreamPayload::Error { error } => Some(classify_stream_error(&error).to_stream_event()),
        StreamPayload::Other => None,
    }
}
