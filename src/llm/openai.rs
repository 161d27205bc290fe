//! OpenAI-compatible completion client
//!
//! Posts to `{base_url}/chat/completions` with `stream: true` and decodes the
//! server-sent event body into [`StreamChunk`]s.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use super::{ChunkStream, CompletionRequest, CompletionUpstream, StreamChunk, UpstreamError};
use crate::{config::Config, streaming::SseLineBuffer};

/// Client for any endpoint speaking the OpenAI chat-completions protocol
pub struct OpenAiCompatibleClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiCompatibleClient {
    /// Create a new client from configuration
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self::with_endpoint(client, &config.llm_api_url, &config.llm_api_key)
    }

    pub fn with_endpoint(client: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionUpstream for OpenAiCompatibleClient {
    fn name(&self) -> &'static str {
        "openai_compatible"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn open(&self, request: &CompletionRequest) -> Result<ChunkStream, UpstreamError> {
        let url = self.chat_completions_url();
        info!(url = %url, "Opening completion stream");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(url = %url, error = %e, "Failed to send completion request");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(url = %url, status = %status, body = %body, "Completion API rejected request");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(url = %url, status = %status, "Completion stream opened");

        let stream = async_stream::stream! {
            let mut body = response.bytes_stream();
            let mut buffer = SseLineBuffer::new();
            let mut finished = false;

            while !finished {
                let lines = match body.next().await {
                    Some(Ok(bytes)) => buffer.feed(&bytes),
                    Some(Err(e)) => {
                        yield Err(UpstreamError::Http(e));
                        return;
                    }
                    None => {
                        finished = true;
                        if buffer.has_incomplete() {
                            debug!("Completion stream ended mid-line");
                        }
                        buffer.finish().into_iter().collect()
                    }
                };

                for line in lines {
                    match parse_event_line(&line) {
                        Ok(SseEvent::Delta(text)) => {
                            yield Ok(StreamChunk::new(text));
                        }
                        Ok(SseEvent::Done) => return,
                        Ok(SseEvent::Ignored) => {}
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

/// A decoded SSE line
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SseEvent {
    Delta(String),
    Done,
    /// Comments, non-data fields and usage-only chunks
    Ignored,
}

#[derive(Debug, Deserialize)]
struct ChunkPayload {
    #[serde(default)]
    choices: Vec<ChoicePayload>,
    #[serde(default)]
    error: Option<ErrorPayload>,
}

#[derive(Debug, Deserialize)]
struct ChoicePayload {
    #[serde(default)]
    delta: DeltaPayload,
}

#[derive(Debug, Default, Deserialize)]
struct DeltaPayload {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    message: String,
}

pub(crate) fn parse_event_line(line: &str) -> Result<SseEvent, UpstreamError> {
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(SseEvent::Ignored);
    };
    let data = data.trim();

    if data == "[DONE]" {
        return Ok(SseEvent::Done);
    }

    let payload: ChunkPayload =
        serde_json::from_str(data).map_err(|e| UpstreamError::Decode(e.to_string()))?;

    if let Some(error) = payload.error {
        return Err(UpstreamError::Api(error.message));
    }

    Ok(match payload.choices.into_iter().next() {
        Some(choice) => SseEvent::Delta(choice.delta.content.unwrap_or_default()),
        None => SseEvent::Ignored,
    })
}
