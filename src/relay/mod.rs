//! Completion relay
//!
//! Opens one streaming completion per call and forwards each non-empty delta
//! to a [`ChunkSink`] in arrival order. A chunk is handed to the sink, and the
//! sink has accepted it, before the next chunk is requested from upstream, so
//! delivery is paced by whoever drains the sink.
//!
//! Relaying happens in two steps. [`CompletionRelay::open`] issues the request
//! and fails with [`RelayError::RequestSetup`] before anything is delivered;
//! [`OpenRelay::forward`] then pumps chunks and fails with
//! [`RelayError::Stream`] if the upstream breaks mid-way. Chunks delivered
//! before such a failure stay delivered. There are no retries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};

use crate::llm::{
    ChatMessage, ChunkStream, CompletionRequest, CompletionUpstream, StreamOptions,
};
use crate::routes::metrics::record_chunks_relayed;

/// Sampling temperature for every relay. Kept low for factual summaries.
pub const TEMPERATURE: f32 = 0.2;

/// Relay failures
#[derive(Debug, Error)]
pub enum RelayError {
    /// The upstream rejected or never answered the request. Nothing was delivered.
    #[error("Upstream request failed: {0}")]
    RequestSetup(String),

    /// The upstream failed after the stream started.
    #[error("Stream error from upstream: {0}")]
    Stream(String),

    /// The sink's receiver went away; the upstream read was abandoned.
    #[error("Client disconnected")]
    ClientDisconnected,
}

/// Returned by a sink whose consumer is gone
#[derive(Debug, Error)]
#[error("chunk sink closed")]
pub struct SinkClosed;

/// Receiver of relayed text
#[async_trait]
pub trait ChunkSink: Send {
    /// Accept one delta. Must not return until the delta has been taken.
    async fn deliver(&mut self, delta: &str) -> Result<(), SinkClosed>;

    /// Resolves once the consumer is gone. Sinks that cannot tell never resolve.
    async fn closed(&mut self) {
        futures::future::pending::<()>().await
    }
}

#[async_trait]
impl<F> ChunkSink for F
where
    F: FnMut(&str) + Send,
{
    async fn deliver(&mut self, delta: &str) -> Result<(), SinkClosed> {
        (self)(delta);
        Ok(())
    }
}

/// Sink backed by a bounded channel, drained by an HTTP response body
pub struct ChannelSink {
    tx: mpsc::Sender<Bytes>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Bytes>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl ChunkSink for ChannelSink {
    async fn deliver(&mut self, delta: &str) -> Result<(), SinkClosed> {
        self.tx
            .send(Bytes::copy_from_slice(delta.as_bytes()))
            .await
            .map_err(|_| SinkClosed)
    }

    async fn closed(&mut self) {
        self.tx.closed().await
    }
}

/// Build the streaming request: system message first, then user.
pub fn completion_request(
    model: &str,
    system_prompt: &str,
    user_prompt: &str,
    max_tokens: u32,
) -> CompletionRequest {
    CompletionRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_prompt),
        ],
        temperature: TEMPERATURE,
        max_tokens,
        stream: true,
        stream_options: Some(StreamOptions {
            include_usage: true,
        }),
        enable_thinking: Some(false),
    }
}

/// Relays completions from one upstream, each call bounded by a deadline
#[derive(Clone)]
pub struct CompletionRelay {
    upstream: Arc<dyn CompletionUpstream>,
    timeout: Duration,
}

impl CompletionRelay {
    pub fn new(upstream: Arc<dyn CompletionUpstream>, timeout: Duration) -> Self {
        Self { upstream, timeout }
    }

    /// Open the upstream stream. The deadline starts now and also bounds the
    /// subsequent [`OpenRelay::forward`].
    pub async fn open(&self, request: &CompletionRequest) -> Result<OpenRelay, RelayError> {
        let started = Instant::now();
        let deadline = started + self.timeout;

        info!(
            upstream = %self.upstream.name(),
            model = %request.model,
            max_tokens = request.max_tokens,
            "Opening relay"
        );

        match timeout_at(deadline, self.upstream.open(request)).await {
            Ok(Ok(stream)) => Ok(OpenRelay {
                stream,
                started,
                deadline,
                timeout: self.timeout,
            }),
            Ok(Err(e)) => {
                warn!(error = %e, "Relay request failed");
                Err(RelayError::RequestSetup(e.to_string()))
            }
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Relay request timed out");
                Err(RelayError::RequestSetup(format!(
                    "no response within {}s",
                    self.timeout.as_secs()
                )))
            }
        }
    }

    /// Open and forward in one call, resolving with the full text
    pub async fn relay<S>(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        sink: &mut S,
    ) -> Result<String, RelayError>
    where
        S: ChunkSink + ?Sized,
    {
        let request = completion_request(model, system_prompt, user_prompt, max_tokens);
        self.open(&request).await?.forward(sink).await
    }
}

/// An upstream stream that has been accepted and not yet consumed
pub struct OpenRelay {
    stream: ChunkStream,
    started: Instant,
    deadline: Instant,
    timeout: Duration,
}

impl OpenRelay {
    /// Pump chunks into `sink` until end of stream; resolves with the
    /// concatenated text. Dropping the upstream stream on any exit closes the
    /// upstream connection.
    pub async fn forward<S>(mut self, sink: &mut S) -> Result<String, RelayError>
    where
        S: ChunkSink + ?Sized,
    {
        let mut text = String::new();
        let mut chunks = 0u64;
        let deadline = self.deadline;

        let pump = async {
            loop {
                // A silent upstream must not keep a departed client's relay alive
                let item = tokio::select! {
                    biased;
                    _ = sink.closed() => return Err(RelayError::ClientDisconnected),
                    item = self.stream.next() => item,
                };
                let Some(item) = item else { break };
                let chunk = item.map_err(|e| RelayError::Stream(e.to_string()))?;
                if chunk.delta_text.is_empty() {
                    continue;
                }
                sink.deliver(&chunk.delta_text)
                    .await
                    .map_err(|_| RelayError::ClientDisconnected)?;
                text.push_str(&chunk.delta_text);
                chunks += 1;
            }
            Ok::<(), RelayError>(())
        };
        let outcome = timeout_at(deadline, pump).await;

        record_chunks_relayed(chunks);
        let elapsed_ms = self.started.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(())) => {
                info!(chunks, chars = text.len(), elapsed_ms, "Relay completed");
                Ok(text)
            }
            Ok(Err(RelayError::ClientDisconnected)) => {
                info!(chunks, elapsed_ms, "Client went away, abandoning upstream stream");
                Err(RelayError::ClientDisconnected)
            }
            Ok(Err(e)) => {
                warn!(chunks, elapsed_ms, error = %e, "Relay aborted mid-stream");
                Err(e)
            }
            Err(_) => {
                warn!(chunks, elapsed_ms, "Relay deadline exceeded mid-stream");
                Err(RelayError::Stream(format!(
                    "no end of stream within {}s",
                    self.timeout.as_secs()
                )))
            }
        }
    }
}
