//! Mock OpenAI-compatible completion API
//!
//! Serves `POST /chat/completions` as a server-sent event body built from a
//! list of text deltas, the way a streaming chat-completion endpoint does.
//!
//! # Example
//!
//! ```rust,ignore
//! let llm = MockCompletionApi::start().await;
//! llm.mock_stream(&["Hola ", "mundo"]).await;
//! // Use llm.uri() as LLM_API_URL
//! ```

use serde_json::{json, Value};
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use crate::common::constants::TEST_API_KEY;

/// Mock completion API server wrapper
pub struct MockCompletionApi {
    server: MockServer,
}

impl MockCompletionApi {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL to configure the client with
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Stream the given deltas, then usage and `[DONE]`
    pub async fn mock_stream(&self, deltas: &[&str]) {
        let mut events = vec![role_event()];
        events.extend(deltas.iter().map(|d| delta_event(d)));
        events.push(usage_event());
        events.push("data: [DONE]\n\n".to_string());

        self.mount_sse(events.concat()).await;
    }

    /// Stream the given deltas, then an in-band error event
    pub async fn mock_stream_then_error(&self, deltas: &[&str], message: &str) {
        let mut events = vec![role_event()];
        events.extend(deltas.iter().map(|d| delta_event(d)));
        events.push(format!(
            "data: {}\n\n",
            json!({"error": {"message": message, "code": "Throttling"}})
        ));

        self.mount_sse(events.concat()).await;
    }

    /// Reject the request before streaming
    pub async fn mock_rejected(&self, status: u16, message: &str) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": {
                    "message": message,
                    "type": "invalid_request_error",
                    "code": "invalid_api_key"
                }
            })))
            .mount(&self.server)
            .await;
    }

    /// JSON bodies of every request received so far
    pub async fn received_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| request.body_json::<Value>().expect("request body is JSON"))
            .collect()
    }

    async fn mount_sse(&self, body: String) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", format!("Bearer {}", TEST_API_KEY).as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "text/event-stream")
                    .insert_header("Cache-Control", "no-cache")
                    .set_body_string(body),
            )
            .mount(&self.server)
            .await;
    }
}

fn role_event() -> String {
    format!(
        "data: {}\n\n",
        json!({
            "id": "chatcmpl-test",
            "object": "chat.completion.chunk",
            "choices": [{"index": 0, "delta": {"role": "assistant", "content": ""}, "finish_reason": null}]
        })
    )
}

fn delta_event(text: &str) -> String {
    format!(
        "data: {}\n\n",
        json!({
            "id": "chatcmpl-test",
            "object": "chat.completion.chunk",
            "choices": [{"index": 0, "delta": {"content": text}, "finish_reason": null}]
        })
    )
}

fn usage_event() -> String {
    format!(
        "data: {}\n\n",
        json!({
            "id": "chatcmpl-test",
            "object": "chat.completion.chunk",
            "choices": [],
            "usage": {"prompt_tokens": 120, "completion_tokens": 12, "total_tokens": 132}
        })
    )
}
