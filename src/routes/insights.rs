//! Flight insight endpoints
//!
//! `POST /home/ia/resumen-vuelos` and `POST /home/ia/alertas-vuelos` load the
//! active records, build the prompt for the requested kind and stream the
//! model's answer back as raw text.
//!
//! Everything up to opening the upstream stream can still fail with a `500`.
//! Once the `200` headers are out, a mid-stream failure can only be reported
//! by appending the error text to the body after the partial output.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::Response,
    Extension, Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

use crate::{
    error::{AppError, AppResult},
    middleware::auth::AuthenticatedSession,
    prompts::{self, PromptFamily},
    relay::{completion_request, ChannelSink, RelayError},
    routes::metrics::record_insight_request,
    AppState,
};

/// Insight request body
#[derive(Debug, Default, Deserialize)]
pub struct InsightRequest {
    #[serde(rename = "promptType", default)]
    pub prompt_type: Option<String>,
}

/// Stream a flight summary
pub async fn flight_summary(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthenticatedSession>,
    body: Option<Json<InsightRequest>>,
) -> AppResult<Response> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    stream_insight(state, session, PromptFamily::Summary, request).await
}

/// Stream flight alerts
pub async fn flight_alerts(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthenticatedSession>,
    body: Option<Json<InsightRequest>>,
) -> AppResult<Response> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    stream_insight(state, session, PromptFamily::Alerts, request).await
}

fn insight_error(family: PromptFamily, message: impl ToString) -> AppError {
    AppError::InsightFailed {
        action: family.action(),
        message: message.to_string(),
    }
}

#[instrument(
    skip_all,
    fields(family = family.label(), username = %session.username, prompt_type = ?request.prompt_type)
)]
async fn stream_insight(
    state: Arc<AppState>,
    session: AuthenticatedSession,
    family: PromptFamily,
    request: InsightRequest,
) -> AppResult<Response> {
    let started = Instant::now();
    let endpoint = family.label();

    let (flights, airlines, airports) = tokio::try_join!(
        state.store.active_flights(),
        state.store.active_airlines(),
        state.store.active_airports(),
    )
    .map_err(|e| {
        record_insight_request(endpoint, "setup_failed", started.elapsed().as_secs_f64());
        insight_error(family, e)
    })?;

    let prompt = prompts::build(
        family,
        request.prompt_type.as_deref().unwrap_or_default(),
        &flights,
        &airlines,
        &airports,
    );
    let completion = completion_request(
        &state.config.llm_model,
        &prompt.system,
        &prompt.user,
        state.config.llm_max_tokens,
    );

    let open = state.relay.open(&completion).await.map_err(|e| {
        record_insight_request(endpoint, "setup_failed", started.elapsed().as_secs_f64());
        insight_error(family, e)
    })?;

    info!(flights = flights.len(), "Insight stream opened");

    let (tx, mut rx) = mpsc::channel::<Bytes>(1);
    let trailer_tx = tx.clone();

    tokio::spawn(async move {
        let mut sink = ChannelSink::new(tx);
        let outcome = match open.forward(&mut sink).await {
            Ok(_) => "completed",
            Err(RelayError::ClientDisconnected) => "disconnected",
            Err(e) => {
                let trailer = insight_error(family, e).to_string();
                if trailer_tx.send(Bytes::from(trailer)).await.is_err() {
                    warn!("Client gone before the stream error could be reported");
                }
                "stream_failed"
            }
        };
        record_insight_request(endpoint, outcome, started.elapsed().as_secs_f64());
    });

    let body = async_stream::stream! {
        while let Some(bytes) = rx.recv().await {
            yield Ok::<Bytes, Infallible>(bytes);
        }
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .header("X-Accel-Buffering", "no")
        .body(Body::from_stream(body))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build response: {}", e)))
}
