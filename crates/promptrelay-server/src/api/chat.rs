//! Chat relay endpoint.
//!
//! Bridges the backend's newline-delimited JSON stream onto a server-sent
//! event response: each decoded fragment becomes one `data:` event the
//! moment it arrives, and the stream always ends with a single `[DONE]`
//! marker so the widget can detect completion on every path.

use std::convert::Infallible;

use async_stream::stream;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};
use promptrelay_ai::FragmentStream;
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use crate::api::response::ErrorResponse;
use crate::api::state::AppState;
use crate::events::{AssistantEvent, AssistantEvents};

const DONE_MARKER: &str = "[DONE]";
const INTERRUPTED_MARKER: &str = "ERROR: Stream interrupted";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

// POST /api/chat
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, (StatusCode, Json<ErrorResponse>)> {
    if request.message.trim().is_empty() {
        return Err(ErrorResponse::with_status(
            StatusCode::BAD_REQUEST,
            "Message is required",
        ));
    }
    if request.message.len() > state.config.max_prompt_len {
        return Err(ErrorResponse::with_status(
            StatusCode::BAD_REQUEST,
            "Prompt too long",
        ));
    }

    debug!(bytes = request.message.len(), "forwarding prompt to generation backend");

    let upstream = match state.ollama.generate_stream(&request.message).await {
        Ok(upstream) => upstream,
        Err(err) => {
            error!("failed to reach generation backend: {err}");
            return Err(ErrorResponse::with_status(
                StatusCode::BAD_GATEWAY,
                "Failed to connect to AI service",
            ));
        }
    };

    state.events.publish(AssistantEvent::StreamStarted {
        prompt_chars: request.message.chars().count(),
    });

    let frames = relay_frames(upstream, state.events.clone())
        .map(|payload| Ok::<_, Infallible>(Event::default().data(payload)));
    Ok(Sse::new(frames))
}

/// Translate upstream fragments into SSE data payloads.
///
/// Fragment text is forwarded as soon as it decodes. The `[DONE]` marker is
/// yielded from exactly one place, after the loop has finished for whatever
/// reason: completion signal, upstream body ending early, or a read failure
/// (which first yields an inline `ERROR:` payload so the widget can show the
/// break). Nothing follows the marker.
fn relay_frames(
    mut upstream: FragmentStream,
    events: AssistantEvents,
) -> impl Stream<Item = String> + Send {
    stream! {
        let mut interrupted = false;

        while let Some(item) = upstream.next().await {
            match item {
                Ok(fragment) => {
                    if !fragment.response.is_empty() {
                        yield fragment.response;
                    }
                    if fragment.done {
                        break;
                    }
                }
                Err(err) => {
                    error!("generation stream interrupted: {err}");
                    yield INTERRUPTED_MARKER.to_string();
                    interrupted = true;
                    break;
                }
            }
        }

        if interrupted {
            events.publish(AssistantEvent::StreamFailed {
                reason: "generation stream interrupted".to_string(),
            });
        } else {
            events.publish(AssistantEvent::StreamCompleted);
        }

        yield DONE_MARKER.to_string();
    }
}

// GET /api/chat/events
pub async fn chat_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut receiver = state.events.subscribe();

    let stream = stream! {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Ok(sse) = Event::default().json_data(&event) {
                        yield Ok::<_, Infallible>(sse);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "assistant event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
