use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header::{HeaderName, CACHE_CONTROL, CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::Json;
use futures::StreamExt;
use legalgpt_agent::encode_frame;
use serde::Deserialize;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub user_id: String,
    pub content: String,
}

/// Submit a message and stream the turn back as Server-Sent Events.
///
/// The stream always ends with exactly one `message_end` or `error` event;
/// empty input is reported over the stream, not as an HTTP status.
pub async fn send_message_stream(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    if !state
        .store
        .verify_ownership(&thread_id, &req.user_id)
        .await?
    {
        return Err(ApiError::ThreadNotFound(thread_id));
    }

    let receiver = state
        .orchestrator
        .spawn_turn(&thread_id, &req.user_id, &req.content);

    // One frame encoder for both the wire and the tests.
    let body = Body::from_stream(
        ReceiverStream::new(receiver).map(|event| Ok::<_, Infallible>(encode_frame(&event))),
    );

    // Proxies must not buffer the stream.
    let headers = [
        (CONTENT_TYPE, "text/event-stream"),
        (CACHE_CONTROL, "no-cache"),
        (HeaderName::from_static("x-accel-buffering"), "no"),
    ];

    Ok((headers, body))
}
