use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use legalgpt_persist::{Thread, DEFAULT_THREAD_TITLE};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateThreadRequest {
    pub user_id: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ListThreadsQuery {
    pub user_id: String,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Serialize)]
pub struct ThreadResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Thread> for ThreadResponse {
    fn from(thread: Thread) -> Self {
        Self {
            id: thread.id,
            user_id: thread.user_id,
            title: thread.title,
            created_at: thread.created_at,
            updated_at: thread.updated_at,
        }
    }
}

pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateThreadRequest>,
) -> ApiResult<(StatusCode, Json<ThreadResponse>)> {
    if req.user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("user_id is required".to_string()));
    }

    let title = req
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_THREAD_TITLE);

    let thread = state.store.create_thread(&req.user_id, title).await?;
    Ok((StatusCode::CREATED, Json(thread.into())))
}

pub async fn list_threads(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListThreadsQuery>,
) -> ApiResult<Json<Vec<ThreadResponse>>> {
    let threads = state
        .store
        .list_threads(&query.user_id, query.limit.clamp(1, 200))
        .await?;
    Ok(Json(threads.into_iter().map(Into::into).collect()))
}

pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Query(query): Query<OwnerQuery>,
) -> ApiResult<Json<ThreadResponse>> {
    // A thread owned by someone else looks identical to a missing one.
    if !state
        .store
        .verify_ownership(&thread_id, &query.user_id)
        .await?
    {
        return Err(ApiError::ThreadNotFound(thread_id));
    }

    let thread = state
        .store
        .get_thread(&thread_id)
        .await?
        .ok_or(ApiError::ThreadNotFound(thread_id))?;
    Ok(Json(thread.into()))
}

pub async fn delete_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Query(query): Query<OwnerQuery>,
) -> ApiResult<StatusCode> {
    if !state
        .store
        .verify_ownership(&thread_id, &query.user_id)
        .await?
    {
        return Err(ApiError::ThreadNotFound(thread_id));
    }

    state.store.delete_thread(&thread_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
