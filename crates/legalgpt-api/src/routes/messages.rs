use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use legalgpt_persist::StoredMessage;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::routes::threads::OwnerQuery;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub role: &'static str,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_data: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl From<StoredMessage> for MessageResponse {
    fn from(message: StoredMessage) -> Self {
        Self {
            id: message.id,
            role: message.role.as_str(),
            content: message.content,
            tool_name: message.tool_name,
            tool_data: message.tool_data,
            created_at: message.created_at,
        }
    }
}

pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Query(query): Query<OwnerQuery>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    if !state
        .store
        .verify_ownership(&thread_id, &query.user_id)
        .await?
    {
        return Err(ApiError::ThreadNotFound(thread_id));
    }

    let messages = state.store.list_messages(&thread_id).await?;
    Ok(Json(messages.into_iter().map(Into::into).collect()))
}
