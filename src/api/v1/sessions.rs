//! Session endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, SessionResponse};

/// GET /v1/sessions/{session_id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let record = state
        .conversation
        .session(&session_id)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!("Session '{}' not found", session_id))
                .with_param("session_id")
        })?;

    Ok(Json(SessionResponse::from(record)))
}

/// DELETE /v1/sessions/{session_id}
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.conversation.end_session(&session_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("Session '{}' not found", session_id))
            .with_param("session_id"))
    }
}
