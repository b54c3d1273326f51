//! Legal question endpoint

use axum::extract::State;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, AskRequest, AskResponse, Json};

/// POST /v1/legal/ask
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    debug!(
        session_id = ?request.session_id,
        chars = request.question.chars().count(),
        "Legal question received"
    );

    let turn = state
        .conversation
        .ask(&request.question, request.session_id.as_deref())
        .await?;

    Ok(Json(AskResponse::from_turn(turn, request.include_trace)))
}
