use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::models::chat::{ChatReply, ChatRequest};
use crate::session::SessionContext;
use crate::state::AppState;

/// POST /api/chat
///
/// Forwards one message to the career counselor. Blank messages never leave
/// this service.
pub async fn handle_chat(
    State(state): State<AppState>,
    session: SessionContext,
    Json(mut request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, AppError> {
    let trimmed = request.message.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Message cannot be empty".to_string()));
    }
    request.message = trimmed.to_string();

    let reply = state.api.chat(&request, session.token()).await?;
    Ok(Json(reply))
}
