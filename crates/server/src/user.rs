//! The current user.

use axum::{Extension, extract::State, http::StatusCode};

use crate::{
    ServerError,
    server::{ServerState, Session},
};

/// Deletes the authenticated user and everything they own.
pub async fn delete(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_user(session.user_id()).await?;
    tracing::info!("deleted user {}", session.username());
    Ok(StatusCode::NO_CONTENT)
}
