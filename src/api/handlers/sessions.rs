//! Session management endpoints for the authenticated user.

use axum::{
    Json,
    extract::{Extension, Path},
    response::IntoResponse,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::auth::{
    ApiError, Authenticated,
    storage::{delete_user_session, list_user_sessions},
    types::{MessageResponse, SessionResponse},
};

/// List the user's active sessions, newest first.
#[utoipa::path(
    get,
    path = "/sessions",
    responses(
        (status = 200, description = "Active sessions", body = [SessionResponse]),
        (status = 401, description = "Not authorized")
    ),
    tag = "user"
)]
pub async fn list_sessions(
    auth: Authenticated,
    pool: Extension<PgPool>,
) -> Result<impl IntoResponse, ApiError> {
    let sessions = list_user_sessions(&pool, auth.claims.user_id).await?;

    let sessions: Vec<SessionResponse> = sessions
        .into_iter()
        .map(|session| SessionResponse {
            id: session.id,
            user_agent: session.user_agent,
            created_at: session.created_at,
            is_current: session.id == auth.claims.session_id,
        })
        .collect();

    Ok(Json(sessions))
}

/// Revoke one of the user's sessions by id.
///
/// Ownership is enforced in the delete itself, so revoking another user's
/// session id reads as not found.
#[utoipa::path(
    delete,
    path = "/sessions/{id}",
    params(
        ("id" = Uuid, Path, description = "Session id to revoke")
    ),
    responses(
        (status = 200, description = "Session removed", body = MessageResponse),
        (status = 401, description = "Not authorized"),
        (status = 404, description = "Session not found")
    ),
    tag = "user"
)]
pub async fn remove_session(
    auth: Authenticated,
    Path(id): Path<Uuid>,
    pool: Extension<PgPool>,
) -> Result<impl IntoResponse, ApiError> {
    if !delete_user_session(&pool, id, auth.claims.user_id).await? {
        return Err(ApiError::NotFound("Session not found".to_string()));
    }

    Ok(Json(MessageResponse::new("Session removed")))
}
