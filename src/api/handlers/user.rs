//! Current user endpoint.

use axum::{Json, extract::Extension, response::IntoResponse};
use sqlx::PgPool;

use super::auth::{ApiError, Authenticated, storage::lookup_user, types::UserResponse};

/// Return the authenticated user's profile.
#[utoipa::path(
    get,
    path = "/user",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authorized"),
        (status = 404, description = "User not found")
    ),
    tag = "user"
)]
pub async fn get_user(
    auth: Authenticated,
    pool: Extension<PgPool>,
) -> Result<impl IntoResponse, ApiError> {
    let user = lookup_user(&pool, auth.claims.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse {
        id: user.id,
        email: user.email,
        verified: user.verified,
        created_at: user.created_at,
    }))
}
