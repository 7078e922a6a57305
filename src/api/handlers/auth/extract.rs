//! Access token extractor for protected endpoints.

use std::sync::Arc;

use anyhow::anyhow;
use axum::{extract::FromRequestParts, http::request::Parts};

use super::{
    cookie::{ACCESS_TOKEN_COOKIE, extract_cookie},
    error::ApiError,
    state::AuthState,
    token::AccessClaims,
};

/// Extracts and verifies the access token cookie.
///
/// Rejects with 401 when the cookie is missing, expired, or forged. Handlers
/// taking this extractor never see an unauthenticated request.
pub struct Authenticated {
    pub claims: AccessClaims,
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = parts
            .extensions
            .get::<Arc<AuthState>>()
            .ok_or_else(|| ApiError::Internal(anyhow!("missing auth state extension")))?;

        let token = extract_cookie(&parts.headers, ACCESS_TOKEN_COOKIE)
            .ok_or_else(|| ApiError::Unauthorized("Not authorized".to_string()))?;

        let claims = auth_state
            .tokens()
            .verify_access(&token)
            .ok_or_else(|| ApiError::Unauthorized("Not authorized".to_string()))?;

        Ok(Self { claims })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::{AuthConfig, TokenService};
    use axum::http::{HeaderValue, Request, StatusCode, header::COOKIE};
    use axum::response::IntoResponse;
    use secrecy::SecretString;
    use uuid::Uuid;

    fn auth_state() -> Arc<AuthState> {
        let config = AuthConfig::new("http://localhost:5173".to_string());
        let tokens = TokenService::new(
            &SecretString::from("access-secret".to_string()),
            &SecretString::from("refresh-secret".to_string()),
            900,
            2_592_000,
        );
        Arc::new(AuthState::new(config, tokens))
    }

    fn parts_with_cookie(state: Arc<AuthState>, cookie: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/user");
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, HeaderValue::from_str(cookie).unwrap());
        }
        let request = builder.body(()).unwrap();
        let (mut parts, ()) = request.into_parts();
        parts.extensions.insert(state);
        parts
    }

    #[tokio::test]
    async fn missing_cookie_is_unauthorized() {
        let mut parts = parts_with_cookie(auth_state(), None);
        let result = Authenticated::from_request_parts(&mut parts, &()).await;
        let response = result.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let mut parts = parts_with_cookie(auth_state(), Some("accessToken=not-a-jwt"));
        let result = Authenticated::from_request_parts(&mut parts, &()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn valid_token_yields_claims() {
        let state = auth_state();
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let token = state.tokens().sign_access(user_id, session_id).unwrap();

        let cookie = format!("accessToken={token}");
        let mut parts = parts_with_cookie(state, Some(&cookie));
        let result = Authenticated::from_request_parts(&mut parts, &()).await;

        let auth = result.ok().unwrap();
        assert_eq!(auth.claims.user_id, user_id);
        assert_eq!(auth.claims.session_id, session_id);
    }
}
