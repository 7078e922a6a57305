//! Auth lifecycle tests against a containerized Postgres.
//!
//! Each test starts its own database and skips itself when no container
//! runtime is available.

use super::login;
use super::password;
use super::register;
use super::session;
use super::state::{AuthConfig, AuthState};
use super::storage::{
    CodeKind, delete_session, insert_session, insert_user, insert_verification_code,
    list_user_sessions, lookup_session, lookup_user,
};
use super::token::TokenService;
use super::types::{ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest};
use super::utils::hash_password;
use super::verification;
use crate::api::email::{LogMailer, Mailer};
use crate::test_support::postgres::PostgresContainer;
use anyhow::{Context, Result, anyhow};
use axum::Json;
use axum::extract::{Extension, Path};
use axum::http::{
    HeaderMap, HeaderValue, StatusCode,
    header::{COOKIE, SET_COOKIE},
};
use axum::response::IntoResponse;
use chrono::{Duration, Utc};
use secrecy::SecretString;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::sync::Arc;

struct TestDb {
    _postgres: PostgresContainer,
    pool: PgPool,
}

impl TestDb {
    async fn new() -> Result<Self> {
        let postgres = match PostgresContainer::start().await {
            Ok(postgres) => postgres,
            Err(err) => {
                eprintln!("Skipping integration test: {err}");
                return Err(err);
            }
        };
        postgres.wait_until_ready().await?;

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&postgres.dsn())
            .await
            .context("failed to connect test pool")?;

        sqlx::migrate!()
            .run(&pool)
            .await
            .context("failed to run migrations")?;

        Ok(Self {
            _postgres: postgres,
            pool,
        })
    }
}

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

fn mailer() -> Arc<dyn Mailer> {
    Arc::new(LogMailer::new("noreply@cerbero.dev".to_string()))
}

fn register_payload(email: &str) -> Option<Json<RegisterRequest>> {
    Some(Json(RegisterRequest {
        email: email.to_string(),
        password: "hunter22".to_string(),
        confirm_password: None,
    }))
}

fn refresh_cookie(token: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_str(&format!("refreshToken={token}"))?);
    Ok(headers)
}

fn set_cookies(response: &axum::response::Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn duplicate_registration_conflicts() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };

    let state = auth_state();
    let first = register::register(
        HeaderMap::new(),
        Extension(db.pool.clone()),
        Extension(state.clone()),
        Extension(mailer()),
        register_payload("alice@example.com"),
    )
    .await
    .map_err(|err| anyhow!("first registration failed: {err}"))?
    .into_response();

    assert_eq!(first.status(), StatusCode::CREATED);
    assert_eq!(set_cookies(&first).len(), 2);

    let second = register::register(
        HeaderMap::new(),
        Extension(db.pool.clone()),
        Extension(state),
        Extension(mailer()),
        register_payload("alice@example.com"),
    )
    .await;

    let response = second
        .err()
        .context("duplicate registration accepted")?
        .into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    Ok(())
}

#[tokio::test]
async fn concurrent_registration_single_winner() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };

    let hash = hash_password("hunter22")?;
    let (one, two) = tokio::join!(
        insert_user(&db.pool, "bob@example.com", &hash),
        insert_user(&db.pool, "bob@example.com", &hash),
    );
    let outcomes = [one?, two?];

    assert_eq!(outcomes.iter().filter(|user| user.is_some()).count(), 1);

    Ok(())
}

#[tokio::test]
async fn refresh_after_session_deleted_is_unauthorized() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };

    let state = auth_state();
    let user = insert_user(&db.pool, "carol@example.com", &hash_password("hunter22")?)
        .await?
        .context("user not inserted")?;
    let session_id = insert_session(&db.pool, user.id, None, 2_592_000).await?;

    let token = state.tokens().sign_refresh(session_id)?;
    let headers = refresh_cookie(&token)?;

    let first = session::refresh(
        headers.clone(),
        Extension(db.pool.clone()),
        Extension(state.clone()),
    )
    .await;
    assert!(first.is_ok());

    delete_session(&db.pool, session_id).await?;

    let second = session::refresh(headers, Extension(db.pool.clone()), Extension(state)).await;
    let response = second
        .err()
        .context("refresh succeeded after session deletion")?
        .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn refresh_far_from_expiry_only_reissues_access() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };

    let state = auth_state();
    let user = insert_user(&db.pool, "dana@example.com", &hash_password("hunter22")?)
        .await?
        .context("user not inserted")?;
    // 30 days left, well above the 1 day rotation threshold.
    let session_id = insert_session(&db.pool, user.id, None, 2_592_000).await?;

    let token = state.tokens().sign_refresh(session_id)?;
    let response = session::refresh(
        refresh_cookie(&token)?,
        Extension(db.pool.clone()),
        Extension(state),
    )
    .await
    .map_err(|err| anyhow!("refresh failed: {err}"))?
    .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with("accessToken="));

    Ok(())
}

#[tokio::test]
async fn refresh_near_expiry_rotates_and_extends() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };

    let state = auth_state();
    let user = insert_user(&db.pool, "erin@example.com", &hash_password("hunter22")?)
        .await?
        .context("user not inserted")?;
    // One hour left, inside the rotation threshold.
    let session_id = insert_session(&db.pool, user.id, None, 3600).await?;

    let token = state.tokens().sign_refresh(session_id)?;
    let response = session::refresh(
        refresh_cookie(&token)?,
        Extension(db.pool.clone()),
        Extension(state),
    )
    .await
    .map_err(|err| anyhow!("refresh failed: {err}"))?
    .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().any(|c| c.starts_with("refreshToken=")));
    assert!(cookies.iter().any(|c| c.starts_with("accessToken=")));

    let session = lookup_session(&db.pool, session_id)
        .await?
        .context("session missing after rotation")?;
    assert!(session.expires_at > Utc::now() + Duration::days(29));

    Ok(())
}

#[tokio::test]
async fn verification_code_is_single_use() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };

    let user = insert_user(&db.pool, "frida@example.com", &hash_password("hunter22")?)
        .await?
        .context("user not inserted")?;
    let code =
        insert_verification_code(&db.pool, user.id, CodeKind::EmailVerification, 3600).await?;

    let first = verification::verify_email(Path(code.id.to_string()), Extension(db.pool.clone()))
        .await
        .map_err(|err| anyhow!("verification failed: {err}"))?
        .into_response();
    assert_eq!(first.status(), StatusCode::OK);

    let user = lookup_user(&db.pool, user.id)
        .await?
        .context("user missing")?;
    assert!(user.verified);

    let second =
        verification::verify_email(Path(code.id.to_string()), Extension(db.pool.clone())).await;
    let response = second
        .err()
        .context("verification code consumed twice")?
        .into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn third_reset_request_in_window_is_rejected() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };

    let state = auth_state();
    insert_user(&db.pool, "gus@example.com", &hash_password("hunter22")?)
        .await?
        .context("user not inserted")?;

    for _ in 0..2 {
        let result = password::forgot_password(
            Extension(db.pool.clone()),
            Extension(state.clone()),
            Extension(mailer()),
            Some(Json(ForgotPasswordRequest {
                email: "gus@example.com".to_string(),
            })),
        )
        .await;
        assert!(result.is_ok());
    }

    let third = password::forgot_password(
        Extension(db.pool.clone()),
        Extension(state),
        Extension(mailer()),
        Some(Json(ForgotPasswordRequest {
            email: "gus@example.com".to_string(),
        })),
    )
    .await;

    let response = third
        .err()
        .context("third reset request accepted")?
        .into_response();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    Ok(())
}

#[tokio::test]
async fn password_reset_revokes_all_sessions() -> Result<()> {
    let Ok(db) = TestDb::new().await else {
        return Ok(());
    };

    let state = auth_state();
    let user = insert_user(&db.pool, "hana@example.com", &hash_password("old password")?)
        .await?
        .context("user not inserted")?;
    insert_session(&db.pool, user.id, Some("browser"), 2_592_000).await?;
    insert_session(&db.pool, user.id, Some("phone"), 2_592_000).await?;

    let code = insert_verification_code(&db.pool, user.id, CodeKind::PasswordReset, 3600).await?;

    let response = password::reset_password(
        Extension(db.pool.clone()),
        Extension(state.clone()),
        Some(Json(ResetPasswordRequest {
            password: "new password".to_string(),
            verification_code: code.id.to_string(),
        })),
    )
    .await
    .map_err(|err| anyhow!("reset failed: {err}"))?
    .into_response();
    assert_eq!(response.status(), StatusCode::OK);

    let sessions = list_user_sessions(&db.pool, user.id).await?;
    assert!(sessions.is_empty());

    let old_login = login::login(
        HeaderMap::new(),
        Extension(db.pool.clone()),
        Extension(state.clone()),
        Some(Json(LoginRequest {
            email: "hana@example.com".to_string(),
            password: "old password".to_string(),
        })),
    )
    .await;
    let response = old_login
        .err()
        .context("old password still accepted")?
        .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let new_login = login::login(
        HeaderMap::new(),
        Extension(db.pool.clone()),
        Extension(state),
        Some(Json(LoginRequest {
            email: "hana@example.com".to_string(),
            password: "new password".to_string(),
        })),
    )
    .await
    .map_err(|err| anyhow!("login with new password failed: {err}"))?
    .into_response();
    assert_eq!(new_login.status(), StatusCode::OK);

    Ok(())
}
