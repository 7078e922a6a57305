//! Database helpers for users, sessions, and verification codes.
//!
//! Expiry is lazy: every lookup filters on `expires_at > NOW()`, so expired
//! rows are simply invisible and no background sweeper runs in the request
//! path.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::utils::is_unique_violation;

/// Kind discriminator for verification codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum CodeKind {
    EmailVerification,
    PasswordReset,
}

impl CodeKind {
    pub(super) const fn as_str(self) -> &'static str {
        match self {
            Self::EmailVerification => "email_verification",
            Self::PasswordReset => "password_reset",
        }
    }
}

#[derive(Debug)]
pub(crate) struct UserRow {
    pub(crate) id: Uuid,
    pub(crate) email: String,
    pub(crate) verified: bool,
    pub(crate) created_at: DateTime<Utc>,
}

/// Fields needed to check a login attempt.
pub(super) struct CredentialsRow {
    pub(super) id: Uuid,
    pub(super) password_hash: String,
}

/// Session fields needed by the refresh flow.
pub(crate) struct SessionRow {
    pub(crate) id: Uuid,
    pub(crate) user_id: Uuid,
    pub(crate) expires_at: DateTime<Utc>,
}

pub(crate) struct SessionListRow {
    pub(crate) id: Uuid,
    pub(crate) user_agent: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
}

/// Verification code row; the id is the code the user receives.
pub(super) struct CodeRow {
    pub(super) id: Uuid,
    pub(super) user_id: Uuid,
    pub(super) expires_at: DateTime<Utc>,
}

fn user_from_row(row: &sqlx::postgres::PgRow) -> UserRow {
    UserRow {
        id: row.get("id"),
        email: row.get("email"),
        verified: row.get("verified"),
        created_at: row.get("created_at"),
    }
}

/// Insert a new user; `None` means the email is already taken.
pub(super) async fn insert_user(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
) -> Result<Option<UserRow>> {
    let query = r"
        INSERT INTO users (email, password_hash)
        VALUES ($1, $2)
        RETURNING id, email, verified, created_at
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .bind(password_hash)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(Some(user_from_row(&row))),
        Err(err) if is_unique_violation(&err) => Ok(None),
        Err(err) => Err(err).context("failed to insert user"),
    }
}

pub(crate) async fn lookup_user(pool: &PgPool, user_id: Uuid) -> Result<Option<UserRow>> {
    let query = "SELECT id, email, verified, created_at FROM users WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user")?;

    Ok(row.map(|row| user_from_row(&row)))
}

pub(super) async fn lookup_user_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>> {
    let query = "SELECT id, email, verified, created_at FROM users WHERE email = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by email")?;

    Ok(row.map(|row| user_from_row(&row)))
}

/// Look up credentials by email for a login attempt.
pub(super) async fn lookup_credentials(
    pool: &PgPool,
    email: &str,
) -> Result<Option<CredentialsRow>> {
    let query = "SELECT id, password_hash FROM users WHERE email = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup credentials")?;

    Ok(row.map(|row| CredentialsRow {
        id: row.get("id"),
        password_hash: row.get("password_hash"),
    }))
}

/// Flip `verified` to true; `false` means the user row is gone.
pub(super) async fn set_user_verified(pool: &PgPool, user_id: Uuid) -> Result<bool> {
    let query = "UPDATE users SET verified = TRUE, updated_at = NOW() WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(user_id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to mark user verified")?;

    Ok(result.rows_affected() == 1)
}

/// Replace the stored password hash; `false` means the user row is gone.
pub(super) async fn update_user_password(
    pool: &PgPool,
    user_id: Uuid,
    password_hash: &str,
) -> Result<bool> {
    let query = "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(user_id)
        .bind(password_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to update password")?;

    Ok(result.rows_affected() == 1)
}

pub(super) async fn insert_session(
    pool: &PgPool,
    user_id: Uuid,
    user_agent: Option<&str>,
    ttl_seconds: i64,
) -> Result<Uuid> {
    let query = r"
        INSERT INTO sessions (user_id, user_agent, expires_at)
        VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .bind(user_agent)
        .bind(ttl_seconds)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to insert session")?;

    Ok(row.get("id"))
}

/// Look up an unexpired session by id.
pub(crate) async fn lookup_session(pool: &PgPool, session_id: Uuid) -> Result<Option<SessionRow>> {
    let query = r"
        SELECT id, user_id, expires_at
        FROM sessions
        WHERE id = $1 AND expires_at > NOW()
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(session_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup session")?;

    Ok(row.map(|row| SessionRow {
        id: row.get("id"),
        user_id: row.get("user_id"),
        expires_at: row.get("expires_at"),
    }))
}

/// Push the session expiry `ttl_seconds` into the future.
pub(super) async fn extend_session(pool: &PgPool, session_id: Uuid, ttl_seconds: i64) -> Result<()> {
    let query = r"
        UPDATE sessions
        SET expires_at = NOW() + ($2 * INTERVAL '1 second')
        WHERE id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(session_id)
        .bind(ttl_seconds)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to extend session")?;

    Ok(())
}

pub(crate) async fn delete_session(pool: &PgPool, session_id: Uuid) -> Result<()> {
    let query = "DELETE FROM sessions WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(session_id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete session")?;

    Ok(())
}

/// Delete a session only if it belongs to the given user.
/// `false` means no matching row (wrong owner or already gone).
pub(crate) async fn delete_user_session(
    pool: &PgPool,
    session_id: Uuid,
    user_id: Uuid,
) -> Result<bool> {
    let query = "DELETE FROM sessions WHERE id = $1 AND user_id = $2";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(session_id)
        .bind(user_id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete user session")?;

    Ok(result.rows_affected() == 1)
}

/// List a user's unexpired sessions, newest first.
pub(crate) async fn list_user_sessions(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<SessionListRow>> {
    let query = r"
        SELECT id, user_agent, created_at
        FROM sessions
        WHERE user_id = $1 AND expires_at > NOW()
        ORDER BY created_at DESC
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let rows = sqlx::query(query)
        .bind(user_id)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to list sessions")?;

    Ok(rows
        .into_iter()
        .map(|row| SessionListRow {
            id: row.get("id"),
            user_agent: row.get("user_agent"),
            created_at: row.get("created_at"),
        })
        .collect())
}

/// Delete all sessions for a user (password reset revokes everything).
pub(super) async fn delete_user_sessions(pool: &PgPool, user_id: Uuid) -> Result<u64> {
    let query = "DELETE FROM sessions WHERE user_id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(user_id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete user sessions")?;

    Ok(result.rows_affected())
}

pub(super) async fn insert_verification_code(
    pool: &PgPool,
    user_id: Uuid,
    kind: CodeKind,
    ttl_seconds: i64,
) -> Result<CodeRow> {
    let query = r"
        INSERT INTO verification_codes (user_id, kind, expires_at)
        VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
        RETURNING id, user_id, expires_at
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .bind(kind.as_str())
        .bind(ttl_seconds)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to insert verification code")?;

    Ok(CodeRow {
        id: row.get("id"),
        user_id: row.get("user_id"),
        expires_at: row.get("expires_at"),
    })
}

/// Look up an unexpired code of the given kind.
pub(super) async fn lookup_verification_code(
    pool: &PgPool,
    code_id: Uuid,
    kind: CodeKind,
) -> Result<Option<CodeRow>> {
    let query = r"
        SELECT id, user_id, expires_at
        FROM verification_codes
        WHERE id = $1 AND kind = $2 AND expires_at > NOW()
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(code_id)
        .bind(kind.as_str())
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup verification code")?;

    Ok(row.map(|row| CodeRow {
        id: row.get("id"),
        user_id: row.get("user_id"),
        expires_at: row.get("expires_at"),
    }))
}

/// Codes are single-use; delete after successful consumption.
pub(super) async fn delete_verification_code(pool: &PgPool, code_id: Uuid) -> Result<()> {
    let query = "DELETE FROM verification_codes WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(code_id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete verification code")?;

    Ok(())
}

/// Count codes of a kind created for a user within the last `window_seconds`.
pub(super) async fn count_recent_codes(
    pool: &PgPool,
    user_id: Uuid,
    kind: CodeKind,
    window_seconds: i64,
) -> Result<i64> {
    let query = r"
        SELECT COUNT(*) AS count
        FROM verification_codes
        WHERE user_id = $1
          AND kind = $2
          AND created_at > NOW() - ($3 * INTERVAL '1 second')
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .bind(kind.as_str())
        .bind(window_seconds)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to count verification codes")?;

    Ok(row.get("count"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_kind_maps_to_column_values() {
        assert_eq!(CodeKind::EmailVerification.as_str(), "email_verification");
        assert_eq!(CodeKind::PasswordReset.as_str(), "password_reset");
    }
}
