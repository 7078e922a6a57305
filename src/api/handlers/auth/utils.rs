//! Small helpers for auth validation, password hashing, and code links.

use anyhow::{Result, anyhow};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use regex::Regex;
use uuid::Uuid;

const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_PASSWORD_LENGTH: usize = 255;

/// Normalize an email for lookup/uniqueness checks.
pub(super) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(super) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Password length bounds checked before hashing.
pub(super) fn valid_password(password: &str) -> bool {
    let length = password.chars().count();
    (MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length)
}

/// Hash a password with Argon2id and a fresh random salt.
pub(super) fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| anyhow!("failed to hash password: {err}"))
}

/// Verify a password against a stored Argon2 hash.
/// An unparseable hash counts as a mismatch, not an error.
pub(super) fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

/// Build the frontend link embedded in verification emails.
pub(super) fn build_verify_url(app_origin: &str, code: Uuid) -> String {
    format!("{app_origin}/email/verify/{code}")
}

/// Build the frontend link embedded in password reset emails.
/// The expiry is exposed as unix milliseconds so the client can show a countdown.
pub(super) fn build_reset_url(app_origin: &str, code: Uuid, expires_at: DateTime<Utc>) -> String {
    format!(
        "{app_origin}/password/reset?code={code}&exp={}",
        expires_at.timestamp_millis()
    )
}

pub(super) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}
