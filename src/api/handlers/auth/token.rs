//! JWT signing and verification for access and refresh tokens.
//!
//! Access and refresh tokens use distinct secrets and lifetimes. Verification
//! is soft-fail: a bad signature, an expired token, a token of the wrong kind,
//! or garbage input all yield `None`, and the caller decides the HTTP status.

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by the short-lived access token.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Claims carried by the refresh token. Deliberately no `userId`: the session
/// row is the source of truth when the token is redeemed.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshClaims {
    pub session_id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
}

impl TokenService {
    #[must_use]
    pub fn new(
        access_secret: &SecretString,
        refresh_secret: &SecretString,
        access_ttl_seconds: i64,
        refresh_ttl_seconds: i64,
    ) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.expose_secret().as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.expose_secret().as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.expose_secret().as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.expose_secret().as_bytes()),
            access_ttl_seconds,
            refresh_ttl_seconds,
        }
    }

    /// Sign an access token for a user/session pair.
    ///
    /// # Errors
    /// Returns an error if JWT encoding fails.
    pub fn sign_access(&self, user_id: Uuid, session_id: Uuid) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            user_id,
            session_id,
            iat: now,
            exp: now + self.access_ttl_seconds,
        };
        encode(&Header::default(), &claims, &self.access_encoding)
            .context("failed to sign access token")
    }

    /// Sign a refresh token bound to a session.
    ///
    /// # Errors
    /// Returns an error if JWT encoding fails.
    pub fn sign_refresh(&self, session_id: Uuid) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = RefreshClaims {
            session_id,
            iat: now,
            exp: now + self.refresh_ttl_seconds,
        };
        encode(&Header::default(), &claims, &self.refresh_encoding)
            .context("failed to sign refresh token")
    }

    #[must_use]
    pub fn verify_access(&self, token: &str) -> Option<AccessClaims> {
        decode::<AccessClaims>(token, &self.access_decoding, &Validation::default())
            .ok()
            .map(|data| data.claims)
    }

    #[must_use]
    pub fn verify_refresh(&self, token: &str) -> Option<RefreshClaims> {
        decode::<RefreshClaims>(token, &self.refresh_decoding, &Validation::default())
            .ok()
            .map(|data| data.claims)
    }
}
