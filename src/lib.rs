//! # Cerbero (Session-based Authentication Service)
//!
//! `cerbero` is a cookie-based authentication backend for web clients. It
//! handles registration, login, logout, access/refresh token rotation, email
//! verification, and password reset.
//!
//! ## Sessions & Tokens
//!
//! Authentication state lives in two places:
//!
//! - **Sessions** are database rows with a 30-day lifetime. They are created on
//!   register/login, extended on refresh when close to expiry, and deleted on
//!   logout or password reset.
//! - **Tokens** are short-lived JWTs carried in `HttpOnly` cookies. The access
//!   token (15 minutes) authorizes requests; the refresh token (30 days) is
//!   scoped to `/auth/refresh` and can only mint new access tokens while its
//!   session row is still alive.
//!
//! Revoking a session immediately invalidates its refresh token, even if the
//! JWT itself has not expired.
//!
//! ## Verification Codes
//!
//! Email verification and password reset use single-use database codes whose
//! row id is the code itself. Expired codes are never returned by lookups; no
//! background sweeper is required.

pub mod api;
pub mod cli;

#[cfg(test)]
pub(crate) mod test_support;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
