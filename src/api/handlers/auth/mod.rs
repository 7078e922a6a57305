//! Session-based authentication: registration, login, token refresh, email
//! verification, and password reset.

mod cookie;
mod error;
mod extract;
pub mod login;
pub mod password;
pub mod register;
pub mod session;
mod state;
pub(crate) mod storage;
mod token;
pub mod types;
mod utils;
pub mod verification;

#[cfg(test)]
mod tests;

pub use error::ApiError;
pub use extract::Authenticated;
pub use state::{AuthConfig, AuthState};
pub use token::{AccessClaims, TokenService};
