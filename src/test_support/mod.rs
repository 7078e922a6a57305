//! Container-backed helpers for database integration tests.
//!
//! Tests that need a real Postgres start a throwaway container and skip
//! themselves when no container runtime is available.

pub(crate) mod postgres;
pub(crate) mod runtime;

use uuid::Uuid;

pub(crate) fn unique_name(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}
