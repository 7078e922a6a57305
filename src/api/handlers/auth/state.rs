//! Auth configuration and shared handler state.

use super::token::TokenService;

const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 15 * 60;
const DEFAULT_SESSION_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;
const DEFAULT_SESSION_REFRESH_THRESHOLD_SECONDS: i64 = 24 * 60 * 60;
const DEFAULT_VERIFY_CODE_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;
const DEFAULT_RESET_CODE_TTL_SECONDS: i64 = 60 * 60;
const DEFAULT_RESET_WINDOW_SECONDS: i64 = 5 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    app_origin: String,
    access_token_ttl_seconds: i64,
    session_ttl_seconds: i64,
    session_refresh_threshold_seconds: i64,
    verify_code_ttl_seconds: i64,
    reset_code_ttl_seconds: i64,
    reset_window_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(app_origin: String) -> Self {
        // Ensure the origin does not have a trailing slash; it is embedded in links.
        let app_origin = app_origin.trim_end_matches('/').to_string();

        Self {
            app_origin,
            access_token_ttl_seconds: DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            session_refresh_threshold_seconds: DEFAULT_SESSION_REFRESH_THRESHOLD_SECONDS,
            verify_code_ttl_seconds: DEFAULT_VERIFY_CODE_TTL_SECONDS,
            reset_code_ttl_seconds: DEFAULT_RESET_CODE_TTL_SECONDS,
            reset_window_seconds: DEFAULT_RESET_WINDOW_SECONDS,
        }
    }

    #[must_use]
    pub fn with_access_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_refresh_threshold_seconds(mut self, seconds: i64) -> Self {
        self.session_refresh_threshold_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_verify_code_ttl_seconds(mut self, seconds: i64) -> Self {
        self.verify_code_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_reset_code_ttl_seconds(mut self, seconds: i64) -> Self {
        self.reset_code_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_reset_window_seconds(mut self, seconds: i64) -> Self {
        self.reset_window_seconds = seconds;
        self
    }

    #[must_use]
    pub fn app_origin(&self) -> &str {
        &self.app_origin
    }

    #[must_use]
    pub fn access_token_ttl_seconds(&self) -> i64 {
        self.access_token_ttl_seconds
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    pub(crate) fn session_refresh_threshold_seconds(&self) -> i64 {
        self.session_refresh_threshold_seconds
    }

    pub(super) fn verify_code_ttl_seconds(&self) -> i64 {
        self.verify_code_ttl_seconds
    }

    pub(super) fn reset_code_ttl_seconds(&self) -> i64 {
        self.reset_code_ttl_seconds
    }

    pub(super) fn reset_window_seconds(&self) -> i64 {
        self.reset_window_seconds
    }

    /// Only mark cookies secure when the frontend is served over HTTPS.
    pub(crate) fn cookie_secure(&self) -> bool {
        self.app_origin.starts_with("https://")
    }
}

pub struct AuthState {
    config: AuthConfig,
    tokens: TokenService,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, tokens: TokenService) -> Self {
        Self { config, tokens }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }
}
