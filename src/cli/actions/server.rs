use crate::api::{
    self,
    email::{HttpMailer, LogMailer, Mailer},
    handlers::auth::{AuthConfig, AuthState, TokenService},
};
use anyhow::Result;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub app_origin: String,
    pub access_token_secret: SecretString,
    pub refresh_token_secret: SecretString,
    pub access_token_ttl_seconds: i64,
    pub session_ttl_seconds: i64,
    pub session_refresh_threshold_seconds: i64,
    pub verify_code_ttl_seconds: i64,
    pub reset_code_ttl_seconds: i64,
    pub reset_window_seconds: i64,
    pub mail_api_url: Option<String>,
    pub mail_api_token: Option<SecretString>,
    pub mail_from: String,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the mailer cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = AuthConfig::new(args.app_origin)
        .with_access_token_ttl_seconds(args.access_token_ttl_seconds)
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_session_refresh_threshold_seconds(args.session_refresh_threshold_seconds)
        .with_verify_code_ttl_seconds(args.verify_code_ttl_seconds)
        .with_reset_code_ttl_seconds(args.reset_code_ttl_seconds)
        .with_reset_window_seconds(args.reset_window_seconds);

    // Refresh tokens live as long as the session they point to.
    let tokens = TokenService::new(
        &args.access_token_secret,
        &args.refresh_token_secret,
        auth_config.access_token_ttl_seconds(),
        auth_config.session_ttl_seconds(),
    );

    let auth_state = Arc::new(AuthState::new(auth_config, tokens));

    let mailer: Arc<dyn Mailer> = match (args.mail_api_url, args.mail_api_token) {
        (Some(url), Some(token)) => Arc::new(HttpMailer::new(url, token, args.mail_from)?),
        _ => {
            debug!("No mail API configured, outbound emails will be logged");
            Arc::new(LogMailer::new(args.mail_from))
        }
    };

    api::new(args.port, args.dsn, auth_state, mailer).await
}
