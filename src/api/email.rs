//! Outbound email delivery.
//!
//! `HttpMailer` talks to an HTTP mail API (Resend-style JSON endpoint) and is
//! used in production. `LogMailer` only logs the message and is the fallback
//! when no mail API is configured, which keeps local development working
//! without credentials.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::header;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{Instrument, info};
use ulid::Ulid;

use crate::APP_USER_AGENT;

/// A rendered email ready for delivery.
#[derive(Debug)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Delivery backend; `send` returns the provider's message id.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<String>;
}

/// Mailer that logs instead of sending.
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    #[must_use]
    pub fn new(from: String) -> Self {
        Self { from }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<String> {
        let id = Ulid::new().to_string();
        info!(
            from = %self.from,
            to = %message.to,
            subject = %message.subject,
            email.id = %id,
            "Email delivery skipped, no mail API configured"
        );
        Ok(id)
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

#[derive(Deserialize)]
struct SendResponse {
    id: String,
}

/// Mailer backed by an HTTP mail API.
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    token: SecretString,
    from: String,
}

impl HttpMailer {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(endpoint: String, token: SecretString, from: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build mail API client")?;

        Ok(Self {
            client,
            endpoint,
            token,
            from,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<String> {
        let span = tracing::info_span!(
            "email.send",
            email.to = %message.to,
            email.subject = %message.subject
        );

        async {
            let response = self
                .client
                .post(&self.endpoint)
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", self.token.expose_secret()),
                )
                .json(&SendRequest {
                    from: &self.from,
                    to: &message.to,
                    subject: &message.subject,
                    html: &message.html,
                })
                .send()
                .await
                .context("failed to reach mail API")?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(anyhow!("mail API returned {status}: {body}"));
            }

            let body: SendResponse = response
                .json()
                .await
                .context("failed to parse mail API response")?;

            Ok(body.id)
        }
        .instrument(span)
        .await
    }
}

/// Email asking a new user to confirm their address.
#[must_use]
pub fn verify_email_message(to: &str, url: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Verify Email Address".to_string(),
        html: format!(
            "<doctype html><html><body>\
             <h1>Verify your email address</h1>\
             <p>Click the link below to verify your email address:</p>\
             <p><a href=\"{url}\">Verify email</a></p>\
             </body></html>"
        ),
    }
}

/// Email carrying a password reset link.
#[must_use]
pub fn password_reset_message(to: &str, url: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Password Reset Request".to_string(),
        html: format!(
            "<doctype html><html><body>\
             <h1>Reset your password</h1>\
             <p>Click the link below to reset your password:</p>\
             <p><a href=\"{url}\">Reset password</a></p>\
             </body></html>"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_message_embeds_url() {
        let message = verify_email_message(
            "alice@example.com",
            "https://app.cerbero.dev/email/verify/abc",
        );
        assert_eq!(message.to, "alice@example.com");
        assert_eq!(message.subject, "Verify Email Address");
        assert!(
            message
                .html
                .contains("https://app.cerbero.dev/email/verify/abc")
        );
    }

    #[test]
    fn reset_message_embeds_url() {
        let message = password_reset_message(
            "alice@example.com",
            "https://app.cerbero.dev/password/reset?code=abc&exp=1",
        );
        assert_eq!(message.subject, "Password Reset Request");
        assert!(message.html.contains("code=abc&exp=1"));
    }

    #[tokio::test]
    async fn log_mailer_returns_ulid() {
        let mailer = LogMailer::new("noreply@cerbero.dev".to_string());
        let message = verify_email_message("alice@example.com", "https://example.com");
        let id = mailer.send(&message).await.unwrap();
        assert_eq!(id.len(), 26);
    }
}
