//! Email channel — one SMTP submission per attempt, via lettre.

use std::time::Duration;

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::{ExposeSecret, SecretString};

use crate::channels::{Channel, DeliveryOutcome, Notification, Recipient};
use crate::error::ChannelError;

// ── Configuration ───────────────────────────────────────────────────

/// Email channel configuration, built from environment variables.
#[derive(Debug)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: SecretString,
    pub sender: String,
}

impl EmailConfig {
    /// Build config from environment variables.
    /// Returns `None` if `SMTP_HOST` is not set (channel disabled).
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;

        let smtp_port: u16 = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);

        let username = std::env::var("SMTP_USER").unwrap_or_default();
        let password = SecretString::from(std::env::var("SMTP_PASS").unwrap_or_default());
        let sender = std::env::var("SMTP_SENDER").unwrap_or_else(|_| {
            if username.is_empty() {
                "no-reply@localhost".to_string()
            } else {
                username.clone()
            }
        });

        Some(Self {
            smtp_host,
            smtp_port,
            username,
            password,
            sender,
        })
    }
}

// ── Channel ─────────────────────────────────────────────────────────

/// Email channel — SMTP submission with STARTTLS + login.
pub struct EmailChannel {
    config: Option<EmailConfig>,
}

impl EmailChannel {
    pub fn new(config: Option<EmailConfig>) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(EmailConfig::from_env())
    }
}

#[async_trait]
impl Channel for EmailChannel {
    fn name(&self) -> &'static str {
        "email"
    }

    fn available_for(&self, recipient: &Recipient) -> bool {
        let Some(config) = &self.config else {
            return false;
        };
        recipient.email.is_some()
            && !config.username.is_empty()
            && !config.password.expose_secret().is_empty()
    }

    async fn attempt(
        &self,
        recipient: &Recipient,
        notification: &Notification,
        timeout: Duration,
    ) -> Result<DeliveryOutcome, ChannelError> {
        let config = self.config.as_ref().ok_or_else(|| ChannelError::NotConfigured {
            name: "email".into(),
        })?;
        let to = recipient
            .email
            .as_deref()
            .ok_or_else(|| ChannelError::MissingAddress {
                name: "email".into(),
            })?;

        let email = Message::builder()
            .from(config.sender.parse().map_err(|e| ChannelError::InvalidMessage {
                name: "email".into(),
                reason: format!("invalid sender address: {e}"),
            })?)
            .to(to.parse().map_err(|e| ChannelError::InvalidMessage {
                name: "email".into(),
                reason: format!("invalid recipient address: {e}"),
            })?)
            .subject(notification.subject.clone())
            .body(notification.body.clone())
            .map_err(|e| ChannelError::InvalidMessage {
                name: "email".into(),
                reason: format!("failed to build email: {e}"),
            })?;

        let creds = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );

        let transport = SmtpTransport::starttls_relay(&config.smtp_host)
            .map_err(|e| ChannelError::SendFailed {
                name: "email".into(),
                reason: format!("SMTP relay error: {e}"),
            })?
            .port(config.smtp_port)
            .credentials(creds)
            .timeout(Some(timeout))
            .build();

        // lettre's SmtpTransport is blocking.
        tokio::task::spawn_blocking(move || transport.send(&email))
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "email".into(),
                reason: format!("send task panicked: {e}"),
            })?
            .map_err(|e| ChannelError::SendFailed {
                name: "email".into(),
                reason: format!("SMTP send failed: {e}"),
            })?;

        tracing::info!(to, "email sent");
        Ok(DeliveryOutcome::delivered("email_sent"))
    }
}

// ── Tests ───────────────────────────────────────────────────────────
