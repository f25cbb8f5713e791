//! SMS channel — HTTPS gateway when configured, local mock otherwise.
//!
//! The mock path is documented behavior, not an error path: without an
//! endpoint and token the channel logs the would-be send and reports
//! `sms_mock_sent`, so fallback onto SMS stays exercisable without a
//! provider account.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::channels::{Channel, DeliveryOutcome, Notification, Recipient};
use crate::error::ChannelError;

/// SMS gateway configuration.
#[derive(Debug)]
pub struct SmsConfig {
    pub endpoint: String,
    pub token: SecretString,
}

impl SmsConfig {
    /// Endpoint/token from `SMS_ENDPOINT`/`SMS_TOKEN`; `None` puts the
    /// channel in mock mode.
    pub fn from_env() -> Option<Self> {
        let endpoint = std::env::var("SMS_ENDPOINT").ok().filter(|s| !s.is_empty())?;
        let token = std::env::var("SMS_TOKEN").ok().filter(|s| !s.is_empty())?;
        Some(Self {
            endpoint,
            token: SecretString::from(token),
        })
    }
}

/// SMS channel.
pub struct SmsChannel {
    config: Option<SmsConfig>,
    client: reqwest::Client,
}

impl SmsChannel {
    pub fn new(config: Option<SmsConfig>) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(SmsConfig::from_env())
    }
}

#[async_trait]
impl Channel for SmsChannel {
    fn name(&self) -> &'static str {
        "sms"
    }

    fn available_for(&self, recipient: &Recipient) -> bool {
        // Mock mode covers the unconfigured case, so only the address
        // matters here.
        recipient.phone.is_some()
    }

    async fn attempt(
        &self,
        recipient: &Recipient,
        notification: &Notification,
        timeout: Duration,
    ) -> Result<DeliveryOutcome, ChannelError> {
        let to = recipient
            .phone
            .as_deref()
            .ok_or_else(|| ChannelError::MissingAddress { name: "sms".into() })?;

        let Some(config) = &self.config else {
            tracing::info!(to, subject = %notification.subject, "sms mock delivery");
            return Ok(DeliveryOutcome::delivered("sms_mock_sent"));
        };

        let payload = serde_json::json!({
            "to": to,
            "text": format!("{}\n{}", notification.subject, notification.body),
        });

        let resp = self
            .client
            .post(&config.endpoint)
            .bearer_auth(config.token.expose_secret())
            .json(&payload)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChannelError::Timeout {
                        name: "sms".into(),
                        timeout,
                    }
                } else {
                    ChannelError::SendFailed {
                        name: "sms".into(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = resp.status();
        let raw = resp.text().await.unwrap_or_default();
        if status.is_success() {
            tracing::info!(to, "sms sent");
            Ok(DeliveryOutcome::delivered_with_details("sms_sent", raw))
        } else {
            Err(ChannelError::ProviderRejected {
                name: "sms".into(),
                reason: format!("{status}: {raw}"),
            })
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_on_phone_alone() {
        let channel = SmsChannel::new(None);
        assert!(channel.available_for(&Recipient::new("alex").with_phone("+48111111111")));
        assert!(!channel.available_for(&Recipient::new("alex").with_email("alex@example.com")));
    }

    #[tokio::test]
    async fn mock_mode_reports_success() {
        let channel = SmsChannel::new(None);
        let recipient = Recipient::new("alex").with_phone("+48111111111");
        let notification = Notification::new("subject", "body");

        let outcome = channel
            .send(&recipient, &notification, Duration::from_secs(1))
            .await;

        assert!(outcome.ok);
        assert_eq!(outcome.provider_status, "sms_mock_sent");
    }

    #[tokio::test]
    async fn send_without_phone_reports_missing_address() {
        let channel = SmsChannel::new(None);
        let recipient = Recipient::new("alex");
        let notification = Notification::new("subject", "body");

        let outcome = channel
            .send(&recipient, &notification, Duration::from_secs(1))
            .await;

        assert!(!outcome.ok);
        assert_eq!(outcome.provider_status, "missing_address");
    }

    #[tokio::test]
    async fn configured_channel_with_unreachable_endpoint_fails() {
        let channel = SmsChannel::new(Some(SmsConfig {
            endpoint: "https://sms.gateway.invalid/send".into(),
            token: SecretString::from("token".to_string()),
        }));
        let recipient = Recipient::new("alex").with_phone("+48111111111");
        let notification = Notification::new("subject", "body");

        let outcome = channel
            .send(&recipient, &notification, Duration::from_secs(2))
            .await;

        assert!(!outcome.ok);
        assert_eq!(outcome.provider_status, "network_error");
    }
}
