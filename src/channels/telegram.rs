//! Telegram channel — delivers through the Bot API's sendMessage method.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::channels::{Channel, DeliveryOutcome, Notification, Recipient};
use crate::error::ChannelError;

/// Telegram chat-bot channel.
pub struct TelegramChannel {
    bot_token: Option<SecretString>,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(bot_token: Option<SecretString>) -> Self {
        Self {
            bot_token,
            client: reqwest::Client::new(),
        }
    }

    /// Token from `TELEGRAM_BOT_TOKEN`; channel is disabled when unset.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("TELEGRAM_BOT_TOKEN")
                .ok()
                .filter(|t| !t.is_empty())
                .map(SecretString::from),
        )
    }

    fn api_url(token: &str, method: &str) -> String {
        format!("https://api.telegram.org/bot{token}/{method}")
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &'static str {
        "telegram"
    }

    fn available_for(&self, recipient: &Recipient) -> bool {
        self.bot_token.is_some() && recipient.telegram_id.is_some()
    }

    async fn attempt(
        &self,
        recipient: &Recipient,
        notification: &Notification,
        timeout: Duration,
    ) -> Result<DeliveryOutcome, ChannelError> {
        let token = self
            .bot_token
            .as_ref()
            .ok_or_else(|| ChannelError::NotConfigured {
                name: "telegram".into(),
            })?;
        let chat_id = recipient
            .telegram_id
            .as_deref()
            .ok_or_else(|| ChannelError::MissingAddress {
                name: "telegram".into(),
            })?;

        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": format!("*{}*\n{}", notification.subject, notification.body),
            "parse_mode": "Markdown",
        });

        let resp = self
            .client
            .post(Self::api_url(token.expose_secret(), "sendMessage"))
            .json(&body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChannelError::Timeout {
                        name: "telegram".into(),
                        timeout,
                    }
                } else {
                    ChannelError::SendFailed {
                        name: "telegram".into(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let payload = resp.text().await.map_err(|e| ChannelError::SendFailed {
            name: "telegram".into(),
            reason: e.to_string(),
        })?;
        let data: serde_json::Value =
            serde_json::from_str(&payload).map_err(|e| ChannelError::ProviderRejected {
                name: "telegram".into(),
                reason: format!("unparseable response: {e}"),
            })?;

        // The Bot API wraps every response in an {"ok": bool} envelope.
        if data.get("ok").and_then(serde_json::Value::as_bool) == Some(true) {
            tracing::info!(chat_id, "telegram message sent");
            Ok(DeliveryOutcome::delivered("telegram_sent"))
        } else {
            Err(ChannelError::ProviderRejected {
                name: "telegram".into(),
                reason: payload,
            })
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn with_token() -> TelegramChannel {
        TelegramChannel::new(Some(SecretString::from("123:ABC".to_string())))
    }

    #[test]
    fn telegram_api_url() {
        assert_eq!(
            TelegramChannel::api_url("123:ABC", "sendMessage"),
            "https://api.telegram.org/bot123:ABC/sendMessage"
        );
    }

    #[test]
    fn unavailable_without_token() {
        let channel = TelegramChannel::new(None);
        let recipient = Recipient::new("alex").with_telegram_id("123456");
        assert!(!channel.available_for(&recipient));
    }

    #[test]
    fn unavailable_without_chat_id() {
        let channel = with_token();
        let recipient = Recipient::new("alex").with_email("alex@example.com");
        assert!(!channel.available_for(&recipient));
    }

    #[test]
    fn available_with_token_and_chat_id() {
        let channel = with_token();
        let recipient = Recipient::new("alex").with_telegram_id("123456");
        assert!(channel.available_for(&recipient));
    }

    #[tokio::test]
    async fn send_without_token_reports_not_configured() {
        let channel = TelegramChannel::new(None);
        let recipient = Recipient::new("alex").with_telegram_id("123456");
        let notification = Notification::new("subject", "body");

        let outcome = channel
            .send(&recipient, &notification, Duration::from_secs(1))
            .await;

        assert!(!outcome.ok);
        assert_eq!(outcome.provider_status, "not_configured");
    }

    #[tokio::test]
    async fn send_with_fake_token_reports_failure() {
        // Rejected by the API when reachable, a network error otherwise;
        // failure either way.
        let channel = with_token();
        let recipient = Recipient::new("alex").with_telegram_id("123456");
        let notification = Notification::new("subject", "body");

        let outcome = channel
            .send(&recipient, &notification, Duration::from_secs(5))
            .await;

        assert!(!outcome.ok);
    }
}
