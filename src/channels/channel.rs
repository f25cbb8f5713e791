//! Delivery channel contract and the core notification data model.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChannelError;

/// Someone a notification can be delivered to.
///
/// Addresses are all optional; a channel is only tried when
/// [`Channel::available_for`] sees both its own configuration and a usable
/// address here. `channel_order` overrides the engine's default fallback
/// order for this recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    /// Opaque unique id, used for dedup fingerprints and logging.
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Chat id for the bot channel.
    #[serde(default)]
    pub telegram_id: Option<String>,
    /// Preferred channel order, e.g. `["telegram", "email", "sms"]`.
    #[serde(default)]
    pub channel_order: Option<Vec<String>>,
}

impl Recipient {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            phone: None,
            telegram_id: None,
            channel_order: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_telegram_id(mut self, telegram_id: impl Into<String>) -> Self {
        self.telegram_id = Some(telegram_id.into());
        self
    }

    pub fn with_channel_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channel_order = Some(order.into_iter().map(Into::into).collect());
        self
    }
}

/// One notification: a short subject and a body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Result of a single delivery attempt against one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub ok: bool,
    /// Provider-specific status, e.g. `email_sent` or `network_error`.
    pub provider_status: String,
    /// Raw provider response or error text, when there is one.
    pub details: Option<String>,
}

impl DeliveryOutcome {
    pub fn delivered(status: impl Into<String>) -> Self {
        Self {
            ok: true,
            provider_status: status.into(),
            details: None,
        }
    }

    pub fn delivered_with_details(status: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            ok: true,
            provider_status: status.into(),
            details: Some(details.into()),
        }
    }

    pub fn failed(status: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            ok: false,
            provider_status: status.into(),
            details: Some(details.into()),
        }
    }
}

/// One delivery mechanism (email, chat bot, SMS).
///
/// New providers are added by implementing this trait and registering the
/// instance with the dispatcher; the engine itself never changes.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Stable channel name used in orders and status summaries.
    fn name(&self) -> &'static str;

    /// Whether this channel can be tried for `recipient`: its own
    /// configuration and a usable address must both be present.
    /// Pure; performs no I/O.
    fn available_for(&self, recipient: &Recipient) -> bool;

    /// One delivery attempt against the provider, respecting `timeout`.
    async fn attempt(
        &self,
        recipient: &Recipient,
        notification: &Notification,
        timeout: Duration,
    ) -> Result<DeliveryOutcome, ChannelError>;

    /// One attempt that never fails: any [`ChannelError`] degrades to a
    /// failed [`DeliveryOutcome`] carrying the error's failure class and
    /// text.
    async fn send(
        &self,
        recipient: &Recipient,
        notification: &Notification,
        timeout: Duration,
    ) -> DeliveryOutcome {
        match self.attempt(recipient, notification, timeout).await {
            Ok(outcome) => outcome,
            Err(err) => DeliveryOutcome::failed(err.status_class(), err.to_string()),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
