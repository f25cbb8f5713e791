//! Dispatch engine: channel ordering, per-channel retry with exponential
//! backoff, cross-channel fallback, and duplicate suppression.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;

use crate::channels::{
    Channel, EmailChannel, Notification, Recipient, SmsChannel, TelegramChannel,
};
use crate::config::DispatchConfig;
use crate::dedup::Deduper;

/// What a `notify` call produced: whether the notification counts as
/// delivered, and a one-line status summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    pub delivered: bool,
    pub status: String,
}

/// Backoff delay primitive. The default sleeps on the tokio timer; tests
/// swap in a recorder.
pub type Sleeper = Arc<dyn Fn(Duration) -> BoxFuture<'static, ()> + Send + Sync>;

/// Multi-channel notification dispatcher.
///
/// Channels are tried in the recipient's preferred order (else the default),
/// each retried with exponential backoff before the next is tried. Safe for
/// concurrent use: backoff sleeps suspend only the calling task, and the
/// dedup store is the sole shared mutable state. Dropping the `notify`
/// future cancels a dispatch at the next attempt boundary.
pub struct Dispatcher {
    channels: HashMap<String, Arc<dyn Channel>>,
    config: DispatchConfig,
    deduper: Deduper,
    sleeper: Sleeper,
}

impl Dispatcher {
    /// Dispatcher over an explicit channel set.
    pub fn with_channels(config: DispatchConfig, channels: Vec<Arc<dyn Channel>>) -> Self {
        let deduper = Deduper::new(config.dedup_ttl);
        Self {
            channels: channels
                .into_iter()
                .map(|channel| (channel.name().to_string(), channel))
                .collect(),
            config,
            deduper,
            sleeper: Arc::new(|delay| -> BoxFuture<'static, ()> {
                Box::pin(tokio::time::sleep(delay))
            }),
        }
    }

    /// Dispatcher over the three built-in channels, configured from the
    /// environment.
    pub fn from_env(config: DispatchConfig) -> Self {
        Self::with_channels(
            config,
            vec![
                Arc::new(EmailChannel::from_env()),
                Arc::new(TelegramChannel::from_env()),
                Arc::new(SmsChannel::from_env()),
            ],
        )
    }

    /// Replace the backoff sleeper. Lets tests observe backoff delays
    /// without sleeping for real.
    pub fn with_sleeper(mut self, sleeper: Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Deliver `notification` to `recipient` through the first channel that
    /// accepts it.
    ///
    /// The deduper is consulted first: an identical notification inside the
    /// TTL window is reported delivered with status `duplicate_suppressed`
    /// and causes no channel attempt. Otherwise channels are tried in order;
    /// each gets `max_retries + 1` attempts with exponential backoff before
    /// the next one is tried. The first success short-circuits with status
    /// `<channel>:<provider_status>`; total exhaustion yields
    /// `all_channels_failed; last=<description>`.
    pub async fn notify(
        &self,
        recipient: &Recipient,
        notification: &Notification,
    ) -> DispatchResult {
        if self.deduper.seen(recipient, notification) {
            tracing::info!(recipient = %recipient.id, "duplicate notification suppressed");
            return DispatchResult {
                delivered: true,
                status: "duplicate_suppressed".to_string(),
            };
        }

        let order = recipient
            .channel_order
            .as_ref()
            .unwrap_or(&self.config.default_order);

        let mut tried: HashSet<&str> = HashSet::new();
        let mut last_failure: Option<String> = None;

        for name in order {
            // A name repeated in the order gets one attempt run, not two.
            if !tried.insert(name.as_str()) {
                continue;
            }
            let Some(channel) = self.channels.get(name.as_str()) else {
                tracing::debug!(channel = %name, "no such channel registered, skipping");
                continue;
            };
            if !channel.available_for(recipient) {
                tracing::debug!(
                    channel = %name,
                    recipient = %recipient.id,
                    "channel unavailable for recipient, skipping"
                );
                continue;
            }

            for attempt in 0..=self.config.max_retries {
                let outcome = channel
                    .send(recipient, notification, self.config.send_timeout)
                    .await;

                if outcome.ok {
                    tracing::info!(
                        channel = %name,
                        recipient = %recipient.id,
                        status = %outcome.provider_status,
                        "notification delivered"
                    );
                    return DispatchResult {
                        delivered: true,
                        status: format!("{name}:{}", outcome.provider_status),
                    };
                }

                last_failure = Some(match &outcome.details {
                    Some(details) => format!("{name}:{} ({details})", outcome.provider_status),
                    None => format!("{name}:{}", outcome.provider_status),
                });
                tracing::warn!(
                    channel = %name,
                    recipient = %recipient.id,
                    attempt,
                    status = %outcome.provider_status,
                    "delivery attempt failed"
                );

                (self.sleeper)(self.backoff_delay(attempt)).await;
            }
            // Retry budget spent; fall through to the next channel.
        }

        DispatchResult {
            delivered: false,
            status: format!(
                "all_channels_failed; last={}",
                last_failure.as_deref().unwrap_or("none")
            ),
        }
    }

    /// `base * 2^attempt`, capped at the ceiling.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        self.config
            .base_backoff
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.config.max_backoff)
    }
}

// ── Tests ───────────────────────────────────────────────────────────
