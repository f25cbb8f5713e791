//! End-to-end dispatch through the public API: unconfigured channels fall
//! through to the SMS mock, and repeats inside the TTL window are
//! suppressed.

use std::sync::Arc;

use notify_relay::channels::{
    Channel, EmailChannel, Notification, Recipient, SmsChannel, TelegramChannel,
};
use notify_relay::config::DispatchConfig;
use notify_relay::dispatch::Dispatcher;

/// The three built-in channels with nothing configured, so availability is
/// driven purely by the recipient's addresses.
fn unconfigured_dispatcher() -> Dispatcher {
    let channels: Vec<Arc<dyn Channel>> = vec![
        Arc::new(EmailChannel::new(None)),
        Arc::new(TelegramChannel::new(None)),
        Arc::new(SmsChannel::new(None)),
    ];
    Dispatcher::with_channels(DispatchConfig::default(), channels)
}

#[tokio::test]
async fn phone_only_recipient_falls_through_to_sms_mock() {
    let dispatcher = unconfigured_dispatcher();
    let recipient = Recipient::new("alex").with_phone("+48111111111");
    let notification = Notification::new("Delivery check", "Hello! Test notification.");

    let result = dispatcher.notify(&recipient, &notification).await;

    assert!(result.delivered);
    assert_eq!(result.status, "sms:sms_mock_sent");
}

#[tokio::test]
async fn immediate_repeat_is_suppressed() {
    let dispatcher = unconfigured_dispatcher();
    let recipient = Recipient::new("alex").with_phone("+48111111111");
    let notification = Notification::new("Delivery check", "Hello! Test notification.");

    let first = dispatcher.notify(&recipient, &notification).await;
    let second = dispatcher.notify(&recipient, &notification).await;

    assert_eq!(first.status, "sms:sms_mock_sent");
    assert!(second.delivered);
    assert_eq!(second.status, "duplicate_suppressed");
}

#[tokio::test]
async fn recipient_without_addresses_fails_all_channels() {
    let dispatcher = unconfigured_dispatcher();
    let recipient = Recipient::new("nobody");
    let notification = Notification::new("Delivery check", "Hello! Test notification.");

    let result = dispatcher.notify(&recipient, &notification).await;

    assert!(!result.delivered);
    assert_eq!(result.status, "all_channels_failed; last=none");
}

#[tokio::test]
async fn preference_order_is_honored_end_to_end() {
    let dispatcher = unconfigured_dispatcher();
    let recipient = Recipient::new("alex")
        .with_phone("+48111111111")
        .with_channel_order(["sms", "email", "telegram"]);
    let notification = Notification::new("Delivery check", "Hello! Test notification.");

    let result = dispatcher.notify(&recipient, &notification).await;

    assert_eq!(result.status, "sms:sms_mock_sent");
}
